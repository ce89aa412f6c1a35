//! # Flash Promoter Core
//!
//! Core traits and types shared by every Flash Promoter crate.
//!
//! Business logic is written as reducers: pure functions
//! `(State, Action, Environment) → (State, Effects)`. Reducers never touch
//! timers or tasks directly. They return [`effect::Effect`] values that the
//! runtime executes, and every long-lived effect (such as a ticket countdown)
//! is keyed by an [`effect::EffectId`] so it can be cancelled explicitly.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature
//! - **Action**: All possible inputs to a reducer (user intents and timer ticks)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies (clock, id generation, config)
//!
//! ## Example
//!
//! ```
//! use flash_promoter_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct DoorState {
//!     inside: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum DoorAction {
//!     Enter,
//!     Leave,
//! }
//!
//! struct DoorReducer;
//!
//! impl Reducer for DoorReducer {
//!     type State = DoorState;
//!     type Action = DoorAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut DoorState,
//!         action: DoorAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<DoorAction>; 4]> {
//!         match action {
//!             DoorAction::Enter => state.inside += 1,
//!             DoorAction::Leave => state.inside = state.inside.saturating_sub(1),
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = DoorState::default();
//! DoorReducer.reduce(&mut state, DoorAction::Enter, &());
//! assert_eq!(state.inside, 1);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Declarative macros for building effects
pub mod effect_macros;

/// Reducer module - The core trait for business logic
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Updates `state` in place and returns descriptions of the side
        /// effects the runtime should perform. Most reducers return zero or
        /// one effect, so the result is stored inline.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values. They are built by reducers and executed by the
/// runtime, which feeds any resulting actions back into the reducer.
pub mod effect {
    use futures::future::BoxFuture;
    use serde::{Deserialize, Serialize};
    use std::borrow::Cow;
    use std::time::Duration;

    /// Key identifying a cancellable effect.
    ///
    /// At most one effect per id is in flight: starting a new
    /// [`Effect::Cancellable`] with an id that is already running aborts the
    /// running one first.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EffectId(Cow<'static, str>);

    impl EffectId {
        /// Creates an id from a static string (usable in `const` items)
        #[must_use]
        pub const fn from_static(id: &'static str) -> Self {
            Self(Cow::Borrowed(id))
        }

        /// Creates an id from an owned string
        #[must_use]
        pub fn new(id: impl Into<String>) -> Self {
            Self(Cow::Owned(id.into()))
        }

        /// Returns the id as a string slice
        #[must_use]
        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl std::fmt::Display for EffectId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Dispatch an action once after a delay
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Dispatch an action every `period` until cancelled
        ///
        /// The first dispatch happens one full period after the effect starts.
        /// An interval never completes on its own, so it is only useful
        /// wrapped in [`Effect::Cancellable`].
        Interval {
            /// Time between dispatches
            period: Duration,
            /// Action dispatched on every tick
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(BoxFuture<'static, Option<Action>>),

        /// Run `effect` under a cancellation key
        ///
        /// Any effect already running under the same id is aborted before
        /// this one starts.
        Cancellable {
            /// Cancellation key
            id: EffectId,
            /// The effect to run
            effect: Box<Effect<Action>>,
        },

        /// Abort the effect running under the given id (no-op if none)
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Interval { period, action } => f
                    .debug_struct("Effect::Interval")
                    .field("period", period)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Wrap this effect under a cancellation key
        #[must_use]
        pub fn cancellable(self, id: EffectId) -> Effect<Action> {
            Effect::Cancellable {
                id,
                effect: Box::new(self),
            }
        }

        /// Returns `true` for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// Returns the cancellation key this effect starts, if any
        #[must_use]
        pub const fn starts(&self) -> Option<&EffectId> {
            match self {
                Effect::Cancellable { id, .. } => Some(id),
                _ => None,
            }
        }

        /// Returns the cancellation key this effect cancels, if any
        #[must_use]
        pub const fn cancels(&self) -> Option<&EffectId> {
            match self {
                Effect::Cancel(id) => Some(id),
                _ => None,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All sources of non-determinism are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock used in production
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Source of fresh identifiers
    ///
    /// Ids must be unique for the lifetime of the process.
    pub trait IdGenerator: Send + Sync {
        /// Returns a new id starting with `prefix`
        fn next_id(&self, prefix: &str) -> String;
    }

    /// Random UUID v4 ids (`"{prefix}-{uuid}"`)
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UuidGenerator;

    impl IdGenerator for UuidGenerator {
        fn next_id(&self, prefix: &str) -> String {
            format!("{prefix}-{}", uuid::Uuid::new_v4())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::{Effect, EffectId};
    use super::environment::{IdGenerator, UuidGenerator};
    use std::time::Duration;

    #[derive(Debug, Clone)]
    enum TestAction {
        Tick,
    }

    const TIMER: EffectId = EffectId::from_static("test.timer");

    #[test]
    fn cancellable_reports_its_key() {
        let effect = Effect::Interval {
            period: Duration::from_secs(1),
            action: Box::new(TestAction::Tick),
        }
        .cancellable(TIMER);

        assert_eq!(effect.starts(), Some(&TIMER));
        assert_eq!(effect.cancels(), None);
    }

    #[test]
    fn cancel_reports_its_key() {
        let effect = Effect::<TestAction>::Cancel(EffectId::new("test.timer"));
        assert_eq!(effect.cancels(), Some(&TIMER));
        assert!(!effect.is_none());
    }

    #[test]
    fn effect_ids_compare_by_content() {
        assert_eq!(EffectId::from_static("a"), EffectId::new(String::from("a")));
        assert_eq!(TIMER.to_string(), "test.timer");
    }

    #[test]
    fn debug_output_names_variant() {
        let effect = Effect::Delay {
            duration: Duration::from_millis(5),
            action: Box::new(TestAction::Tick),
        };
        assert!(format!("{effect:?}").starts_with("Effect::Delay"));
    }

    #[test]
    fn uuid_ids_are_prefixed_and_unique() {
        let ids = UuidGenerator;
        let a = ids.next_id("venue");
        let b = ids.next_id("venue");
        assert!(a.starts_with("venue-"));
        assert_ne!(a, b);
    }
}
