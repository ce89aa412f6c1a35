//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating timer and async `Effect`
//! variants.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use flash_promoter_core::async_effect;
///
/// async_effect! {
///     let snapshot = loader.load().await;
///     Some(AppAction::Loaded { snapshot })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling a single delayed action
///
/// # Example
///
/// ```rust,ignore
/// use flash_promoter_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(30),
///     action: AppAction::OfferTimedOut
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Create an `Effect::Interval` that dispatches an action every period
///
/// # Example
///
/// ```rust,ignore
/// use flash_promoter_core::interval;
/// use std::time::Duration;
///
/// interval! {
///     period: Duration::from_secs(1),
///     action: AppAction::CountdownTick { ticket_id }
/// }
/// ```
#[macro_export]
macro_rules! interval {
    (
        period: $period:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Interval {
            period: $period,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Wrap an effect under a cancellation key
///
/// # Example
///
/// ```rust,ignore
/// use flash_promoter_core::{cancellable, interval};
///
/// cancellable! {
///     id: COUNTDOWN,
///     effect: interval! { period: tick, action: AppAction::CountdownTick { ticket_id } }
/// }
/// ```
#[macro_export]
macro_rules! cancellable {
    (
        id: $id:expr,
        effect: $effect:expr
    ) => {
        $crate::effect::Effect::Cancellable {
            id: $id,
            effect: ::std::boxed::Box::new($effect),
        }
    };
}
