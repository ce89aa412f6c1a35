//! # Flash Promoter Runtime
//!
//! Runtime implementation for Flash Promoter reducers.
//!
//! This crate provides the [`Store`] that coordinates reducer execution and
//! effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state and runs the reducer for every action
//! - **Effect Executor**: Runs effect descriptions on tokio tasks and feeds
//!   resulting actions back into the store
//! - **Cancellation Registry**: Tracks effects started under an
//!   [`EffectId`] so they can be aborted, and guarantees at most one
//!   in-flight effect per id
//!
//! ## Example
//!
//! ```ignore
//! use flash_promoter_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use flash_promoter_core::{
    effect::{Effect, EffectId},
    reducer::Reducer,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::AbortHandle;

/// Metric names and descriptions for the store
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for an action or for effects to finish
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Store configuration
///
/// # Example
///
/// ```
/// use flash_promoter_runtime::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(64)
///     .with_shutdown_timeout(Duration::from_secs(5));
/// assert_eq!(config.broadcast_capacity, 64);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Capacity of the action broadcast channel
    pub broadcast_capacity: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Set the broadcast channel capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects of one
/// action to complete. Unbounded effects ([`Effect::Interval`], alone or
/// nested) are not tracked, since they only end by cancellation.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };
        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (handle, _tracking) = Self::new();
        handle
    }

    /// Number of tracked effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all tracked effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all tracked effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires first.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Internal: tracking context shared by the effects of one `send`
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Runs on normal completion, on panic and on abort.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Internal: an effect running under a cancellation key
struct RunningEffect {
    generation: u64,
    handle: AbortHandle,
}

/// Internal: at most one running task per [`EffectId`]
#[derive(Default)]
struct CancellationRegistry {
    running: Mutex<HashMap<EffectId, RunningEffect>>,
    next_generation: AtomicU64,
}

impl CancellationRegistry {
    fn lock(&self) -> MutexGuard<'_, HashMap<EffectId, RunningEffect>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::Relaxed)
    }

    fn cancel(&self, id: &EffectId) -> bool {
        let Some(running) = self.lock().remove(id) else {
            return false;
        };
        running.handle.abort();
        true
    }

    fn cancel_all(&self) -> usize {
        let drained: Vec<_> = self.lock().drain().collect();
        for (_, running) in &drained {
            running.handle.abort();
        }
        drained.len()
    }

    /// Forget `id` if it still belongs to the task of `generation`
    fn release(&self, id: &EffectId, generation: u64) {
        let mut running = self.lock();
        if running.get(id).is_some_and(|r| r.generation == generation) {
            running.remove(id);
        }
    }

    fn is_running(&self, id: &EffectId) -> bool {
        self.lock().get(id).is_some_and(|r| !r.handle.is_finished())
    }

    fn len(&self) -> usize {
        self.lock().values().filter(|r| !r.handle.is_finished()).count()
    }
}

/// Returns `true` if the effect contains an interval (never completes alone)
fn is_unbounded<A>(effect: &Effect<A>) -> bool {
    match effect {
        Effect::Interval { .. } => true,
        Effect::Cancellable { effect, .. } => is_unbounded(effect),
        Effect::Parallel(effects) | Effect::Sequential(effects) => {
            effects.iter().any(is_unbounded)
        },
        Effect::None | Effect::Delay { .. } | Effect::Future(_) | Effect::Cancel(_) => false,
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        is_unbounded, metrics, Arc, AtomicBool, AtomicCounterGuard, AtomicUsize,
        CancellationRegistry, DecrementGuard, Effect, EffectHandle, EffectId, EffectTracking,
        Ordering, Reducer, RwLock, StoreConfig, StoreError,
    };
    use futures::future::BoxFuture;
    use std::future::Future;
    use std::time::Duration;
    use tokio::sync::broadcast;
    use tokio::task::AbortHandle;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop and cancellation)
    ///
    /// Cloning a store is cheap; clones share the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        config: StoreConfig,
        cancellables: Arc<CancellationRegistry>,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        /// Every action produced by an effect is broadcast here after it
        /// has been reduced.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new store with explicit configuration
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                config,
                cancellables: Arc::new(CancellationRegistry::default()),
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Releases the lock and starts the returned effects
        ///
        /// `Cancel` and `Cancellable` effects are applied before `send`
        /// returns: once it resolves, a cancelled effect is no longer
        /// registered and a replaced one has been aborted.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                metrics::counter!(metrics::ACTIONS_REJECTED).increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            let effects = {
                let mut state = self.state.write().await;
                self.reducer.reduce(&mut state, action, &self.environment)
            };
            metrics::counter!(metrics::ACTIONS_PROCESSED).increment(1);

            let (handle, tracking) = EffectHandle::new();
            for effect in effects {
                self.execute_effect(effect, &tracking);
            }

            Ok(handle)
        }

        /// Send an action and wait for a matching action produced by effects
        ///
        /// Subscribes before sending, so a match produced immediately is
        /// not missed.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action within `timeout`
        /// - [`StoreError::ChannelClosed`]: broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to actions produced by effects
        ///
        /// Actions sent directly through [`Store::send`] are not broadcast.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read state via a closure
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Returns `true` if an effect is running under `id`
        #[must_use]
        pub fn is_running(&self, id: &EffectId) -> bool {
            self.cancellables.is_running(id)
        }

        /// Number of cancellable effects currently running
        #[must_use]
        pub fn running_cancellables(&self) -> usize {
            self.cancellables.len()
        }

        /// Initiate graceful shutdown
        ///
        /// Rejects new actions, aborts every cancellable effect, then waits
        /// for the remaining effects to finish.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effects are still
        /// running after `timeout`.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::Release);

            let aborted = self.cancellables.cancel_all();
            if aborted > 0 {
                metrics::counter!(metrics::EFFECTS_CANCELLED).increment(aborted as u64);
                tracing::debug!(aborted, "Aborted cancellable effects");
            }

            let start = tokio::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);
                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timeout");
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Shut down with the configured default timeout
        ///
        /// # Errors
        ///
        /// See [`Store::shutdown`].
        pub async fn shutdown_default(&self) -> Result<(), StoreError> {
            self.shutdown(self.config.default_shutdown_timeout).await
        }

        /// Start an effect returned by the reducer
        ///
        /// `None`, `Cancel` and `Cancellable` registration happen inline;
        /// everything else runs on a spawned task.
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!(metrics::EFFECTS_EXECUTED, "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking);
                    }
                },
                Effect::Cancel(id) => {
                    if self.cancellables.cancel(&id) {
                        metrics::counter!(metrics::EFFECTS_CANCELLED).increment(1);
                        tracing::debug!(effect_id = %id, "Cancelled effect");
                    } else {
                        tracing::trace!(effect_id = %id, "Nothing to cancel");
                    }
                },
                Effect::Cancellable { id, effect } => {
                    metrics::counter!(metrics::EFFECTS_EXECUTED, "type" => "cancellable").increment(1);
                    let generation = self.cancellables.next_generation();
                    let tracked = !is_unbounded(&effect);
                    let store = self.clone();
                    let task_id = id.clone();
                    let inner_tracking = tracking.clone();

                    // Hold the registry lock across spawn + insert so the task
                    // cannot release its entry before it exists.
                    let mut running = self.cancellables.lock();
                    let handle = self.spawn(
                        async move {
                            store.run(*effect, inner_tracking).await;
                            store.cancellables.release(&task_id, generation);
                        },
                        tracking,
                        tracked,
                    );
                    let replaced = running.insert(id.clone(), super::RunningEffect { generation, handle });
                    drop(running);

                    if let Some(previous) = replaced {
                        previous.handle.abort();
                        metrics::counter!(metrics::EFFECTS_CANCELLED).increment(1);
                        tracing::debug!(effect_id = %id, "Replaced in-flight effect");
                    }
                },
                effect => {
                    let tracked = !is_unbounded(&effect);
                    let store = self.clone();
                    let inner_tracking = tracking.clone();
                    self.spawn(
                        async move { store.run(effect, inner_tracking).await },
                        tracking,
                        tracked,
                    );
                },
            }
        }

        /// Spawn a task counted for shutdown and, if `tracked`, for the
        /// caller's [`EffectHandle`]
        fn spawn<F>(&self, task: F, tracking: &EffectTracking, tracked: bool) -> AbortHandle
        where
            F: Future<Output = ()> + Send + 'static,
        {
            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));
            let decrement_guard = tracked.then(|| {
                tracking.increment();
                DecrementGuard(tracking.clone())
            });

            tokio::spawn(async move {
                let _pending_guard = pending_guard;
                let _decrement_guard = decrement_guard;
                task.await;
            })
            .abort_handle()
        }

        /// Run an effect to completion on the current task
        fn run(&self, effect: Effect<A>, tracking: EffectTracking) -> BoxFuture<'static, ()> {
            let store = self.clone();
            Box::pin(async move {
                match effect {
                    Effect::None => {},
                    Effect::Future(fut) => {
                        metrics::counter!(metrics::EFFECTS_EXECUTED, "type" => "future").increment(1);
                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, sending to store");
                            let _ = store.feed_back(action).await;
                        }
                    },
                    Effect::Delay { duration, action } => {
                        metrics::counter!(metrics::EFFECTS_EXECUTED, "type" => "delay").increment(1);
                        tokio::time::sleep(duration).await;
                        tracing::trace!("Effect::Delay completed, sending action");
                        let _ = store.feed_back(*action).await;
                    },
                    Effect::Interval { period, action } => {
                        metrics::counter!(metrics::EFFECTS_EXECUTED, "type" => "interval").increment(1);
                        loop {
                            tokio::time::sleep(period).await;
                            if store.feed_back((*action).clone()).await.is_err() {
                                tracing::trace!("Store rejected interval action, stopping");
                                break;
                            }
                        }
                    },
                    Effect::Parallel(effects) => {
                        let runs = effects
                            .into_iter()
                            .map(|effect| store.run(effect, tracking.clone()));
                        futures::future::join_all(runs).await;
                    },
                    Effect::Sequential(effects) => {
                        metrics::counter!(metrics::EFFECTS_EXECUTED, "type" => "sequential").increment(1);
                        for effect in effects {
                            store.run(effect, tracking.clone()).await;
                        }
                    },
                    effect @ (Effect::Cancellable { .. } | Effect::Cancel(_)) => {
                        store.execute_effect(effect, &tracking);
                    },
                }
            })
        }

        /// Reduce an action produced by an effect, then broadcast it
        async fn feed_back(&self, action: A) -> Result<(), StoreError> {
            self.send(action.clone()).await?;
            let _ = self.action_broadcast.send(action);
            Ok(())
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                config: self.config.clone(),
                cancellables: Arc::clone(&self.cancellables),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use flash_promoter_core::{smallvec, SmallVec};

    const TICKER: EffectId = EffectId::from_static("test.ticker");

    #[derive(Debug, Clone, Default)]
    struct TestState {
        value: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Increment,
        ProduceEffect,
        ProduceDelayedAction,
        ProduceSequentialEffects,
        StartTicker,
        StopTicker,
        Tick,
    }

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment | TestAction::Tick => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::ProduceEffect => {
                    smallvec![Effect::Future(Box::pin(async { Some(TestAction::Increment) }))]
                },
                TestAction::ProduceDelayedAction => smallvec![Effect::Delay {
                    duration: Duration::from_millis(10),
                    action: Box::new(TestAction::Increment),
                }],
                TestAction::ProduceSequentialEffects => smallvec![Effect::chain(vec![
                    Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                    Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                ])],
                TestAction::StartTicker => smallvec![Effect::Interval {
                    period: Duration::from_secs(1),
                    action: Box::new(TestAction::Tick),
                }
                .cancellable(TICKER)],
                TestAction::StopTicker => smallvec![Effect::Cancel(TICKER)],
            }
        }
    }

    fn store() -> Store<TestState, TestAction, (), TestReducer> {
        Store::new(TestState::default(), TestReducer, ())
    }

    #[tokio::test]
    async fn test_send_action() {
        let store = store();
        let _ = store.send(TestAction::Increment).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_effect_future_feeds_back() {
        let store = store();
        let mut handle = store.send(TestAction::ProduceEffect).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_effect_delay() {
        let store = store();
        let mut handle = store.send(TestAction::ProduceDelayedAction).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 0);

        handle.wait().await;
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_sequential_effects() {
        let store = store();
        let mut handle = store.send(TestAction::ProduceSequentialEffects).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_ticks_until_cancelled() {
        let store = store();
        let handle = store.send(TestAction::StartTicker).await.unwrap();
        assert_eq!(handle.pending(), 0, "intervals are not tracked");
        assert!(store.is_running(&TICKER));

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(store.state(|s| s.value).await, 3);

        let _ = store.send(TestAction::StopTicker).await.unwrap();
        assert!(!store.is_running(&TICKER));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.state(|s| s.value).await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarting_cancellable_replaces_previous() {
        let store = store();
        let _ = store.send(TestAction::StartTicker).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        let _ = store.send(TestAction::StartTicker).await.unwrap();
        assert_eq!(store.running_cancellables(), 1);

        // Only the second ticker runs: ticks at 1.5s, 2.5s, 3.5s, 4.5s
        tokio::time::sleep(Duration::from_millis(4_600)).await;
        assert_eq!(store.state(|s| s.value).await, 4);
    }

    #[tokio::test]
    async fn test_cancel_without_running_effect_is_noop() {
        let store = store();
        let _ = store.send(TestAction::StopTicker).await.unwrap();
        assert_eq!(store.running_cancellables(), 0);
        assert_eq!(store.state(|s| s.value).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts_cancellables_and_rejects_actions() {
        let store = store();
        let _ = store.send(TestAction::StartTicker).await.unwrap();

        store.shutdown(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.running_cancellables(), 0);
        assert!(matches!(
            store.send(TestAction::Increment).await,
            Err(StoreError::ShutdownInProgress)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_and_wait_for_tick() {
        let store = store();
        let tick = store
            .send_and_wait_for(
                TestAction::StartTicker,
                |a| matches!(a, TestAction::Tick),
                Duration::from_secs(2),
            )
            .await
            .unwrap();

        assert_eq!(tick, TestAction::Tick);
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_completed_handle() {
        let mut handle = EffectHandle::completed();
        handle.wait_with_timeout(Duration::from_millis(10)).await.unwrap();
        assert_eq!(handle.pending(), 0);
    }
}
