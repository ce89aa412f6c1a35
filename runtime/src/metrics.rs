//! Store metrics emitted through the `metrics` facade.
//!
//! The runtime only records; installing a recorder/exporter is left to the
//! host process. Without a recorder every macro call is a no-op.
//!
//! # Example
//!
//! ```
//! flash_promoter_runtime::metrics::describe_store_metrics();
//! ```

use metrics::describe_counter;

// Re-export metrics macros for use in other modules
pub use metrics::counter;

/// Actions reduced by a store
pub const ACTIONS_PROCESSED: &str = "store.actions.processed";

/// Effects started, labelled with `type`
pub const EFFECTS_EXECUTED: &str = "store.effects.executed";

/// Cancellable effects aborted (explicitly or by replacement)
pub const EFFECTS_CANCELLED: &str = "store.effects.cancelled";

/// Actions rejected because the store was shutting down
pub const ACTIONS_REJECTED: &str = "store.actions.rejected";

/// Register descriptions for every store metric.
///
/// Safe to call more than once.
pub fn describe_store_metrics() {
    describe_counter!(ACTIONS_PROCESSED, "Total number of actions reduced by the store");
    describe_counter!(
        EFFECTS_EXECUTED,
        "Total number of effects started by the store, by effect type"
    );
    describe_counter!(
        EFFECTS_CANCELLED,
        "Total number of cancellable effects aborted before completion"
    );
    describe_counter!(
        ACTIONS_REJECTED,
        "Total number of actions rejected during shutdown"
    );
}
