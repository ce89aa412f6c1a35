//! Promotion dispatch bridge.
//!
//! A single slot carrying the promotion currently shown in the fan app.
//! Publishing overwrites whatever is there; nothing is queued.

use crate::types::{Promotion, PromotionId};
use serde::{Deserialize, Serialize};

/// Single-slot hand-off from the operator's registry to the fan app
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchBridge {
    slot: Option<Promotion>,
}

impl DispatchBridge {
    /// An empty bridge
    #[must_use]
    pub const fn new() -> Self {
        Self { slot: None }
    }

    /// Publish a promotion, replacing any previous one.
    ///
    /// Returns the promotion that was replaced.
    pub fn publish(&mut self, promotion: Promotion) -> Option<Promotion> {
        self.slot.replace(promotion)
    }

    /// Empty the slot. Clearing an empty bridge changes nothing.
    ///
    /// Returns the promotion that was held.
    pub fn clear(&mut self) -> Option<Promotion> {
        self.slot.take()
    }

    /// The published promotion, if any
    #[must_use]
    pub const fn current(&self) -> Option<&Promotion> {
        self.slot.as_ref()
    }

    /// Returns `true` if `id` is the published promotion
    #[must_use]
    pub fn is_publishing(&self, id: &PromotionId) -> bool {
        self.slot.as_ref().is_some_and(|p| &p.id == id)
    }
}
