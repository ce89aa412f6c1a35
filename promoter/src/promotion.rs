//! Promotion registry.
//!
//! An ordered set of promotions keyed by id. Several promotions may be
//! active at once; only the false -> true transition of `toggle` matters to
//! the rest of the system, because that is what publishes to the dispatch
//! bridge.

use crate::types::{Promotion, PromotionId, PromotionType};
use serde::{Deserialize, Serialize};

/// Content for a new promotion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionDraft {
    /// Headline
    pub title: String,
    /// Body text
    pub description: String,
    /// Offer length, raised to at least 1
    pub duration_minutes: u32,
    /// Kind of offer
    pub promotion_type: PromotionType,
    /// Who the offer is aimed at
    pub target_audience: Option<String>,
}

impl Default for PromotionDraft {
    /// Placeholder content shown for a freshly added promotion
    fn default() -> Self {
        Self {
            title: "Flash Hour: First Names \"S\"".to_string(),
            description: "1 Free Drink for anyone with a name starting with S.".to_string(),
            duration_minutes: 30,
            promotion_type: PromotionType::FreeItem,
            target_audience: Some("Names starting with S".to_string()),
        }
    }
}

/// Editable text field of a promotion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionField {
    /// The headline
    Title,
    /// The body text
    Description,
}

/// How the fan app presents an offered promotion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedemptionStyle {
    /// Access or skip-the-line: leads to the reservation form
    Reservation,
    /// Claimed on the spot: issues a free ticket directly
    InstantClaim,
}

impl RedemptionStyle {
    /// Classify a promotion.
    ///
    /// `ACCESS` promotions and any promotion whose title mentions "spot"
    /// (case-insensitive) are reservation-style.
    #[must_use]
    pub fn of(promotion: &Promotion) -> Self {
        Self::classify(promotion.promotion_type, &promotion.title)
    }

    /// Classify from the type and title alone
    #[must_use]
    pub fn classify(promotion_type: PromotionType, title: &str) -> Self {
        if promotion_type == PromotionType::Access || title.to_lowercase().contains("spot") {
            Self::Reservation
        } else {
            Self::InstantClaim
        }
    }
}

/// Result of toggling a promotion
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The promotion went live; carries the record to publish
    Activated(Promotion),
    /// The promotion was aborted
    Deactivated,
    /// No promotion with that id
    NotFound,
}

/// Ordered collection of promotions
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRegistry {
    promotions: Vec<Promotion>,
}

impl PromotionRegistry {
    /// Creates a registry from existing promotions, keeping their order
    #[must_use]
    pub const fn new(promotions: Vec<Promotion>) -> Self {
        Self { promotions }
    }

    /// All promotions in insertion order
    #[must_use]
    pub fn all(&self) -> &[Promotion] {
        &self.promotions
    }

    /// Returns a promotion by ID
    #[must_use]
    pub fn get(&self, id: &PromotionId) -> Option<&Promotion> {
        self.promotions.iter().find(|p| &p.id == id)
    }

    /// Checks if a promotion exists
    #[must_use]
    pub fn exists(&self, id: &PromotionId) -> bool {
        self.get(id).is_some()
    }

    /// Promotions currently being broadcast
    pub fn active(&self) -> impl Iterator<Item = &Promotion> {
        self.promotions.iter().filter(|p| p.active)
    }

    /// Number of promotions
    #[must_use]
    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    /// Returns `true` if the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }

    /// Append an inactive promotion under a fresh id
    pub fn create(&mut self, id: PromotionId, draft: PromotionDraft) -> &Promotion {
        let index = self.promotions.len();
        self.promotions.push(Promotion {
            id,
            title: draft.title,
            description: draft.description,
            duration_minutes: draft.duration_minutes.max(1),
            active: false,
            promotion_type: draft.promotion_type,
            target_audience: draft.target_audience,
        });
        &self.promotions[index]
    }

    /// Replace a text field in place.
    ///
    /// Returns `false` for an unknown id.
    pub fn edit(&mut self, id: &PromotionId, field: PromotionField, value: String) -> bool {
        let Some(promotion) = self.promotions.iter_mut().find(|p| &p.id == id) else {
            return false;
        };
        match field {
            PromotionField::Title => promotion.title = value,
            PromotionField::Description => promotion.description = value,
        }
        true
    }

    /// Remove a promotion. Unknown ids are a no-op.
    ///
    /// Returns the removed record.
    pub fn delete(&mut self, id: &PromotionId) -> Option<Promotion> {
        let index = self.promotions.iter().position(|p| &p.id == id)?;
        Some(self.promotions.remove(index))
    }

    /// Flip a promotion's `active` flag
    pub fn toggle(&mut self, id: &PromotionId) -> ToggleOutcome {
        let Some(promotion) = self.promotions.iter_mut().find(|p| &p.id == id) else {
            return ToggleOutcome::NotFound;
        };
        promotion.active = !promotion.active;
        if promotion.active {
            ToggleOutcome::Activated(promotion.clone())
        } else {
            ToggleOutcome::Deactivated
        }
    }
}
