//! Domain types for Flash Promoter.
//!
//! Venues, promotions, fan reports and tickets, plus the identifiers and
//! small value types they share.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a venue
    VenueId
);
string_id!(
    /// Unique identifier for a promotion
    PromotionId
);
string_id!(
    /// Unique identifier for an issued ticket
    TicketId
);
string_id!(
    /// Unique identifier for a fan report
    ReportId
);

/// Amount of Meritocracy Coin, the in-app currency
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeritCoins(pub u32);

impl MeritCoins {
    /// No charge
    pub const FREE: Self = Self(0);

    /// Returns `true` if nothing is owed
    #[must_use]
    pub const fn is_free(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for MeritCoins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} MC", self.0)
    }
}

// ============================================================================
// Venues
// ============================================================================

/// Door status of a venue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VenueStatus {
    /// Accepting guests
    Open,
    /// Closed by the operator; occupancy changes do not reopen it
    Closed,
    /// Occupancy reached nominal capacity
    #[serde(rename = "At Capacity")]
    AtCapacity,
}

impl std::fmt::Display for VenueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
            Self::AtCapacity => "At Capacity",
        })
    }
}

/// A physical location with live occupancy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    /// Unique identifier
    pub id: VenueId,
    /// Display name
    pub name: String,
    /// City or district
    pub location: String,
    /// Nominal capacity, always at least 1
    pub capacity: u32,
    /// Guests currently inside
    pub current_occupancy: u32,
    /// Guests waiting outside
    pub queue_length: u32,
    /// Door status
    pub status: VenueStatus,
}

impl Venue {
    /// Load as a rounded percentage of nominal capacity (may exceed 100)
    #[must_use]
    pub fn load_percent(&self) -> u32 {
        let capacity = u64::from(self.capacity.max(1));
        let percent = (u64::from(self.current_occupancy) * 100 + capacity / 2) / capacity;
        u32::try_from(percent).unwrap_or(u32::MAX)
    }

    /// Returns `true` once occupancy reaches nominal capacity
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current_occupancy >= self.capacity
    }

    /// Free spots before nominal capacity is reached
    #[must_use]
    pub const fn spots_left(&self) -> u32 {
        self.capacity.saturating_sub(self.current_occupancy)
    }
}

// ============================================================================
// Promotions
// ============================================================================

/// Kind of offer a promotion makes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionType {
    /// Price reduction
    Discount,
    /// Something given away
    FreeItem,
    /// Entry or skip-the-line rights
    Access,
}

impl PromotionType {
    /// Label printed on a ticket claimed from a promotion of this type
    #[must_use]
    pub const fn offer_label(self) -> &'static str {
        match self {
            Self::FreeItem => "1 Free Drink",
            Self::Discount => "Flash Discount",
            Self::Access => "Priority Entry",
        }
    }
}

/// A time-boxed offer an operator can broadcast
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    /// Unique identifier
    pub id: PromotionId,
    /// Headline
    pub title: String,
    /// Body text
    pub description: String,
    /// How long the offer runs, always at least 1
    pub duration_minutes: u32,
    /// Whether the operator is currently broadcasting it
    pub active: bool,
    /// Kind of offer
    #[serde(rename = "type")]
    pub promotion_type: PromotionType,
    /// Who the offer is aimed at
    pub target_audience: Option<String>,
}

// ============================================================================
// Fan reports
// ============================================================================

/// What a fan report is about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportCategory {
    /// Something is broken
    Maintenance,
    /// Atmosphere feedback
    Vibe,
    /// Crowding
    Crowd,
}

/// How urgent a fan report is
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Informational
    Low,
    /// Needs attention soon
    Medium,
    /// Needs attention now
    High,
}

/// Feedback a fan sent about a venue
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanReport {
    /// Unique identifier
    pub id: ReportId,
    /// Venue the report is about
    pub venue_id: VenueId,
    /// Topic
    pub category: ReportCategory,
    /// Free text
    pub description: String,
    /// When the report was filed
    pub timestamp: DateTime<Utc>,
    /// Urgency
    pub severity: Severity,
}

// ============================================================================
// Tickets
// ============================================================================

/// What a ticket grants
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ticketType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketKind {
    /// Paid table/entry reservation
    #[serde(rename_all = "camelCase")]
    Reservation {
        /// Name the reservation is held under
        holder_name: String,
        /// Number of guests
        party_size: u32,
    },
    /// Free item claimed from a promotion
    #[serde(rename_all = "camelCase")]
    Promo {
        /// Audience the promotion targeted
        target_audience: String,
        /// What the holder receives
        offer_item: String,
    },
}

/// Lifecycle of an issued ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Countdown running; redeemable
    Active,
    /// Countdown reached zero; no longer redeemable
    Expired,
}

/// Time-boxed artifact produced by confirming a reservation or claiming a promotion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique identifier
    pub id: TicketId,
    /// What the ticket grants
    pub kind: TicketKind,
    /// Venue the ticket is valid at
    pub venue_id: Option<VenueId>,
    /// Price paid
    pub total_cost: MeritCoins,
    /// Seconds until expiry
    pub expires_in_seconds: u32,
    /// Lifecycle status
    pub status: TicketStatus,
    /// When the ticket was issued
    pub issued_at: DateTime<Utc>,
}

impl Ticket {
    /// Returns `true` while the ticket can still be redeemed
    #[must_use]
    pub fn is_redeemable(&self) -> bool {
        self.status == TicketStatus::Active
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// Screens of the application
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    /// Venue occupancy overview
    #[default]
    Dashboard,
    /// Venue onboarding form
    AddVenue,
    /// Promotion registry and strategy suggestion
    Promotions,
    /// Static prompt document for the assistant
    PromptTool,
    /// Fan-side app simulation
    FanApp,
    /// Team chat transcript
    TeamChat,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(capacity: u32, occupancy: u32) -> Venue {
        Venue {
            id: VenueId::new("v"),
            name: "Test".into(),
            location: "Nowhere".into(),
            capacity,
            current_occupancy: occupancy,
            queue_length: 0,
            status: VenueStatus::Open,
        }
    }

    #[test]
    fn load_percent_rounds_like_the_dashboard() {
        assert_eq!(venue(200, 45).load_percent(), 23);
        assert_eq!(venue(300, 210).load_percent(), 70);
        assert_eq!(venue(150, 170).load_percent(), 113);
    }

    #[test]
    fn spots_left_saturates() {
        assert_eq!(venue(200, 45).spots_left(), 155);
        assert_eq!(venue(150, 170).spots_left(), 0);
    }

    #[test]
    fn venue_status_serializes_with_display_names() {
        let json = serde_json::to_string(&VenueStatus::AtCapacity).unwrap_or_default();
        assert_eq!(json, "\"At Capacity\"");
        assert_eq!(VenueStatus::AtCapacity.to_string(), "At Capacity");
    }

    #[test]
    fn promotion_type_uses_wire_names() {
        let json = serde_json::to_string(&PromotionType::FreeItem).unwrap_or_default();
        assert_eq!(json, "\"FREE_ITEM\"");
    }

    #[test]
    fn merit_coins_display() {
        assert_eq!(MeritCoins(6).to_string(), "6 MC");
        assert!(MeritCoins::FREE.is_free());
    }

    #[test]
    fn ids_display_their_raw_value() {
        assert_eq!(VenueId::new("v1").to_string(), "v1");
        assert_eq!(TicketId::new("ticket-3").as_str(), "ticket-3");
    }
}
