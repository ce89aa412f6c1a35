//! Venue occupancy ledger.
//!
//! Occupancy changes saturate instead of failing: the count is clamped to
//! `[0, capacity + overflow_allowance]` and the door status is re-derived
//! after every change.

use crate::types::{MeritCoins, Venue, VenueId, VenueStatus};
use serde::{Deserialize, Serialize};

/// Headroom above nominal capacity before occupancy is clamped
pub const DEFAULT_OVERFLOW_ALLOWANCE: u32 = 20;

/// Derive the door status after an occupancy change.
///
/// Reaching capacity always reports [`VenueStatus::AtCapacity`]. Below
/// capacity a closed venue stays closed; any other venue is open.
#[must_use]
pub fn derive_status(previous: VenueStatus, occupancy: u32, capacity: u32) -> VenueStatus {
    if occupancy >= capacity {
        VenueStatus::AtCapacity
    } else if previous == VenueStatus::Closed {
        VenueStatus::Closed
    } else {
        VenueStatus::Open
    }
}

/// Apply a signed occupancy delta to a venue.
///
/// Total for every input. The queue length is never touched.
///
/// # Example
///
/// ```
/// use flash_promoter::venue::apply_occupancy_delta;
/// # use flash_promoter::types::{Venue, VenueId, VenueStatus};
/// # let venue = Venue {
/// #     id: VenueId::new("v1"),
/// #     name: "The Turbo Paddock".into(),
/// #     location: "San Francisco".into(),
/// #     capacity: 200,
/// #     current_occupancy: 45,
/// #     queue_length: 0,
/// #     status: VenueStatus::Open,
/// # };
/// let updated = apply_occupancy_delta(&venue, 200, 20);
/// assert_eq!(updated.current_occupancy, 220);
/// assert_eq!(updated.status, VenueStatus::AtCapacity);
/// ```
#[must_use]
pub fn apply_occupancy_delta(venue: &Venue, delta: i64, overflow_allowance: u32) -> Venue {
    let ceiling = i64::from(venue.capacity) + i64::from(overflow_allowance);
    let next = i64::from(venue.current_occupancy)
        .saturating_add(delta)
        .clamp(0, ceiling);
    let occupancy = u32::try_from(next).unwrap_or(u32::MAX);

    Venue {
        current_occupancy: occupancy,
        status: derive_status(venue.status, occupancy, venue.capacity),
        ..venue.clone()
    }
}

/// Ordered collection of venues
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueLedger {
    venues: Vec<Venue>,
}

impl VenueLedger {
    /// Creates a ledger from existing venues, keeping their order
    #[must_use]
    pub const fn new(venues: Vec<Venue>) -> Self {
        Self { venues }
    }

    /// All venues in insertion order
    #[must_use]
    pub fn all(&self) -> &[Venue] {
        &self.venues
    }

    /// Returns a venue by ID
    #[must_use]
    pub fn get(&self, id: &VenueId) -> Option<&Venue> {
        self.venues.iter().find(|v| &v.id == id)
    }

    /// The first venue, used as the default promotion target
    #[must_use]
    pub fn first(&self) -> Option<&Venue> {
        self.venues.first()
    }

    /// Number of venues
    #[must_use]
    pub fn len(&self) -> usize {
        self.venues.len()
    }

    /// Returns `true` if no venue is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    /// Replace a venue's record with the result of an occupancy delta.
    ///
    /// Returns the updated venue, or `None` for an unknown id.
    pub fn apply_delta(
        &mut self,
        id: &VenueId,
        delta: i64,
        overflow_allowance: u32,
    ) -> Option<&Venue> {
        let venue = self.venues.iter_mut().find(|v| &v.id == id)?;
        *venue = apply_occupancy_delta(venue, delta, overflow_allowance);
        Some(&*venue)
    }

    /// Append a freshly onboarded venue: open, empty, no queue.
    ///
    /// Capacity is raised to at least 1.
    pub fn onboard(&mut self, id: VenueId, name: String, location: String, capacity: u32) -> &Venue {
        let index = self.venues.len();
        self.venues.push(Venue {
            id,
            name,
            location,
            capacity: capacity.max(1),
            current_occupancy: 0,
            queue_length: 0,
            status: VenueStatus::Open,
        });
        &self.venues[index]
    }

    /// Force a venue closed, or reopen it with status derived from occupancy.
    ///
    /// Returns the updated venue, or `None` for an unknown id.
    pub fn set_closed(&mut self, id: &VenueId, closed: bool) -> Option<&Venue> {
        let venue = self.venues.iter_mut().find(|v| &v.id == id)?;
        venue.status = if closed {
            VenueStatus::Closed
        } else {
            derive_status(VenueStatus::Open, venue.current_occupancy, venue.capacity)
        };
        Some(&*venue)
    }
}

/// Suggested promotion strategy for a venue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategySuggestion {
    /// The venue is full: sell skip-the-line spots
    MonetizeAccess {
        /// Fast-pass spots to release
        spots: u32,
        /// Price per spot
        price_per_spot: MeritCoins,
        /// `spots * price_per_spot`
        estimated_revenue: MeritCoins,
    },
    /// The venue has room: run a happy hour
    BoostTraffic {
        /// Happy hour length
        duration_minutes: u32,
        /// Spots left before nominal capacity
        spots_to_fill: u32,
    },
}

impl StrategySuggestion {
    const FAST_PASS_SPOTS: u32 = 5;
    const FAST_PASS_PRICE: MeritCoins = MeritCoins(1);
    const HAPPY_HOUR_MINUTES: u32 = 30;

    /// Pick a strategy from the venue's door status
    #[must_use]
    pub fn for_venue(venue: &Venue) -> Self {
        if venue.status == VenueStatus::AtCapacity {
            Self::MonetizeAccess {
                spots: Self::FAST_PASS_SPOTS,
                price_per_spot: Self::FAST_PASS_PRICE,
                estimated_revenue: MeritCoins(Self::FAST_PASS_SPOTS * Self::FAST_PASS_PRICE.0),
            }
        } else {
            Self::BoostTraffic {
                duration_minutes: Self::HAPPY_HOUR_MINUTES,
                spots_to_fill: venue.spots_left(),
            }
        }
    }

    /// Short status headline
    #[must_use]
    pub const fn headline(&self) -> &'static str {
        match self {
            Self::MonetizeAccess { .. } => "CRITICAL DENSITY",
            Self::BoostTraffic { .. } => "LOW TRAFFIC",
        }
    }
}

impl std::fmt::Display for StrategySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MonetizeAccess {
                spots,
                price_per_spot,
                estimated_revenue,
            } => write!(
                f,
                "Monetize Access. Release {spots} \"Fast-Pass\" spots for {price_per_spot} each. Est. Revenue: {estimated_revenue}"
            ),
            Self::BoostTraffic {
                duration_minutes,
                spots_to_fill,
            } => write!(
                f,
                "Boost Traffic. Trigger \"Happy Hour\" for next {duration_minutes} mins to fill {spots_to_fill} spots."
            ),
        }
    }
}
