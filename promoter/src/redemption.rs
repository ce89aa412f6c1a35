//! Fan-side redemption and reservation flow.
//!
//! ```text
//! IDLE ──publish──▶ PROMOTION_OFFERED ──┬─ reservation-style ─▶ RESERVATION_FORM ─confirm─▶ TICKET_ACTIVE
//!   │                                   └─ instant-claim ─────────────────────────claim──▶ TICKET_ACTIVE
//!   └─ feed shortcuts (reserve / claim) ───────────────────────────────────────────────────────┘
//! ```
//!
//! Every state returns to IDLE on close. The countdown of an active ticket is
//! driven from outside through [`advance_countdown`].

use crate::promotion::RedemptionStyle;
use crate::types::{
    MeritCoins, Promotion, PromotionType, Ticket, TicketId, TicketKind, TicketStatus, VenueId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Smallest party a reservation accepts
pub const MIN_PARTY_SIZE: u32 = 1;
/// Largest party a reservation accepts
pub const MAX_PARTY_SIZE: u32 = 10;
/// Shortest reservation, also the billing block
pub const MIN_DURATION_MINUTES: u32 = 15;
/// Longest reservation
pub const MAX_DURATION_MINUTES: u32 = 120;
/// Reservation length granularity
pub const DURATION_STEP_MINUTES: u32 = 15;

/// Holder name printed when the guest left the field blank
pub const ANONYMOUS_GUEST: &str = "GUEST";
/// Audience printed on tickets claimed from the standing feed card
pub const FALLBACK_AUDIENCE: &str = "Names starting with \"M\"";

/// Cost of a reservation: 1 Meritocracy Coin per person per 15-minute block
#[must_use]
pub const fn reservation_cost(party_size: u32, duration_minutes: u32) -> MeritCoins {
    MeritCoins(party_size.saturating_mul(duration_minutes / DURATION_STEP_MINUTES))
}

/// Render seconds as `m:ss`
///
/// ```
/// use flash_promoter::redemption::format_countdown;
///
/// assert_eq!(format_countdown(900), "15:00");
/// assert_eq!(format_countdown(65), "1:05");
/// assert_eq!(format_countdown(0), "0:00");
/// ```
#[must_use]
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Reservation form inputs, always within bounds
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationForm {
    party_size: u32,
    duration_minutes: u32,
    /// Free text, not validated
    pub guest_name: String,
}

impl Default for ReservationForm {
    fn default() -> Self {
        Self {
            party_size: MIN_PARTY_SIZE,
            duration_minutes: MIN_DURATION_MINUTES,
            guest_name: String::new(),
        }
    }
}

impl ReservationForm {
    /// Number of guests, in `[1, 10]`
    #[must_use]
    pub const fn party_size(&self) -> u32 {
        self.party_size
    }

    /// Reservation length in minutes, in `[15, 120]` and a multiple of 15
    #[must_use]
    pub const fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Set the party size, clamped to `[1, 10]`
    pub fn set_party_size(&mut self, party_size: u32) {
        self.party_size = party_size.clamp(MIN_PARTY_SIZE, MAX_PARTY_SIZE);
    }

    /// Add `delta` guests, saturating at the bounds
    pub fn adjust_party_size(&mut self, delta: i32) {
        let next = i64::from(self.party_size) + i64::from(delta);
        let clamped = next.clamp(i64::from(MIN_PARTY_SIZE), i64::from(MAX_PARTY_SIZE));
        self.party_size = u32::try_from(clamped).unwrap_or(MIN_PARTY_SIZE);
    }

    /// Set the duration, clamped to `[15, 120]` and rounded down to a step
    pub fn set_duration_minutes(&mut self, minutes: u32) {
        let clamped = minutes.clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES);
        self.duration_minutes = clamped - clamped % DURATION_STEP_MINUTES;
    }

    /// Move the duration by whole steps.
    ///
    /// A move that would leave `[15, 120]` is ignored. Returns whether the
    /// duration changed.
    pub fn adjust_duration(&mut self, steps: i32) -> bool {
        let next = i64::from(self.duration_minutes)
            + i64::from(steps) * i64::from(DURATION_STEP_MINUTES);
        if next < i64::from(MIN_DURATION_MINUTES) || next > i64::from(MAX_DURATION_MINUTES) {
            return false;
        }
        match u32::try_from(next) {
            Ok(minutes) => {
                self.duration_minutes = minutes;
                true
            },
            Err(_) => false,
        }
    }

    /// Price of the reservation as currently filled in
    #[must_use]
    pub const fn total_cost(&self) -> MeritCoins {
        reservation_cost(self.party_size, self.duration_minutes)
    }

    /// Name the reservation is held under
    #[must_use]
    pub fn holder_name(&self) -> String {
        let name = self.guest_name.trim();
        if name.is_empty() {
            ANONYMOUS_GUEST.to_string()
        } else {
            name.to_string()
        }
    }
}

/// Where the fan app currently is
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowState {
    /// Default feed, no overlay
    #[default]
    Idle,
    /// A published promotion is being shown
    PromotionOffered {
        /// The promotion on display
        promotion: Promotion,
        /// How it can be redeemed
        style: RedemptionStyle,
    },
    /// The reservation form is open
    ReservationForm(ReservationForm),
    /// A ticket is displayed with its countdown
    TicketActive(Ticket),
}

impl FlowState {
    /// Offer a published promotion
    #[must_use]
    pub fn offer(promotion: Promotion) -> Self {
        let style = RedemptionStyle::of(&promotion);
        Self::PromotionOffered { promotion, style }
    }

    /// Short name for logs and rejection messages
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::PromotionOffered { .. } => "PROMOTION_OFFERED",
            Self::ReservationForm(_) => "RESERVATION_FORM",
            Self::TicketActive(_) => "TICKET_ACTIVE",
        }
    }

    /// Returns `true` while a ticket is displayed
    #[must_use]
    pub const fn has_ticket(&self) -> bool {
        matches!(self, Self::TicketActive(_))
    }

    /// The displayed ticket, if any
    #[must_use]
    pub const fn ticket(&self) -> Option<&Ticket> {
        match self {
            Self::TicketActive(ticket) => Some(ticket),
            _ => None,
        }
    }

    /// The open form, if any
    #[must_use]
    pub const fn form(&self) -> Option<&ReservationForm> {
        match self {
            Self::ReservationForm(form) => Some(form),
            _ => None,
        }
    }

    /// The offered promotion, if any
    #[must_use]
    pub const fn offered(&self) -> Option<&Promotion> {
        match self {
            Self::PromotionOffered { promotion, .. } => Some(promotion),
            _ => None,
        }
    }
}

/// Issue a reservation ticket from a confirmed form
#[must_use]
pub fn issue_reservation(
    id: TicketId,
    form: &ReservationForm,
    venue_id: Option<VenueId>,
    issued_at: DateTime<Utc>,
) -> Ticket {
    Ticket {
        id,
        kind: TicketKind::Reservation {
            holder_name: form.holder_name(),
            party_size: form.party_size(),
        },
        venue_id,
        total_cost: form.total_cost(),
        expires_in_seconds: form.duration_minutes() * 60,
        status: TicketStatus::Active,
        issued_at,
    }
}

/// Issue a free promo ticket.
///
/// Without a promotion (the standing feed card) the ticket offers a free
/// drink to the fallback audience.
#[must_use]
pub fn issue_promo_ticket(
    id: TicketId,
    promotion: Option<&Promotion>,
    claim_minutes: u32,
    venue_id: Option<VenueId>,
    issued_at: DateTime<Utc>,
) -> Ticket {
    let target_audience = promotion
        .and_then(|p| p.target_audience.clone())
        .unwrap_or_else(|| FALLBACK_AUDIENCE.to_string());
    let offer_item = promotion
        .map_or(PromotionType::FreeItem, |p| p.promotion_type)
        .offer_label()
        .to_string();

    Ticket {
        id,
        kind: TicketKind::Promo {
            target_audience,
            offer_item,
        },
        venue_id,
        total_cost: MeritCoins::FREE,
        expires_in_seconds: claim_minutes.saturating_mul(60),
        status: TicketStatus::Active,
        issued_at,
    }
}

/// Outcome of one countdown tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Countdown {
    /// Still running with this many seconds left
    Running(u32),
    /// This tick reached zero
    Expired,
    /// The ticket was already expired
    Stopped,
}

/// Decrement an active ticket by one second.
///
/// Reaching zero marks the ticket [`TicketStatus::Expired`].
pub fn advance_countdown(ticket: &mut Ticket) -> Countdown {
    if ticket.status == TicketStatus::Expired {
        return Countdown::Stopped;
    }
    ticket.expires_in_seconds = ticket.expires_in_seconds.saturating_sub(1);
    if ticket.expires_in_seconds == 0 {
        ticket.status = TicketStatus::Expired;
        Countdown::Expired
    } else {
        Countdown::Running(ticket.expires_in_seconds)
    }
}
