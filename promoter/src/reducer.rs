//! Application reducer.
//!
//! Composes the venue ledger, the promotion registry, the dispatch bridge and
//! the fan-side redemption flow into one state machine. The only timer in the
//! system, the ticket countdown, runs under the [`COUNTDOWN`] effect id: it is
//! started whenever a ticket is issued and cancelled on every path that leaves
//! `TICKET_ACTIVE`.

use crate::bridge::DispatchBridge;
use crate::config::PromoterConfig;
use crate::promotion::{
    PromotionDraft, PromotionField, PromotionRegistry, RedemptionStyle, ToggleOutcome,
};
use crate::redemption::{self, Countdown, FlowState, ReservationForm};
use crate::seed;
use crate::types::{
    FanReport, Promotion, PromotionId, Ticket, TicketId, Venue, VenueId, View,
};
use crate::venue::{StrategySuggestion, VenueLedger};
use chrono::{DateTime, Utc};
use flash_promoter_core::{
    cancellable,
    effect::{Effect, EffectId},
    environment::{Clock, IdGenerator, SystemClock, UuidGenerator},
    interval,
    reducer::Reducer,
    smallvec, SmallVec,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cancellation key of the ticket countdown
pub const COUNTDOWN: EffectId = EffectId::from_static("fan.countdown");

type Effects = SmallVec<[Effect<AppAction>; 4]>;

// ============================================================================
// State
// ============================================================================

/// Whole-application state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Screen on display
    pub view: View,
    /// All venues
    pub venues: VenueLedger,
    /// All promotions
    pub promotions: PromotionRegistry,
    /// Promotion handed to the fan app
    pub bridge: DispatchBridge,
    /// Fan app state
    pub flow: FlowState,
    /// Fan feedback
    pub reports: Vec<FanReport>,
    /// Venue promotions are aimed at; `None` means the first venue
    pub selected_venue: Option<VenueId>,
    /// Why the last command was ignored, if it was
    pub last_rejection: Option<String>,
}

impl AppState {
    /// Creates a state on the dashboard with an idle fan app
    #[must_use]
    pub fn new(venues: Vec<Venue>, promotions: Vec<Promotion>, reports: Vec<FanReport>) -> Self {
        Self {
            venues: VenueLedger::new(venues),
            promotions: PromotionRegistry::new(promotions),
            reports,
            ..Self::default()
        }
    }

    /// State loaded with the launch venues, promotions and reports
    #[must_use]
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Self::new(seed::venues(), seed::promotions(), seed::reports(now))
    }

    /// Venue promotions are aimed at: the selected one, else the first
    #[must_use]
    pub fn target_venue(&self) -> Option<&Venue> {
        self.selected_venue
            .as_ref()
            .and_then(|id| self.venues.get(id))
            .or_else(|| self.venues.first())
    }

    /// Strategy for the target venue
    #[must_use]
    pub fn strategy_suggestion(&self) -> Option<StrategySuggestion> {
        self.target_venue().map(StrategySuggestion::for_venue)
    }

    /// Reports about a venue, newest first
    #[must_use]
    pub fn reports_for_venue(&self, venue_id: &VenueId) -> Vec<&FanReport> {
        let mut reports: Vec<_> = self
            .reports
            .iter()
            .filter(|r| &r.venue_id == venue_id)
            .collect();
        reports.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        reports
    }

    /// The ticket on display, if any
    #[must_use]
    pub const fn ticket(&self) -> Option<&Ticket> {
        self.flow.ticket()
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Everything that can happen to the application
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppAction {
    // ========== Navigation ==========
    /// Menu selection
    Navigate {
        /// Screen to show
        view: View,
    },
    /// Clear the bridge and put the fan app back to its idle feed
    ReturnToIdle,

    // ========== Venues ==========
    /// Apply an occupancy delta (door counter buttons)
    UpdateOccupancy {
        /// Venue to update
        venue_id: VenueId,
        /// Signed change
        delta: i64,
    },
    /// Dashboard shortcut: aim promotions at a venue and open the registry
    TriggerPromo {
        /// Venue to target
        venue_id: VenueId,
    },
    /// Aim promotions at a venue
    SelectTargetVenue {
        /// Venue to target
        venue_id: VenueId,
    },
    /// Register a new venue
    OnboardVenue {
        /// Display name
        name: String,
        /// City or district
        location: String,
        /// Nominal capacity
        capacity: u32,
    },
    /// Force a venue closed or reopen it
    SetVenueClosed {
        /// Venue to update
        venue_id: VenueId,
        /// `true` to close
        closed: bool,
    },

    // ========== Promotions ==========
    /// Add a placeholder promotion
    AddPromotion,
    /// Replace a promotion's title or description
    EditPromotion {
        /// Promotion to edit
        promotion_id: PromotionId,
        /// Field to replace
        field: PromotionField,
        /// New text
        value: String,
    },
    /// Remove a promotion
    DeletePromotion {
        /// Promotion to remove
        promotion_id: PromotionId,
    },
    /// Execute or abort a promotion
    TogglePromotion {
        /// Promotion to toggle
        promotion_id: PromotionId,
    },

    // ========== Fan app ==========
    /// Close the incoming-promotion overlay
    DismissOffer,
    /// Open the reservation form
    OpenReservationForm,
    /// Change the party size by `delta` guests
    AdjustPartySize {
        /// Signed change
        delta: i32,
    },
    /// Change the duration by whole 15-minute steps
    AdjustDuration {
        /// Signed number of steps
        steps: i32,
    },
    /// Type the guest name
    SetGuestName {
        /// Free text
        name: String,
    },
    /// Book the reservation and show its ticket
    ConfirmReservation,
    /// Close the reservation form
    CloseReservationForm,
    /// Claim the offered promotion (or the standing feed card)
    ClaimPromotion,
    /// Dismiss the ticket
    CloseTicket,
    /// One second of countdown elapsed
    CountdownTick {
        /// Ticket the countdown was started for
        ticket_id: TicketId,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the promoter reducer
#[derive(Clone)]
pub struct PromoterEnvironment {
    /// Clock for ticket issue times
    pub clock: Arc<dyn Clock>,
    /// Source of venue, promotion and ticket ids
    pub ids: Arc<dyn IdGenerator>,
    /// Tunables
    pub config: PromoterConfig,
}

impl PromoterEnvironment {
    /// Creates a new `PromoterEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, config: PromoterConfig) -> Self {
        Self { clock, ids, config }
    }

    /// Wall clock and random ids
    #[must_use]
    pub fn production(config: PromoterConfig) -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(UuidGenerator), config)
    }
}

impl std::fmt::Debug for PromoterEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromoterEnvironment")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the whole application
#[derive(Clone, Debug, Default)]
pub struct PromoterReducer;

impl PromoterReducer {
    /// Creates a new `PromoterReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Record why a command was ignored
    fn reject(state: &mut AppState, reason: String) -> Effects {
        tracing::debug!(%reason, "Command rejected");
        state.last_rejection = Some(reason);
        SmallVec::new()
    }

    /// Move the fan app to `next`, cancelling the countdown if a ticket was shown
    fn set_flow(state: &mut AppState, next: FlowState) -> Effects {
        let previous = std::mem::replace(&mut state.flow, next);
        if previous.has_ticket() {
            tracing::debug!(to = state.flow.name(), "Leaving ticket, cancelling countdown");
            smallvec![Effect::Cancel(COUNTDOWN)]
        } else {
            SmallVec::new()
        }
    }

    fn return_to_idle(state: &mut AppState) -> Effects {
        if let Some(cleared) = state.bridge.clear() {
            tracing::debug!(promotion = %cleared.id, "Dispatch bridge cleared");
        }
        Self::set_flow(state, FlowState::Idle)
    }

    fn navigate(state: &mut AppState, view: View) -> Effects {
        let leaving_fan_app = state.view == View::FanApp && view != View::FanApp;
        tracing::debug!(from = ?state.view, to = ?view, "Navigate");
        state.view = view;

        if view == View::FanApp {
            Self::return_to_idle(state)
        } else if leaving_fan_app {
            Self::set_flow(state, FlowState::Idle)
        } else {
            SmallVec::new()
        }
    }

    fn publish(state: &mut AppState, promotion: Promotion) -> Effects {
        tracing::info!(promotion = %promotion.id, title = %promotion.title, "Promotion dispatched");
        if let Some(replaced) = state.bridge.publish(promotion.clone()) {
            tracing::debug!(replaced = %replaced.id, "Previous dispatch overwritten");
        }
        state.view = View::FanApp;
        Self::set_flow(state, FlowState::offer(promotion))
    }

    fn start_ticket(state: &mut AppState, ticket: Ticket, env: &PromoterEnvironment) -> Effects {
        let ticket_id = ticket.id.clone();
        tracing::info!(
            ticket = %ticket_id,
            cost = %ticket.total_cost,
            expires_in = %redemption::format_countdown(ticket.expires_in_seconds),
            "Ticket issued"
        );

        let mut effects = Self::set_flow(state, FlowState::TicketActive(ticket));
        effects.push(cancellable! {
            id: COUNTDOWN,
            effect: interval! {
                period: env.config.countdown_tick(),
                action: AppAction::CountdownTick { ticket_id }
            }
        });
        effects
    }

    fn delete_promotion(state: &mut AppState, promotion_id: &PromotionId) -> Effects {
        let Some(removed) = state.promotions.delete(promotion_id) else {
            tracing::debug!(promotion = %promotion_id, "Delete of unknown promotion ignored");
            return SmallVec::new();
        };
        tracing::info!(promotion = %removed.id, "Promotion deleted");

        if state.bridge.is_publishing(&removed.id) {
            state.bridge.clear();
        }
        if state.flow.offered().is_some_and(|p| p.id == removed.id) {
            return Self::set_flow(state, FlowState::Idle);
        }
        SmallVec::new()
    }

    fn countdown_tick(state: &mut AppState, ticket_id: &TicketId) -> Effects {
        let FlowState::TicketActive(ticket) = &mut state.flow else {
            tracing::trace!(ticket = %ticket_id, "Tick without a ticket ignored");
            return SmallVec::new();
        };
        if &ticket.id != ticket_id {
            tracing::trace!(ticket = %ticket_id, "Tick for a replaced ticket ignored");
            return SmallVec::new();
        }

        match redemption::advance_countdown(ticket) {
            Countdown::Running(left) => {
                tracing::trace!(ticket = %ticket.id, left = %redemption::format_countdown(left), "Tick");
                SmallVec::new()
            },
            Countdown::Expired => {
                tracing::info!(ticket = %ticket.id, "Ticket expired");
                smallvec![Effect::Cancel(COUNTDOWN)]
            },
            Countdown::Stopped => SmallVec::new(),
        }
    }
}

impl Reducer for PromoterReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = PromoterEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if !matches!(action, AppAction::CountdownTick { .. }) {
            state.last_rejection = None;
        }

        match action {
            // ========== Navigation ==========
            AppAction::Navigate { view } => Self::navigate(state, view),

            AppAction::ReturnToIdle => Self::return_to_idle(state),

            // ========== Venues ==========
            AppAction::UpdateOccupancy { venue_id, delta } => {
                match state
                    .venues
                    .apply_delta(&venue_id, delta, env.config.overflow_allowance)
                {
                    Some(venue) => tracing::debug!(
                        venue = %venue.id,
                        occupancy = venue.current_occupancy,
                        status = %venue.status,
                        "Occupancy updated"
                    ),
                    None => tracing::debug!(venue = %venue_id, "Update for unknown venue ignored"),
                }
                SmallVec::new()
            },

            AppAction::TriggerPromo { venue_id } => {
                if state.venues.get(&venue_id).is_none() {
                    return Self::reject(state, format!("Venue {venue_id} not found"));
                }
                state.selected_venue = Some(venue_id);
                Self::navigate(state, View::Promotions)
            },

            AppAction::SelectTargetVenue { venue_id } => {
                if state.venues.get(&venue_id).is_none() {
                    return Self::reject(state, format!("Venue {venue_id} not found"));
                }
                state.selected_venue = Some(venue_id);
                SmallVec::new()
            },

            AppAction::OnboardVenue {
                name,
                location,
                capacity,
            } => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Self::reject(state, "Venue name cannot be empty".to_string());
                }
                let id = VenueId::new(env.ids.next_id("venue"));
                let venue = state.venues.onboard(id, name, location.trim().to_string(), capacity);
                tracing::info!(venue = %venue.id, name = %venue.name, capacity = venue.capacity, "Venue onboarded");
                Self::navigate(state, View::Dashboard)
            },

            AppAction::SetVenueClosed { venue_id, closed } => {
                match state.venues.set_closed(&venue_id, closed) {
                    Some(venue) => {
                        tracing::info!(venue = %venue.id, status = %venue.status, "Venue status set");
                        SmallVec::new()
                    },
                    None => Self::reject(state, format!("Venue {venue_id} not found")),
                }
            },

            // ========== Promotions ==========
            AppAction::AddPromotion => {
                let id = PromotionId::new(env.ids.next_id("promo"));
                let promotion = state.promotions.create(id, PromotionDraft::default());
                tracing::info!(promotion = %promotion.id, "Promotion drafted");
                SmallVec::new()
            },

            AppAction::EditPromotion {
                promotion_id,
                field,
                value,
            } => {
                if !state.promotions.edit(&promotion_id, field, value) {
                    tracing::debug!(promotion = %promotion_id, "Edit of unknown promotion ignored");
                }
                SmallVec::new()
            },

            AppAction::DeletePromotion { promotion_id } => {
                Self::delete_promotion(state, &promotion_id)
            },

            AppAction::TogglePromotion { promotion_id } => {
                match state.promotions.toggle(&promotion_id) {
                    ToggleOutcome::Activated(promotion) => Self::publish(state, promotion),
                    ToggleOutcome::Deactivated => {
                        tracing::info!(promotion = %promotion_id, "Promotion aborted");
                        SmallVec::new()
                    },
                    ToggleOutcome::NotFound => {
                        Self::reject(state, format!("Promotion {promotion_id} not found"))
                    },
                }
            },

            // ========== Fan app ==========
            AppAction::DismissOffer => {
                if state.flow.offered().is_none() {
                    let reason = format!("No offer to dismiss in {}", state.flow.name());
                    return Self::reject(state, reason);
                }
                Self::return_to_idle(state)
            },

            AppAction::OpenReservationForm => {
                let can_open = matches!(
                    state.flow,
                    FlowState::Idle
                        | FlowState::PromotionOffered {
                            style: RedemptionStyle::Reservation,
                            ..
                        }
                );
                if !can_open {
                    let reason =
                        format!("Cannot open the reservation form from {}", state.flow.name());
                    return Self::reject(state, reason);
                }
                Self::set_flow(state, FlowState::ReservationForm(ReservationForm::default()))
            },

            AppAction::AdjustPartySize { delta } => {
                let FlowState::ReservationForm(form) = &mut state.flow else {
                    return Self::reject(state, "No reservation form open".to_string());
                };
                form.adjust_party_size(delta);
                SmallVec::new()
            },

            AppAction::AdjustDuration { steps } => {
                let FlowState::ReservationForm(form) = &mut state.flow else {
                    return Self::reject(state, "No reservation form open".to_string());
                };
                if !form.adjust_duration(steps) {
                    tracing::debug!(steps, "Duration change out of range ignored");
                }
                SmallVec::new()
            },

            AppAction::SetGuestName { name } => {
                let FlowState::ReservationForm(form) = &mut state.flow else {
                    return Self::reject(state, "No reservation form open".to_string());
                };
                form.guest_name = name;
                SmallVec::new()
            },

            AppAction::ConfirmReservation => {
                let FlowState::ReservationForm(form) = &state.flow else {
                    return Self::reject(state, "No reservation form open".to_string());
                };
                let ticket = redemption::issue_reservation(
                    TicketId::new(env.ids.next_id("ticket")),
                    form,
                    state.target_venue().map(|v| v.id.clone()),
                    env.clock.now(),
                );
                Self::start_ticket(state, ticket, env)
            },

            AppAction::CloseReservationForm => {
                if state.flow.form().is_none() {
                    return Self::reject(state, "No reservation form open".to_string());
                }
                Self::set_flow(state, FlowState::Idle)
            },

            AppAction::ClaimPromotion => {
                let promotion = match &state.flow {
                    FlowState::PromotionOffered {
                        promotion,
                        style: RedemptionStyle::InstantClaim,
                    } => Some(promotion.clone()),
                    FlowState::Idle => None,
                    _ => {
                        let reason = format!("Cannot claim a promotion from {}", state.flow.name());
                        return Self::reject(state, reason);
                    },
                };
                let ticket = redemption::issue_promo_ticket(
                    TicketId::new(env.ids.next_id("ticket")),
                    promotion.as_ref(),
                    env.config.promo_claim_minutes,
                    state.target_venue().map(|v| v.id.clone()),
                    env.clock.now(),
                );
                Self::start_ticket(state, ticket, env)
            },

            AppAction::CloseTicket => {
                if !state.flow.has_ticket() {
                    return Self::reject(state, "No ticket to close".to_string());
                }
                Self::set_flow(state, FlowState::Idle)
            },

            AppAction::CountdownTick { ticket_id } => Self::countdown_tick(state, &ticket_id),
        }
    }
}
