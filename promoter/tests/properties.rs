//! Property tests for occupancy clamping and reservation pricing

use flash_promoter::redemption::{
    format_countdown, reservation_cost, ReservationForm, DURATION_STEP_MINUTES,
    MAX_DURATION_MINUTES, MAX_PARTY_SIZE, MIN_DURATION_MINUTES, MIN_PARTY_SIZE,
};
use flash_promoter::types::{MeritCoins, Venue, VenueId, VenueStatus};
use flash_promoter::venue::apply_occupancy_delta;
use proptest::prelude::*;

fn venue(capacity: u32, occupancy: u32, status: VenueStatus) -> Venue {
    Venue {
        id: VenueId::new("v"),
        name: "Test Venue".into(),
        location: "Nowhere".into(),
        capacity,
        current_occupancy: occupancy,
        queue_length: 3,
        status,
    }
}

proptest! {
    #[test]
    fn occupancy_stays_within_ceiling(
        capacity in 1u32..1_000,
        start in 0u32..1_000,
        overflow in 0u32..100,
        deltas in prop::collection::vec(any::<i64>(), 1..20),
    ) {
        let start = start.min(capacity + overflow);
        let mut current = venue(capacity, start, VenueStatus::Open);

        for delta in deltas {
            current = apply_occupancy_delta(&current, delta, overflow);
            prop_assert!(current.current_occupancy <= capacity + overflow);
            prop_assert_eq!(
                current.status == VenueStatus::AtCapacity,
                current.current_occupancy >= capacity
            );
            prop_assert_eq!(current.queue_length, 3);
        }
    }

    #[test]
    fn closed_venue_stays_closed_below_capacity(
        capacity in 2u32..500,
        deltas in prop::collection::vec(-50i64..50, 1..20),
    ) {
        let mut current = venue(capacity, 0, VenueStatus::Closed);

        for delta in deltas {
            let next = apply_occupancy_delta(&current, delta, 0);
            if current.status == VenueStatus::Closed && next.current_occupancy < capacity {
                prop_assert_eq!(next.status, VenueStatus::Closed);
            }
            current = next;
        }
    }

    #[test]
    fn form_inputs_stay_in_bounds(
        party_moves in prop::collection::vec(-20i32..20, 0..20),
        duration_moves in prop::collection::vec(-10i32..10, 0..20),
    ) {
        let mut form = ReservationForm::default();
        for delta in party_moves {
            form.adjust_party_size(delta);
            prop_assert!((MIN_PARTY_SIZE..=MAX_PARTY_SIZE).contains(&form.party_size()));
        }
        for steps in duration_moves {
            form.adjust_duration(steps);
            let minutes = form.duration_minutes();
            prop_assert!((MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes));
            prop_assert_eq!(minutes % DURATION_STEP_MINUTES, 0);
        }
    }

    #[test]
    fn cost_is_one_coin_per_guest_per_block(
        party_size in MIN_PARTY_SIZE..=MAX_PARTY_SIZE,
        blocks in 1u32..=8,
    ) {
        let mut form = ReservationForm::default();
        form.set_party_size(party_size);
        form.set_duration_minutes(blocks * DURATION_STEP_MINUTES);

        prop_assert_eq!(form.total_cost(), MeritCoins(party_size * blocks));
        prop_assert_eq!(form.total_cost(), reservation_cost(party_size, blocks * 15));
    }

    #[test]
    fn countdown_format_round_trips_seconds(seconds in 0u32..7_200 * 2) {
        let rendered = format_countdown(seconds);
        let (minutes, secs) = rendered.split_once(':').unwrap_or(("x", "x"));
        prop_assert_eq!(secs.len(), 2);
        let minutes: u32 = minutes.parse().unwrap_or(u32::MAX);
        let secs: u32 = secs.parse().unwrap_or(u32::MAX);
        prop_assert_eq!(minutes * 60 + secs, seconds);
    }
}
