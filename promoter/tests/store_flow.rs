//! Integration tests for the promoter reducer running on a real Store
//!
//! Time is paused, so countdown ticks are observed deterministically.

use flash_promoter::types::{PromotionId, TicketStatus, View};
use flash_promoter::{
    AppAction, AppState, PromoterConfig, PromoterEnvironment, PromoterReducer, COUNTDOWN,
};
use flash_promoter_core::environment::Clock;
use flash_promoter_runtime::Store;
use flash_promoter_testing::{mocks::SequentialIds, test_clock};
use std::sync::Arc;
use std::time::Duration;

type PromoterStore = Store<AppState, AppAction, PromoterEnvironment, PromoterReducer>;

fn store() -> PromoterStore {
    flash_promoter_testing::helpers::init_test_tracing();
    let env = PromoterEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(SequentialIds::new()),
        PromoterConfig::default(),
    );
    Store::new(AppState::seeded(test_clock().now()), PromoterReducer::new(), env)
}

async fn send(store: &PromoterStore, action: AppAction) {
    let result = store.send(action).await;
    assert!(result.is_ok(), "send failed: {result:?}");
}

async fn seconds_left(store: &PromoterStore) -> Option<u32> {
    store.state(|s| s.ticket().map(|t| t.expires_in_seconds)).await
}

async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[tokio::test(start_paused = true)]
async fn reservation_counts_down_once_per_second() {
    let store = store();

    send(&store, AppAction::OpenReservationForm).await;
    send(&store, AppAction::ConfirmReservation).await;
    assert_eq!(seconds_left(&store).await, Some(900));
    assert!(store.is_running(&COUNTDOWN));

    advance(Duration::from_millis(5_500)).await;
    assert_eq!(seconds_left(&store).await, Some(895));
}

#[tokio::test(start_paused = true)]
async fn dispatched_promotion_is_claimed_in_fan_app() {
    let store = store();

    send(&store, AppAction::TogglePromotion {
        promotion_id: PromotionId::new("p1"),
    })
    .await;
    let (view, published) = store
        .state(|s| (s.view, s.bridge.current().map(|p| p.id.clone())))
        .await;
    assert_eq!(view, View::FanApp);
    assert_eq!(published, Some(PromotionId::new("p1")));

    send(&store, AppAction::ClaimPromotion).await;
    advance(Duration::from_millis(2_500)).await;
    assert_eq!(seconds_left(&store).await, Some(1_798));
}

#[tokio::test(start_paused = true)]
async fn closing_ticket_stops_countdown() {
    let store = store();

    send(&store, AppAction::ClaimPromotion).await;
    advance(Duration::from_millis(1_500)).await;
    send(&store, AppAction::CloseTicket).await;

    assert!(!store.is_running(&COUNTDOWN));
    assert_eq!(store.running_cancellables(), 0);
    assert_eq!(seconds_left(&store).await, None);
}

#[tokio::test(start_paused = true)]
async fn new_ticket_does_not_inherit_old_countdown() {
    let store = store();

    send(&store, AppAction::ClaimPromotion).await;
    advance(Duration::from_millis(2_500)).await;
    assert_eq!(seconds_left(&store).await, Some(1_798));

    send(&store, AppAction::CloseTicket).await;
    send(&store, AppAction::ClaimPromotion).await;
    assert_eq!(store.running_cancellables(), 1);

    advance(Duration::from_millis(3_200)).await;
    assert_eq!(seconds_left(&store).await, Some(1_797));
    assert_eq!(store.running_cancellables(), 1);
}

#[tokio::test(start_paused = true)]
async fn leaving_fan_app_tears_down_countdown() {
    let store = store();

    send(&store, AppAction::TogglePromotion {
        promotion_id: PromotionId::new("p1"),
    })
    .await;
    send(&store, AppAction::ClaimPromotion).await;
    send(&store, AppAction::Navigate {
        view: View::Dashboard,
    })
    .await;

    assert!(!store.is_running(&COUNTDOWN));
    advance(Duration::from_secs(3)).await;
    assert_eq!(seconds_left(&store).await, None);
}

#[tokio::test(start_paused = true)]
async fn redispatch_supersedes_running_ticket() {
    let store = store();

    send(&store, AppAction::ClaimPromotion).await;
    send(&store, AppAction::TogglePromotion {
        promotion_id: PromotionId::new("p2"),
    })
    .await;

    assert!(!store.is_running(&COUNTDOWN));
    let offered = store.state(|s| s.flow.offered().map(|p| p.id.clone())).await;
    assert_eq!(offered, Some(PromotionId::new("p2")));
}

#[tokio::test(start_paused = true)]
async fn ticket_expires_and_stays_expired() {
    let store = store();

    send(&store, AppAction::OpenReservationForm).await;
    send(&store, AppAction::ConfirmReservation).await;

    advance(Duration::from_secs(900) + Duration::from_millis(500)).await;
    let ticket = store.state(|s| s.ticket().cloned()).await;
    let ticket = ticket.unwrap_or_else(|| unreachable!("expired ticket stays displayed"));
    assert_eq!(ticket.expires_in_seconds, 0);
    assert_eq!(ticket.status, TicketStatus::Expired);
    assert!(!store.is_running(&COUNTDOWN));

    advance(Duration::from_secs(5)).await;
    assert_eq!(seconds_left(&store).await, Some(0));

    send(&store, AppAction::CloseTicket).await;
    assert_eq!(seconds_left(&store).await, None);
}

#[tokio::test(start_paused = true)]
async fn countdown_ticks_are_observable() {
    let store = store();
    let mut ticks = store.subscribe_actions();

    send(&store, AppAction::ClaimPromotion).await;
    advance(Duration::from_millis(1_500)).await;

    let observed = ticks.try_recv();
    assert!(
        matches!(observed, Ok(AppAction::CountdownTick { .. })),
        "expected a tick, got {observed:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_aborts_countdown() {
    let store = store();

    send(&store, AppAction::ClaimPromotion).await;
    let result = store.shutdown(Duration::from_secs(1)).await;

    assert!(result.is_ok());
    assert_eq!(store.running_cancellables(), 0);
    assert!(store.send(AppAction::CloseTicket).await.is_err());
}
