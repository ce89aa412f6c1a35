//! Flash Promoter demo binary
//!
//! Drives a scripted operator and fan session against a live store.

use anyhow::Context;
use flash_promoter::redemption::format_countdown;
use flash_promoter::types::{PromotionId, VenueId, View};
use flash_promoter::{AppAction, AppState, PromoterConfig, PromoterEnvironment, PromoterReducer};
use flash_promoter_core::environment::{Clock, SystemClock};
use flash_promoter_runtime::{metrics::describe_store_metrics, Store};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type PromoterStore = Store<AppState, AppAction, PromoterEnvironment, PromoterReducer>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    let config = PromoterConfig::from_env().context("invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    describe_store_metrics();

    println!("=== Flash Promoter ===\n");

    let tick = config.countdown_tick();
    let state = AppState::seeded(SystemClock.now());
    let store = Store::new(state, PromoterReducer::new(), PromoterEnvironment::production(config));

    print_dashboard(&store).await;

    println!("\n>>> Door counter: +30 at The Turbo Paddock, +5 at Pit Stop Pub");
    send(&store, AppAction::UpdateOccupancy {
        venue_id: VenueId::new("v1"),
        delta: 30,
    })
    .await?;
    send(&store, AppAction::UpdateOccupancy {
        venue_id: VenueId::new("v2"),
        delta: 5,
    })
    .await?;
    print_dashboard(&store).await;

    println!("\n>>> Trigger promo for Pit Stop Pub");
    send(&store, AppAction::TriggerPromo {
        venue_id: VenueId::new("v2"),
    })
    .await?;
    if let Some(suggestion) = store.state(AppState::strategy_suggestion).await {
        println!("Strategy: {suggestion}");
    }

    println!("\n>>> Execute \"Flash Hour\" and claim it");
    send(&store, AppAction::TogglePromotion {
        promotion_id: PromotionId::new("p1"),
    })
    .await?;
    send(&store, AppAction::ClaimPromotion).await?;
    print_ticket(&store).await;
    send(&store, AppAction::CloseTicket).await?;

    println!("\n>>> Execute \"Meritocracy Spot Release\" and book 3 guests for 30 minutes");
    send(&store, AppAction::TogglePromotion {
        promotion_id: PromotionId::new("p2"),
    })
    .await?;
    send(&store, AppAction::OpenReservationForm).await?;
    send(&store, AppAction::AdjustPartySize { delta: 2 }).await?;
    send(&store, AppAction::AdjustDuration { steps: 1 }).await?;
    send(&store, AppAction::SetGuestName {
        name: "Max".to_string(),
    })
    .await?;
    send(&store, AppAction::ConfirmReservation).await?;
    print_ticket(&store).await;

    println!("\n>>> Waiting for three countdown ticks");
    tokio::time::sleep(tick * 3 + tick / 2).await;
    print_ticket(&store).await;

    println!("\n>>> Back to the dashboard");
    send(&store, AppAction::Navigate {
        view: View::Dashboard,
    })
    .await?;
    let snapshot = store
        .state(|s| serde_json::to_string_pretty(s))
        .await
        .context("failed to serialize state")?;
    println!("{snapshot}");

    store
        .shutdown(Duration::from_secs(5))
        .await
        .context("store did not shut down cleanly")?;

    println!("\n=== Session complete ===");
    Ok(())
}

async fn send(store: &PromoterStore, action: AppAction) -> anyhow::Result<()> {
    store.send(action).await?;
    if let Some(reason) = store.state(|s| s.last_rejection.clone()).await {
        println!("  (ignored: {reason})");
    }
    Ok(())
}

async fn print_dashboard(store: &PromoterStore) {
    let venues = store.state(|s| s.venues.all().to_vec()).await;
    for venue in venues {
        println!(
            "  {:<20} {:>3}/{:<3} ({:>3}%)  {}",
            venue.name,
            venue.current_occupancy,
            venue.capacity,
            venue.load_percent(),
            venue.status
        );
    }
}

async fn print_ticket(store: &PromoterStore) {
    match store.state(|s| s.ticket().cloned()).await {
        Some(ticket) => println!(
            "  Ticket {}: {} ({:?}), cost {}",
            ticket.id,
            format_countdown(ticket.expires_in_seconds),
            ticket.status,
            ticket.total_cost
        ),
        None => println!("  No ticket"),
    }
}
