//! # Flash Promoter
//!
//! Venue dashboard and promotion lifecycle for a nightlife operator.
//!
//! The operator watches live occupancy across venues, keeps a registry of
//! promotions, and executes one of them. Executing hands the promotion to a
//! simulated fan app through a single-slot dispatch bridge, where a fan can
//! claim it or book a reservation and receive a ticket with a live countdown.
//!
//! ## Architecture
//!
//! - [`venue`], [`promotion`], [`bridge`], [`redemption`]: pure domain logic
//! - [`reducer`]: composes them into one [`AppState`] driven by [`AppAction`]
//! - [`config`]: tunables loaded from the environment
//! - [`seed`]: launch data
//!
//! The ticket countdown is the only timer. It runs as a cancellable interval
//! effect keyed by [`COUNTDOWN`] and is cancelled on every exit from an
//! active ticket.
//!
//! ## Example
//!
//! ```no_run
//! use flash_promoter::{AppAction, AppState, PromoterEnvironment, PromoterReducer};
//! use flash_promoter::config::PromoterConfig;
//! use flash_promoter::types::PromotionId;
//! use flash_promoter_runtime::Store;
//!
//! # async fn example() -> Result<(), flash_promoter_runtime::StoreError> {
//! let env = PromoterEnvironment::production(PromoterConfig::default());
//! let store = Store::new(AppState::seeded(chrono::Utc::now()), PromoterReducer::new(), env);
//!
//! store
//!     .send(AppAction::TogglePromotion { promotion_id: PromotionId::new("p1") })
//!     .await?;
//! store.send(AppAction::ClaimPromotion).await?;
//!
//! let left = store.state(|s| s.ticket().map(|t| t.expires_in_seconds)).await;
//! assert_eq!(left, Some(1800));
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod config;
pub mod promotion;
pub mod redemption;
pub mod reducer;
pub mod seed;
pub mod types;
pub mod venue;

pub use config::{ConfigError, PromoterConfig};
pub use reducer::{AppAction, AppState, PromoterEnvironment, PromoterReducer, COUNTDOWN};
