//! Seed data loaded at startup.

use crate::types::{
    FanReport, Promotion, PromotionId, PromotionType, ReportCategory, ReportId, Severity, Venue,
    VenueId, VenueStatus,
};
use chrono::{DateTime, Duration, Utc};

/// The three launch venues
#[must_use]
pub fn venues() -> Vec<Venue> {
    vec![
        Venue {
            id: VenueId::new("v1"),
            name: "The Turbo Paddock".to_string(),
            location: "San Francisco".to_string(),
            capacity: 200,
            current_occupancy: 45,
            queue_length: 0,
            status: VenueStatus::Open,
        },
        Venue {
            id: VenueId::new("v2"),
            name: "Pit Stop Pub".to_string(),
            location: "Santa Clara - Sunnyvale".to_string(),
            capacity: 150,
            current_occupancy: 150,
            queue_length: 25,
            status: VenueStatus::AtCapacity,
        },
        Venue {
            id: VenueId::new("v3"),
            name: "Apex Club".to_string(),
            location: "San Jose".to_string(),
            capacity: 300,
            current_occupancy: 210,
            queue_length: 10,
            status: VenueStatus::Open,
        },
    ]
}

/// The three ready-made promotions, all inactive
#[must_use]
pub fn promotions() -> Vec<Promotion> {
    vec![
        Promotion {
            id: PromotionId::new("p1"),
            title: "Flash Hour: First Names \"M\"".to_string(),
            description: "1 Free Drink for anyone with a name starting with M.".to_string(),
            duration_minutes: 30,
            active: false,
            promotion_type: PromotionType::FreeItem,
            target_audience: Some("Names starting with M".to_string()),
        },
        Promotion {
            id: PromotionId::new("p2"),
            title: "Meritocracy Spot Release".to_string(),
            description: "Skip the line! 5 Spots available for 1 Meritocracy Coin.".to_string(),
            duration_minutes: 15,
            active: false,
            promotion_type: PromotionType::Access,
            target_audience: None,
        },
        Promotion {
            id: PromotionId::new("p3"),
            title: "Launch Party VIP Access".to_string(),
            description: "Exclusive entry to the Williams Motorhome.".to_string(),
            duration_minutes: 60,
            active: false,
            promotion_type: PromotionType::Access,
            target_audience: Some("VIPs Only".to_string()),
        },
    ]
}

/// Two sample fan reports, filed 15 and 5 minutes before `now`
#[must_use]
pub fn reports(now: DateTime<Utc>) -> Vec<FanReport> {
    vec![
        FanReport {
            id: ReportId::new("r1"),
            venue_id: VenueId::new("v2"),
            category: ReportCategory::Maintenance,
            description: "Restroom sink 2 is leaking water everywhere.".to_string(),
            timestamp: now - Duration::minutes(15),
            severity: Severity::High,
        },
        FanReport {
            id: ReportId::new("r2"),
            venue_id: VenueId::new("v1"),
            category: ReportCategory::Vibe,
            description: "Music is too quiet, needs more energy!".to_string(),
            timestamp: now - Duration::minutes(5),
            severity: Severity::Low,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venue::derive_status;

    #[test]
    fn seeded_statuses_match_occupancy() {
        for venue in venues() {
            assert_eq!(
                derive_status(venue.status, venue.current_occupancy, venue.capacity),
                venue.status,
                "{} has an inconsistent status",
                venue.name
            );
        }
    }

    #[test]
    fn seeded_promotions_start_inactive() {
        assert!(promotions().iter().all(|p| !p.active));
    }

    #[test]
    fn reports_are_in_the_past() {
        let now = Utc::now();
        assert!(reports(now).iter().all(|r| r.timestamp < now));
    }
}
