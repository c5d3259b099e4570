use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// One bookable bus departure as presented to the traveler. Immutable once
/// generated; a new search produces a fresh catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offering {
    pub id: Uuid,
    pub operator_name: String,
    pub vehicle_class: String, // e.g. "AC Sleeper", "Non-AC Seater"
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub duration_label: String, // pre-rendered, e.g. "8h 30m"
    pub unit_price: i32,
    pub available_seat_count: i32,
    pub rating_score: f64,
    pub amenities: BTreeSet<String>,
    pub cancellation_policy: String,
    pub highlight_tag: Option<String>,
}

impl Offering {
    /// Short display label for logs and list rows.
    pub fn label(&self) -> String {
        format!("{} ({})", self.operator_name, self.vehicle_class)
    }

    pub fn has_amenity(&self, amenity: &str) -> bool {
        self.amenities.contains(amenity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offering_label() {
        let offering = Offering {
            id: Uuid::new_v4(),
            operator_name: "Orange Tours".to_string(),
            vehicle_class: "AC Sleeper".to_string(),
            departure_time: NaiveTime::from_hms_opt(21, 30, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            duration_label: "8h 30m".to_string(),
            unit_price: 700,
            available_seat_count: 28,
            rating_score: 4.3,
            amenities: BTreeSet::from(["WiFi".to_string(), "Water Bottle".to_string()]),
            cancellation_policy: "Free cancellation until 12h before departure".to_string(),
            highlight_tag: None,
        };
        assert_eq!(offering.label(), "Orange Tours (AC Sleeper)");
        assert!(offering.has_amenity("WiFi"));
        assert!(!offering.has_amenity("Blanket"));
    }
}
