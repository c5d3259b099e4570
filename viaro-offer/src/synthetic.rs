use crate::models::Offering;
use crate::provider::{OfferingError, OfferingProvider};
use async_trait::async_trait;
use chrono::NaiveTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use viaro_core::search::SearchCriteria;

const OPERATORS: [&str; 6] = [
    "Orange Tours",
    "VRL Travels",
    "Sharma Transports",
    "Neeta Coaches",
    "KPN Express",
    "Parveen Roadways",
];

// Vehicle class paired with its template fare before jitter.
const VEHICLE_CLASSES: [(&str, i32); 4] = [
    ("AC Sleeper", 900),
    ("AC Seater", 650),
    ("Non-AC Sleeper", 500),
    ("Volvo Multi-Axle", 1100),
];

// Departure hour/minute, arrival hour/minute, rendered duration.
const SCHEDULES: [(u32, u32, u32, u32, &str); 6] = [
    (6, 0, 13, 30, "7h 30m"),
    (8, 30, 17, 0, "8h 30m"),
    (14, 0, 22, 15, "8h 15m"),
    (18, 45, 4, 30, "9h 45m"),
    (21, 0, 5, 45, "8h 45m"),
    (23, 15, 7, 0, "7h 45m"),
];

const AMENITY_SETS: [&[&str]; 3] = [
    &["WiFi", "Charging Point", "Water Bottle"],
    &["Blanket", "Reading Light", "Charging Point"],
    &["WiFi", "Snacks", "Blanket", "Emergency Exit"],
];

const CANCELLATION_POLICIES: [&str; 2] = [
    "Free cancellation until 12h before departure",
    "50% refund until 6h before departure",
];

const RATING_SCORES: [f64; 5] = [4.5, 3.9, 4.2, 3.6, 4.8];

const HIGHLIGHT_TAGS: [Option<&str>; 6] =
    [Some("POPULAR"), None, None, Some("TOP RATED"), None, None];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Offerings produced per search.
    #[serde(default = "default_catalog_size")]
    pub catalog_size: usize,
    /// Upper bound of the random amount added to each template fare.
    #[serde(default = "default_price_jitter")]
    pub price_jitter: i32,
    /// Fix the random stream so repeated searches produce identical catalogs.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_catalog_size() -> usize {
    12
}

fn default_price_jitter() -> i32 {
    300
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            catalog_size: default_catalog_size(),
            price_jitter: default_price_jitter(),
            seed: None,
        }
    }
}

/// Stand-in for a live inventory feed. Each slot in the catalog cycles
/// through the template tables, so the mix of operators, classes and
/// schedules is stable; only fares and availability are randomized.
pub struct SyntheticOfferingProvider {
    config: SyntheticConfig,
}

impl SyntheticOfferingProvider {
    pub fn new() -> Self {
        Self::with_config(SyntheticConfig::default())
    }

    pub fn with_config(config: SyntheticConfig) -> Self {
        Self { config }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_config(SyntheticConfig {
            seed: Some(seed),
            ..SyntheticConfig::default()
        })
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn build_offering(&self, slot: usize, rng: &mut StdRng) -> Offering {
        let operator = OPERATORS[slot % OPERATORS.len()];
        let (vehicle_class, template_fare) = VEHICLE_CLASSES[slot % VEHICLE_CLASSES.len()];
        let (dep_h, dep_m, arr_h, arr_m, duration) = SCHEDULES[slot % SCHEDULES.len()];
        let jitter = rng.gen_range(0..=self.config.price_jitter.max(0));

        Offering {
            id: Uuid::new_v4(),
            operator_name: operator.to_string(),
            vehicle_class: vehicle_class.to_string(),
            departure_time: time_of(dep_h, dep_m),
            arrival_time: time_of(arr_h, arr_m),
            duration_label: duration.to_string(),
            unit_price: template_fare + jitter,
            available_seat_count: rng.gen_range(10..=34),
            rating_score: RATING_SCORES[slot % RATING_SCORES.len()],
            amenities: AMENITY_SETS[slot % AMENITY_SETS.len()]
                .iter()
                .map(|amenity| amenity.to_string())
                .collect(),
            cancellation_policy: CANCELLATION_POLICIES[slot % CANCELLATION_POLICIES.len()]
                .to_string(),
            highlight_tag: HIGHLIGHT_TAGS[slot % HIGHLIGHT_TAGS.len()].map(|tag| tag.to_string()),
        }
    }
}

impl Default for SyntheticOfferingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OfferingProvider for SyntheticOfferingProvider {
    async fn generate_offerings(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Offering>, OfferingError> {
        let mut rng = self.rng();
        let offerings: Vec<Offering> = (0..self.config.catalog_size)
            .map(|slot| self.build_offering(slot, &mut rng))
            .collect();
        tracing::debug!(
            "Generated {} synthetic offerings for {} -> {}",
            offerings.len(),
            criteria.origin_name,
            criteria.destination_name
        );
        Ok(offerings)
    }
}

fn time_of(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
