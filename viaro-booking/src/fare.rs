use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareConfig {
    /// Tax applied to the seat subtotal; the tax amount is floored to whole
    /// currency units.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    /// Flat per-booking charge in whole currency units.
    #[serde(default = "default_service_charge")]
    pub service_charge: i32,
}

fn default_tax_rate() -> f64 {
    0.18
}

fn default_service_charge() -> i32 {
    30
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            service_charge: default_service_charge(),
        }
    }
}

/// Line items the summary screen renders.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FareBreakdown {
    pub base: i32,
    pub tax: i32,
    pub service_charge: i32,
    pub total: i32,
}

/// Deterministic fare math. Same inputs, same total, no rounding drift
/// between the stage footer and the summary.
#[derive(Debug, Clone)]
pub struct FareEngine {
    config: FareConfig,
}

impl FareEngine {
    pub fn new(config: FareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FareConfig {
        &self.config
    }

    pub fn breakdown(&self, unit_price: i32, passenger_count: u32) -> FareBreakdown {
        let base = unit_price * passenger_count as i32;
        let tax = (base as f64 * self.config.tax_rate).floor() as i32;
        FareBreakdown {
            base,
            tax,
            service_charge: self.config.service_charge,
            total: base + tax + self.config.service_charge,
        }
    }

    pub fn compute_total(&self, unit_price: i32, passenger_count: u32) -> i32 {
        self.breakdown(unit_price, passenger_count).total
    }
}

impl Default for FareEngine {
    fn default() -> Self {
        Self::new(FareConfig::default())
    }
}
