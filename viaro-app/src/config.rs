use serde::Deserialize;
use std::env;
use viaro_booking::fare::FareConfig;
use viaro_catalog::resolver::ResolverConfig;
use viaro_offer::synthetic::SyntheticConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub search: ResolverConfig,
    #[serde(default)]
    pub offerings: SyntheticConfig,
    #[serde(default)]
    pub fare: FareConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let settings = config::Config::builder()
            // Start off by merging in the "default" configuration file.
            // Every key has a serde default, so a missing file is fine too.
            .add_source(config::File::with_name("config/default").required(false))
            // Add in the current environment file (default: 'development').
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file, not checked in to git.
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of VIARO).
            // E.g. `VIARO__FARE__TAX_RATE=0.12` overrides the tax rate.
            .add_source(config::Environment::with_prefix("VIARO").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let settings = config::Config::builder().build().unwrap();
        let app: AppConfig = settings.try_deserialize().unwrap();
        assert_eq!(app.search.debounce_ms, 300);
        assert_eq!(app.search.min_query_len, 2);
        assert_eq!(app.offerings.catalog_size, 12);
        assert!((app.fare.tax_rate - 0.18).abs() < f64::EPSILON);
        assert_eq!(app.fare.service_charge, 30);
    }
}
