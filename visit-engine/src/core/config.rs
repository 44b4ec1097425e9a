use chrono_tz::Tz;

/// Engine configuration
///
/// # Environment variables
///
/// All settings can be overridden through environment variables:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | SHOP_TIMEZONE | Europe/Warsaw | Business timezone for visit numbers |
/// | SHOP_CURRENCY | PLN | ISO 4217 currency code for new visits |
/// | VISIT_NUMBER_PREFIX | SRV | Prefix of generated visit numbers |
///
/// # Example
///
/// ```ignore
/// SHOP_TIMEZONE=Europe/Berlin SHOP_CURRENCY=EUR cargo run
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Business timezone; visit numbers are date-stamped in it
    pub timezone: Tz,
    /// Currency code applied to newly registered visits
    pub currency: String,
    /// Visit number prefix, e.g. "SRV" -> SRV2026011510001
    pub visit_number_prefix: String,
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            timezone: std::env::var("SHOP_TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::Europe::Warsaw),
            currency: std::env::var("SHOP_CURRENCY").unwrap_or_else(|_| "PLN".into()),
            visit_number_prefix: std::env::var("VISIT_NUMBER_PREFIX")
                .unwrap_or_else(|_| "SRV".into()),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
