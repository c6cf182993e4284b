//! Airline economy configuration.
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunable rates consumed by the economy calculator, rejection gate, wear
/// model, and credit bonuses. All fields default so a partial JSON document
/// (or `{}`) yields a working config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    // Revenue rates
    pub ticket_price_per_nm: f64,
    pub cargo_price_per_lb_nm: f64,
    pub fuel_price_per_lb: f64,
    pub base_landing_fee: i64,
    pub pilot_pay_rate: f64,

    // Deductions
    pub fuel_tax_percent: f64,
    pub penalty_multiplier: f64,

    // Rejection / damage thresholds
    /// Landing rates strictly below this are auto-rejected, fpm.
    pub auto_reject_landing_rate: f64,
    pub grounded_health_threshold: f64,
    pub repair_hours_per_percent: f64,

    // Credit bonuses
    pub cr_base_flight: i64,
    pub cr_greaser_bonus: i64,
    pub cr_firm_bonus: i64,
    pub cr_hard_landing_penalty: i64,
    pub cr_fuel_efficiency_bonus: i64,
    pub cr_first_flight_multiplier: f64,
    pub cr_hub_to_hub_bonus: i64,
    pub cr_event_multiplier: f64,
    pub cr_long_haul_4h: i64,
    pub cr_long_haul_8h: i64,
    pub cr_new_route_bonus: i64,

    // Professionalism penalties
    pub cr_taxi_speed_penalty: i64,
    pub cr_light_violation_penalty: i64,
    pub cr_overspeed_penalty: i64,

    /// Airports that count for the hub-to-hub bonus.
    pub hub_airports: Vec<String>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            ticket_price_per_nm: 0.8,
            cargo_price_per_lb_nm: 0.002,
            fuel_price_per_lb: 0.65,
            base_landing_fee: 250,
            pilot_pay_rate: 2500.0,
            fuel_tax_percent: 10.0,
            penalty_multiplier: 5.0,
            auto_reject_landing_rate: -700.0,
            grounded_health_threshold: 20.0,
            repair_hours_per_percent: 2.0,
            cr_base_flight: 100,
            cr_greaser_bonus: 50,
            cr_firm_bonus: 25,
            cr_hard_landing_penalty: -50,
            cr_fuel_efficiency_bonus: 30,
            cr_first_flight_multiplier: 1.2,
            cr_hub_to_hub_bonus: 50,
            cr_event_multiplier: 2.0,
            cr_long_haul_4h: 100,
            cr_long_haul_8h: 250,
            cr_new_route_bonus: 50,
            cr_taxi_speed_penalty: -10,
            cr_light_violation_penalty: -15,
            cr_overspeed_penalty: -50,
            hub_airports: ["OJAI", "ORBI", "OSDI", "OERK", "OMDB", "OTHH"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl EconomyConfig {
    /// Load configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or fails validation.
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error when a rate is outside its meaningful range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auto_reject_landing_rate >= 0.0 {
            return Err(ConfigError::Invalid(
                "auto_reject_landing_rate must be negative".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.fuel_tax_percent) {
            return Err(ConfigError::Invalid(
                "fuel_tax_percent must be within 0..=100".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.grounded_health_threshold) {
            return Err(ConfigError::Invalid(
                "grounded_health_threshold must be within 0..=100".to_string(),
            ));
        }
        if self.repair_hours_per_percent <= 0.0 {
            return Err(ConfigError::Invalid(
                "repair_hours_per_percent must be positive".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_hub(&self, icao: &str) -> bool {
        self.hub_airports.iter().any(|h| h == icao)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EconomyConfig::from_json("{}").unwrap();
        assert_eq!(config, EconomyConfig::default());
    }

    #[test]
    fn partial_document_overrides_one_field() {
        let config = EconomyConfig::from_json(r#"{"base_landing_fee": 400}"#).unwrap();
        assert_eq!(config.base_landing_fee, 400);
        assert_eq!(config.ticket_price_per_nm, 0.8);
    }

    #[test]
    fn rejects_nonsense_thresholds() {
        assert!(EconomyConfig::from_json(r#"{"auto_reject_landing_rate": 100}"#).is_err());
        assert!(EconomyConfig::from_json(r#"{"fuel_tax_percent": 250}"#).is_err());
        assert!(EconomyConfig::from_json(r#"{"repair_hours_per_percent": 0}"#).is_err());
    }
}
