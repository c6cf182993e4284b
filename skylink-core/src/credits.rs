//! Bonus flight credits: the itemized best-effort bonus layer on top of the
//! core economy. Failure here never aborts a settlement.
use chrono::{DateTime, Datelike, Utc};

use crate::config::EconomyConfig;
use crate::economy::round_credits;

/// Itemized bonus credits for one flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreditBreakdown {
    pub base: i64,
    pub landing: i64,
    pub fuel_efficiency: i64,
    pub long_haul: i64,
    pub hub_to_hub: i64,
    pub new_route: i64,
    pub taxi_speed: i64,
    pub light_violation: i64,
    pub overspeed: i64,
    pub multiplier: f64,
    pub total: i64,
    pub details: Vec<String>,
}

/// Inputs to the bonus credit calculator.
#[derive(Debug, Clone)]
pub struct CreditInputs<'a> {
    pub departure_icao: &'a str,
    pub arrival_icao: &'a str,
    pub landing_rate: f64,
    pub flight_time_minutes: f64,
    pub fuel_used: Option<f64>,
    pub planned_fuel: Option<f64>,
    pub deduction_reasons: &'a [String],
    pub is_event_flight: bool,
    pub routes_flown: &'a [String],
    pub last_flight_at: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

fn same_calendar_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.ordinal() == b.ordinal()
}

#[must_use]
pub fn calculate_flight_credits(
    inputs: &CreditInputs<'_>,
    config: &EconomyConfig,
) -> CreditBreakdown {
    let mut breakdown = CreditBreakdown {
        multiplier: 1.0,
        ..CreditBreakdown::default()
    };

    breakdown.base = config.cr_base_flight;
    breakdown
        .details
        .push(format!("Base flight: +{} CR", breakdown.base));

    let abs_rate = inputs.landing_rate.abs();
    if abs_rate <= 150.0 {
        breakdown.landing = config.cr_greaser_bonus;
        breakdown.details.push(format!(
            "Greaser landing ({:.0} fpm): +{} CR",
            inputs.landing_rate, breakdown.landing
        ));
    } else if abs_rate <= 350.0 {
        breakdown.landing = config.cr_firm_bonus;
        breakdown.details.push(format!(
            "Firm but fair ({:.0} fpm): +{} CR",
            inputs.landing_rate, breakdown.landing
        ));
    } else if abs_rate > 600.0 {
        breakdown.landing = config.cr_hard_landing_penalty * 2;
        breakdown.details.push(format!(
            "Very hard landing ({:.0} fpm): {} CR",
            inputs.landing_rate, breakdown.landing
        ));
    } else if abs_rate >= 400.0 {
        breakdown.landing = config.cr_hard_landing_penalty;
        breakdown.details.push(format!(
            "Hard landing ({:.0} fpm): {} CR",
            inputs.landing_rate, breakdown.landing
        ));
    }

    if let (Some(fuel_used), Some(planned)) = (inputs.fuel_used, inputs.planned_fuel) {
        if planned > 0.0 {
            let diff_percent = (fuel_used - planned).abs() / planned * 100.0;
            if diff_percent <= 5.0 {
                breakdown.fuel_efficiency = config.cr_fuel_efficiency_bonus;
                breakdown.details.push(format!(
                    "Fuel efficiency (within 5%): +{} CR",
                    breakdown.fuel_efficiency
                ));
            }
        }
    }

    let flight_hours = inputs.flight_time_minutes / 60.0;
    if flight_hours >= 8.0 {
        breakdown.long_haul = config.cr_long_haul_8h;
        breakdown
            .details
            .push(format!("Long haul 8h+: +{} CR", breakdown.long_haul));
    } else if flight_hours >= 4.0 {
        breakdown.long_haul = config.cr_long_haul_4h;
        breakdown
            .details
            .push(format!("Long haul 4h+: +{} CR", breakdown.long_haul));
    }

    if config.is_hub(inputs.departure_icao)
        && config.is_hub(inputs.arrival_icao)
        && inputs.departure_icao != inputs.arrival_icao
    {
        breakdown.hub_to_hub = config.cr_hub_to_hub_bonus;
        breakdown
            .details
            .push(format!("Hub-to-hub flight: +{} CR", breakdown.hub_to_hub));
    }

    let route_key = format!("{}-{}", inputs.departure_icao, inputs.arrival_icao);
    if !inputs.routes_flown.iter().any(|r| r == &route_key) {
        breakdown.new_route = config.cr_new_route_bonus;
        breakdown
            .details
            .push(format!("New route discovery: +{} CR", breakdown.new_route));
    }

    let first_of_day = match inputs.last_flight_at {
        Some(last) => !same_calendar_day(last, inputs.now),
        None => true,
    };
    if first_of_day {
        breakdown.multiplier *= config.cr_first_flight_multiplier;
        breakdown.details.push(format!(
            "First flight of the day: {:.1}x multiplier",
            config.cr_first_flight_multiplier
        ));
    }

    if inputs.is_event_flight {
        breakdown.multiplier *= config.cr_event_multiplier;
        breakdown.details.push(format!(
            "Event flight: {:.1}x multiplier",
            config.cr_event_multiplier
        ));
    }

    for reason in inputs.deduction_reasons {
        let reason = reason.to_lowercase();
        if reason.contains("taxi") && reason.contains("speed") {
            breakdown.taxi_speed += config.cr_taxi_speed_penalty;
        }
        if reason.contains("light") || reason.contains("strobe") {
            breakdown.light_violation += config.cr_light_violation_penalty;
        }
        if reason.contains("overspeed") || reason.contains("over speed") || reason.contains("vmo")
        {
            breakdown.overspeed += config.cr_overspeed_penalty;
        }
    }
    if breakdown.taxi_speed != 0 {
        breakdown
            .details
            .push(format!("Taxi speed violation: {} CR", breakdown.taxi_speed));
    }
    if breakdown.light_violation != 0 {
        breakdown
            .details
            .push(format!("Light violation: {} CR", breakdown.light_violation));
    }
    if breakdown.overspeed != 0 {
        breakdown
            .details
            .push(format!("Overspeed penalty: {} CR", breakdown.overspeed));
    }

    let raw_total = breakdown.base
        + breakdown.landing
        + breakdown.fuel_efficiency
        + breakdown.long_haul
        + breakdown.hub_to_hub
        + breakdown.new_route
        + breakdown.taxi_speed
        + breakdown.light_violation
        + breakdown.overspeed;
    breakdown.total = round_credits(raw_total as f64 * breakdown.multiplier).max(0);

    breakdown.details.push("---".to_string());
    breakdown
        .details
        .push(format!("Multiplier: {:.2}x", breakdown.multiplier));
    breakdown.details.push(format!("Total: {} CR", breakdown.total));

    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_inputs<'a>(routes: &'a [String], reasons: &'a [String]) -> CreditInputs<'a> {
        CreditInputs {
            departure_icao: "OMDB",
            arrival_icao: "OTHH",
            landing_rate: -140.0,
            flight_time_minutes: 95.0,
            fuel_used: None,
            planned_fuel: None,
            deduction_reasons: reasons,
            is_event_flight: false,
            routes_flown: routes,
            last_flight_at: Some(Utc.with_ymd_and_hms(2026, 8, 7, 6, 0, 0).unwrap()),
            now: Utc.with_ymd_and_hms(2026, 8, 7, 14, 0, 0).unwrap(),
        }
    }

    #[test]
    fn greaser_on_known_route_same_day() {
        let routes = vec!["OMDB-OTHH".to_string()];
        let breakdown = calculate_flight_credits(&base_inputs(&routes, &[]), &EconomyConfig::default());
        assert_eq!(breakdown.base, 100);
        assert_eq!(breakdown.landing, 50);
        assert_eq!(breakdown.hub_to_hub, 50);
        assert_eq!(breakdown.new_route, 0);
        assert_eq!(breakdown.multiplier, 1.0);
        assert_eq!(breakdown.total, 200);
    }

    #[test]
    fn first_flight_of_day_multiplies() {
        let routes = vec!["OMDB-OTHH".to_string()];
        let mut inputs = base_inputs(&routes, &[]);
        inputs.last_flight_at = Some(Utc.with_ymd_and_hms(2026, 8, 6, 23, 0, 0).unwrap());
        let breakdown = calculate_flight_credits(&inputs, &EconomyConfig::default());
        assert!((breakdown.multiplier - 1.2).abs() < 1e-9);
        assert_eq!(breakdown.total, 240);
    }

    #[test]
    fn hard_landing_penalties_and_deductions() {
        let routes = vec!["OMDB-OTHH".to_string()];
        let reasons = vec![
            "Taxi speed exceeded 30 kt".to_string(),
            "Landing light off below 10,000 ft".to_string(),
            "VMO overspeed".to_string(),
        ];
        let mut inputs = base_inputs(&routes, &reasons);
        inputs.landing_rate = -650.0;
        let breakdown = calculate_flight_credits(&inputs, &EconomyConfig::default());
        assert_eq!(breakdown.landing, -100);
        assert_eq!(breakdown.taxi_speed, -10);
        assert_eq!(breakdown.light_violation, -15);
        assert_eq!(breakdown.overspeed, -50);
        // 100 - 100 + 50(hub) - 75 = -25 -> clamped
        assert_eq!(breakdown.total, 0);
    }

    #[test]
    fn fuel_efficiency_window() {
        let routes: Vec<String> = Vec::new();
        let mut inputs = base_inputs(&routes, &[]);
        inputs.fuel_used = Some(10_300.0);
        inputs.planned_fuel = Some(10_000.0);
        let breakdown = calculate_flight_credits(&inputs, &EconomyConfig::default());
        assert_eq!(breakdown.fuel_efficiency, 30);

        inputs.fuel_used = Some(11_000.0);
        let breakdown = calculate_flight_credits(&inputs, &EconomyConfig::default());
        assert_eq!(breakdown.fuel_efficiency, 0);
    }

    #[test]
    fn long_haul_tiers() {
        let routes: Vec<String> = Vec::new();
        let mut inputs = base_inputs(&routes, &[]);
        inputs.flight_time_minutes = 250.0;
        assert_eq!(
            calculate_flight_credits(&inputs, &EconomyConfig::default()).long_haul,
            100
        );
        inputs.flight_time_minutes = 500.0;
        assert_eq!(
            calculate_flight_credits(&inputs, &EconomyConfig::default()).long_haul,
            250
        );
    }
}
