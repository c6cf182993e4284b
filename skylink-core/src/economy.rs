//! Flight economy: pure revenue/expense/deduction/bonus computation.
//!
//! Everything here is deterministic and side-effect free. Simulated pax and
//! cargo, passenger reviews, and any other randomness are drawn by the
//! caller before this stage runs. Rounding happens once per term through
//! [`round_credits`] so a recomputation from the same inputs is
//! byte-identical.
use serde::{Deserialize, Serialize};

use crate::config::EconomyConfig;
use crate::state::DestinationOfTheMonth;

/// Butter-landing sub-score at or above which the bonus applies.
const BUTTER_BONUS_FLOOR: f64 = 8.0;
/// Credits per butter-score point.
const BUTTER_BONUS_RATE: f64 = 50.0;

/// The single rounding point for credit arithmetic.
#[must_use]
pub fn round_credits(value: f64) -> i64 {
    value.round() as i64
}

/// Inputs to one economy computation.
#[derive(Debug, Clone, PartialEq)]
pub struct EconomyInputs<'a> {
    pub pax: u32,
    pub cargo: u32,
    pub distance_nm: f64,
    pub fuel_used: f64,
    pub flight_minutes: f64,
    /// Flight score out of 100; drives the penalty term.
    pub score: i64,
    pub departure_icao: &'a str,
    pub arrival_icao: &'a str,
    /// Butter-landing sub-score from the client's landing analysis.
    pub butter_score: Option<f64>,
}

/// Full settlement money split for one flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomyBreakdown {
    pub revenue_passenger: i64,
    pub revenue_cargo: i64,
    pub gross_revenue: i64,
    pub expense_fuel: i64,
    pub expense_airport: i64,
    pub expense_pilot: i64,
    pub expense_maintenance: i64,
    pub total_expenses: i64,
    pub fuel_tax: i64,
    pub penalty_fines: i64,
    pub total_deductions: i64,
    pub net_pilot_pay: i64,
    pub net_profit: i64,
    pub dotm_bonus: i64,
    pub butter_bonus: i64,
}

impl EconomyBreakdown {
    /// Credits paid out to the pilot for this flight.
    #[must_use]
    pub const fn flight_credits(&self) -> i64 {
        self.net_pilot_pay + self.dotm_bonus + self.butter_bonus
    }
}

/// Whether the leg qualifies for the destination-of-the-month bonus in the
/// given calendar month/year.
#[must_use]
pub fn dotm_applies(
    dotm: &DestinationOfTheMonth,
    departure_icao: &str,
    arrival_icao: &str,
    month: u32,
    year: i32,
) -> bool {
    dotm.is_active
        && dotm.month == month
        && dotm.year == year
        && (departure_icao == dotm.airport_icao || arrival_icao == dotm.airport_icao)
}

/// Compute the full money split for one flight.
#[must_use]
pub fn calculate(
    inputs: &EconomyInputs<'_>,
    config: &EconomyConfig,
    dotm: Option<&DestinationOfTheMonth>,
    month: u32,
    year: i32,
) -> EconomyBreakdown {
    let revenue_passenger = round_credits(
        f64::from(inputs.pax) * inputs.distance_nm * config.ticket_price_per_nm,
    );
    let revenue_cargo = round_credits(
        f64::from(inputs.cargo) * inputs.distance_nm * config.cargo_price_per_lb_nm,
    );
    let gross_revenue = revenue_passenger + revenue_cargo;

    let expense_fuel = round_credits(inputs.fuel_used * config.fuel_price_per_lb);
    let expense_airport = config.base_landing_fee + round_credits(inputs.distance_nm * 0.1);
    let expense_pilot = round_credits((inputs.flight_minutes / 60.0) * config.pilot_pay_rate);
    let expense_maintenance = round_credits(inputs.distance_nm * 0.5);
    let total_expenses = expense_fuel + expense_airport + expense_pilot + expense_maintenance;

    let fuel_tax = round_credits(gross_revenue as f64 * (config.fuel_tax_percent / 100.0));
    let penalty_fines = round_credits((100 - inputs.score) as f64 * config.penalty_multiplier);
    let total_deductions = fuel_tax + penalty_fines;

    let net_pilot_pay = (gross_revenue - total_deductions).max(0);
    let net_profit = gross_revenue - total_expenses;

    let dotm_bonus = dotm
        .filter(|d| dotm_applies(d, inputs.departure_icao, inputs.arrival_icao, month, year))
        .map_or(0, |d| d.bonus_points);

    let butter_bonus = inputs
        .butter_score
        .filter(|bs| *bs >= BUTTER_BONUS_FLOOR)
        .map_or(0, |bs| round_credits(bs * BUTTER_BONUS_RATE));

    EconomyBreakdown {
        revenue_passenger,
        revenue_cargo,
        gross_revenue,
        expense_fuel,
        expense_airport,
        expense_pilot,
        expense_maintenance,
        total_expenses,
        fuel_tax,
        penalty_fines,
        total_deductions,
        net_pilot_pay,
        net_profit,
        dotm_bonus,
        butter_bonus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> EconomyInputs<'static> {
        EconomyInputs {
            pax: 120,
            cargo: 2500,
            distance_nm: 500.0,
            fuel_used: 2000.0,
            flight_minutes: 60.0,
            score: 95,
            departure_icao: "OMDB",
            arrival_icao: "OTHH",
            butter_score: None,
        }
    }

    #[test]
    fn breakdown_matches_hand_computation() {
        let config = EconomyConfig::default();
        let b = calculate(&inputs(), &config, None, 8, 2026);

        // 120 pax * 500 nm * 0.8
        assert_eq!(b.revenue_passenger, 48_000);
        // 2500 lb * 500 nm * 0.002
        assert_eq!(b.revenue_cargo, 2_500);
        assert_eq!(b.gross_revenue, 50_500);
        // 2000 lb * 0.65
        assert_eq!(b.expense_fuel, 1_300);
        // 250 + 500*0.1
        assert_eq!(b.expense_airport, 300);
        // 1h * 2500
        assert_eq!(b.expense_pilot, 2_500);
        assert_eq!(b.expense_maintenance, 250);
        assert_eq!(b.total_expenses, 4_350);
        // 10% of gross
        assert_eq!(b.fuel_tax, 5_050);
        // (100-95)*5
        assert_eq!(b.penalty_fines, 25);
        assert_eq!(b.net_pilot_pay, 50_500 - 5_075);
        assert_eq!(b.net_profit, 50_500 - 4_350);
    }

    #[test]
    fn is_referentially_transparent() {
        let config = EconomyConfig::default();
        let a = calculate(&inputs(), &config, None, 8, 2026);
        let b = calculate(&inputs(), &config, None, 8, 2026);
        assert_eq!(a, b);
    }

    #[test]
    fn pilot_pay_never_goes_negative() {
        let config = EconomyConfig::default();
        let mut i = inputs();
        i.pax = 0;
        i.cargo = 0;
        i.score = 0;
        let b = calculate(&i, &config, None, 8, 2026);
        assert_eq!(b.net_pilot_pay, 0);
    }

    #[test]
    fn dotm_bonus_requires_window_and_airport() {
        let config = EconomyConfig::default();
        let dotm = DestinationOfTheMonth {
            airport_icao: "OTHH".to_string(),
            month: 8,
            year: 2026,
            bonus_points: 750,
            is_active: true,
        };

        let hit = calculate(&inputs(), &config, Some(&dotm), 8, 2026);
        assert_eq!(hit.dotm_bonus, 750);

        let wrong_month = calculate(&inputs(), &config, Some(&dotm), 9, 2026);
        assert_eq!(wrong_month.dotm_bonus, 0);

        let mut i = inputs();
        i.departure_icao = "OMAA";
        i.arrival_icao = "OOMS";
        let wrong_airport = calculate(&i, &config, Some(&dotm), 8, 2026);
        assert_eq!(wrong_airport.dotm_bonus, 0);
    }

    #[test]
    fn butter_bonus_has_a_floor() {
        let config = EconomyConfig::default();
        let mut i = inputs();
        i.butter_score = Some(7.9);
        assert_eq!(calculate(&i, &config, None, 8, 2026).butter_bonus, 0);
        i.butter_score = Some(9.2);
        assert_eq!(calculate(&i, &config, None, 8, 2026).butter_bonus, 460);
    }
}
