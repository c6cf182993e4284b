//! PIREP settlement: verification, the rejection gate, and the staged
//! pipeline that turns an accepted submission into ledger mutations.
//!
//! Stage ordering matters: the active-flight/bid removal after the core
//! economy mutation is the idempotency barrier for retried submissions.
//! Side stages (credits, progression, awards) are best-effort and must not
//! abort settlement of the core record.
use chrono::{DateTime, Datelike, Utc};
use log::{error, info, warn};
use rand::Rng;
use thiserror::Error;

use crate::config::EconomyConfig;
use crate::credits::{calculate_flight_credits, CreditInputs};
use crate::economy::{self, EconomyInputs};
use crate::grading::settlement_grade;
use crate::pirep::{PirepSubmission, RevenueBreakdown, SettlementResponse};
use crate::progression::{advance_activity, advance_tours, FlownLeg};
use crate::rank::{check_and_grant_awards, check_and_upgrade_rank};
use crate::signature::{self, TrustLevel};
use crate::state::{
    AirlineState, ApprovedStatus, FinanceEntry, FinanceKind, FlightRecord, PilotStatus,
};
use crate::wear::{apply_landing_wear, WearParams};

/// Landing rates below this raise a moderation notice, fpm.
const MODERATION_FLAG_FPM: f64 = -800.0;
/// Checkride hard-landing fail threshold, fpm.
const CHECKRIDE_FAIL_FPM: f64 = -400.0;
/// Checkride touchdown-G fail threshold.
const CHECKRIDE_FAIL_G: f64 = 1.6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// Bad or missing signature, stale timestamp, blacklisted account.
    #[error("security violation: {0}")]
    Security(String),
    /// Unknown pilot.
    #[error("not found: {0}")]
    NotFound(String),
    /// The primary record or balance mutation could not be persisted.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl SettlementError {
    /// HTTP status the server maps this error to.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Security(_) => 403,
            Self::NotFound(_) => 404,
            Self::Persistence(_) => 500,
        }
    }
}

/// Per-deployment settlement context.
#[derive(Debug, Clone)]
pub struct SettlementContext<'a> {
    pub config: &'a EconomyConfig,
    /// Shared HMAC secret; `None` disables signature checks.
    pub secret: Option<&'a str>,
    pub now: DateTime<Utc>,
}

/// Settle one PIREP submission against the airline state.
///
/// # Errors
///
/// Returns [`SettlementError`] for security violations and unknown pilots.
/// Policy rejections (hard landings, failed checkrides) are *not* errors;
/// they settle into a rejected record and an `Ok` response.
pub fn settle(
    state: &mut AirlineState,
    ctx: &SettlementContext<'_>,
    submission: &PirepSubmission,
    rng: &mut impl Rng,
) -> Result<SettlementResponse, SettlementError> {
    verify_signature(ctx, submission)?;

    let pilot = state
        .find_pilot(&submission.pilot_id)
        .ok_or_else(|| SettlementError::NotFound("Pilot not found".to_string()))?;
    if pilot.status == PilotStatus::Blacklist {
        return Err(SettlementError::Security("Account blacklisted".to_string()));
    }
    let pilot_id = pilot.pilot_id.clone();
    let pilot_name = pilot.full_name();
    let routes_flown_before = pilot.routes_flown.clone();
    let last_flight_before = pilot.last_flight_at;

    if submission.landing_rate < MODERATION_FLAG_FPM {
        warn!(
            "moderation: hard landing {:.0} fpm by {pilot_name} ({pilot_id}) on {} ({}->{})",
            submission.landing_rate,
            submission.callsign,
            submission.departure_icao,
            submission.arrival_icao
        );
    }

    // ── Rejection gate ────────────────────────────────────────────
    if submission.landing_rate < ctx.config.auto_reject_landing_rate {
        let message = format!(
            "PIREP REJECTED! Landing rate of {:.0} fpm exceeds threshold of {:.0} fpm.",
            submission.landing_rate, ctx.config.auto_reject_landing_rate
        );
        reject(state, ctx, submission, &pilot_id, &pilot_name, None);
        return Ok(SettlementResponse::rejection(message));
    }

    // ── Checkride gate ────────────────────────────────────────────
    let mut checkride_passed = false;
    if submission.is_checkride() {
        let mut verdict = None;
        if submission.landing_rate < CHECKRIDE_FAIL_FPM {
            verdict = Some("Failed (Hard Landing)");
        }
        if let Some(g) = submission.touchdown_g() {
            if g.abs() > CHECKRIDE_FAIL_G {
                verdict = Some("Failed (High G-Force)");
            }
        }
        if let Some(verdict) = verdict {
            reject(
                state,
                ctx,
                submission,
                &pilot_id,
                &pilot_name,
                Some(&format!("CHECKRIDE FAILED: {verdict}")),
            );
            return Ok(SettlementResponse::rejection(format!(
                "Checkride FAILED: {verdict}. Please try again."
            )));
        }
        checkride_passed = true;
    }

    // ── Economy ───────────────────────────────────────────────────
    // All randomness happens here, before the pure calculator runs.
    let pax = submission
        .pax
        .filter(|p| *p > 0)
        .unwrap_or_else(|| rng.gen_range(50..=150));
    let cargo = submission
        .cargo
        .filter(|c| *c > 0)
        .unwrap_or_else(|| rng.gen_range(500..=5000));
    let score = submission.score.unwrap_or(100);
    let review = passenger_review(submission.landing_rate, score, rng).to_string();

    deactivate_stale_dotm(state, ctx.now);
    let breakdown = economy::calculate(
        &EconomyInputs {
            pax,
            cargo,
            distance_nm: submission.distance_nm,
            fuel_used: submission.fuel_used,
            flight_minutes: submission.flight_time_minutes,
            score,
            departure_icao: &submission.departure_icao,
            arrival_icao: &submission.arrival_icao,
            butter_score: submission.butter_score(),
        },
        ctx.config,
        state.dotm.as_ref(),
        ctx.now.month(),
        ctx.now.year(),
    );
    let flight_credits = breakdown.flight_credits();

    // ── Flight record (must succeed) ──────────────────────────────
    let flight_id = state.allocate_flight_id();
    state.insert_flight(FlightRecord {
        id: flight_id,
        pilot_id: pilot_id.clone(),
        pilot_name: pilot_name.clone(),
        flight_number: flight_number_of(submission),
        callsign: submission.callsign.clone(),
        departure_icao: submission.departure_icao.clone(),
        arrival_icao: submission.arrival_icao.clone(),
        alternate_icao: submission.alternate_icao.clone(),
        route: submission.route.clone(),
        aircraft_type: submission.aircraft_type.clone(),
        flight_time_minutes: submission.flight_time_minutes,
        landing_rate: submission.landing_rate,
        landing_grade: Some(settlement_grade(submission.landing_rate).to_string()),
        max_g_force: submission.touchdown_g().unwrap_or(1.0),
        fuel_used: submission.fuel_used,
        distance_nm: submission.distance_nm,
        pax,
        cargo,
        score,
        comfort_score: submission.comfort_score.unwrap_or(100.0),
        deductions: submission.deduction_reasons(),
        approved_status: ApprovedStatus::Accepted,
        comments: submission.comments.clone(),
        acars_version: acars_version_of(submission),
        submitted_at: ctx.now,
        revenue_passenger: breakdown.revenue_passenger,
        revenue_cargo: breakdown.revenue_cargo,
        expense_fuel: breakdown.expense_fuel,
        expense_airport: breakdown.expense_airport,
        expense_pilot: breakdown.expense_pilot,
        expense_maintenance: breakdown.expense_maintenance,
        real_profit: breakdown.net_profit,
        passenger_rating: Some(passenger_rating(score)),
        passenger_review: Some(review),
        credits_earned: None,
        credits_breakdown: Vec::new(),
    });

    // ── Airline finances ──────────────────────────────────────────
    apply_finance(state, submission, &pilot_id, &pilot_name, flight_id, &breakdown, ctx.now);

    // ── Pilot totals (must succeed) ───────────────────────────────
    {
        let pilot = state
            .find_pilot_mut(&pilot_id)
            .ok_or_else(|| SettlementError::Persistence("pilot row vanished".to_string()))?;
        pilot.total_flights += 1;
        pilot.total_hours += submission.flight_time_minutes / 60.0;
        pilot.total_credits += breakdown.gross_revenue;
        pilot.balance += flight_credits;
        pilot.current_location = submission.arrival_icao.clone();
        pilot.last_activity = Some(ctx.now);
        pilot.status = PilotStatus::Active;
    }

    // ── Fleet resolution & wear ───────────────────────────────────
    let closed_bid = state.find_open_bid(&pilot_id, &submission.callsign).cloned();
    let registration = submission
        .aircraft_registration
        .clone()
        .filter(|r| !r.is_empty())
        .or_else(|| closed_bid.as_ref().and_then(|b| b.aircraft_registration.clone()));
    let resolved_registration = registration
        .filter(|r| state.find_aircraft(r).is_some())
        .or_else(|| {
            state
                .fleet
                .iter()
                .find(|a| {
                    a.aircraft_type == submission.aircraft_type
                        && a.current_location == submission.departure_icao
                })
                .map(|a| a.registration.clone())
        });

    if let Some(bid) = &closed_bid {
        state.remove_bid(bid.id);
    }

    let mut aircraft_health = None;
    if let Some(registration) = &resolved_registration {
        let params = WearParams {
            landing_rate: submission.landing_rate,
            g_force_touchdown: submission.touchdown_g(),
            explicit_damage: submission.airframe_damage.map(|d| d.total_damage),
        };
        let config = ctx.config;
        if let Some(aircraft) = state.find_aircraft_mut(registration) {
            let outcome = apply_landing_wear(
                aircraft,
                &params,
                config,
                &submission.arrival_icao,
                submission.flight_time_minutes,
                &submission.callsign,
                flight_id,
                &pilot_id,
                ctx.now,
            );
            aircraft_health = Some(outcome.health_after);
            if let Some(entry) = outcome.maintenance {
                state.maintenance_log.push(entry);
            }
        }
    }

    // ── Progression (best-effort) ─────────────────────────────────
    let leg = FlownLeg {
        pilot_id: &pilot_id,
        departure_icao: &submission.departure_icao,
        arrival_icao: &submission.arrival_icao,
        aircraft_type: &submission.aircraft_type,
    };
    let mut tour_messages = Vec::new();
    if let Some(activity_id) = closed_bid.as_ref().and_then(|b| b.activity_id.clone()) {
        tour_messages.extend(advance_activity(state, &activity_id, &leg, ctx.now));
    }
    tour_messages.extend(advance_tours(state, &leg, ctx.now));

    // ── Idempotency barrier ───────────────────────────────────────
    state.remove_active_flight(&pilot_id, &submission.callsign);

    info!(
        "{pilot_name} landed at {} ({:.0} fpm, score {score}) on {}",
        submission.arrival_icao, submission.landing_rate, submission.callsign
    );

    // ── Rank & awards ─────────────────────────────────────────────
    let new_rank = check_and_upgrade_rank(state, &pilot_id);
    let newly_granted_awards = check_and_grant_awards(state, &pilot_id, ctx.now);

    // ── Bonus credits (best-effort) ───────────────────────────────
    let credit_breakdown = calculate_flight_credits(
        &CreditInputs {
            departure_icao: &submission.departure_icao,
            arrival_icao: &submission.arrival_icao,
            landing_rate: submission.landing_rate,
            flight_time_minutes: submission.flight_time_minutes,
            fuel_used: Some(submission.fuel_used),
            planned_fuel: closed_bid.as_ref().and_then(|b| b.planned_fuel),
            deduction_reasons: &submission.deduction_reasons(),
            is_event_flight: false,
            routes_flown: &routes_flown_before,
            last_flight_at: last_flight_before,
            now: ctx.now,
        },
        ctx.config,
    );
    if credit_breakdown.total > 0 {
        if let Some(pilot) = state.find_pilot_mut(&pilot_id) {
            pilot.balance += credit_breakdown.total;
            let route_key = format!(
                "{}-{}",
                submission.departure_icao, submission.arrival_icao
            );
            if !pilot.routes_flown.contains(&route_key) {
                pilot.routes_flown.push(route_key);
            }
            pilot.last_flight_at = Some(ctx.now);
        } else {
            error!("credit award skipped: pilot {pilot_id} not found");
        }
    }
    if let Some(record) = state.flight_mut(flight_id) {
        record.credits_earned = Some(credit_breakdown.total);
        record.credits_breakdown = credit_breakdown.details.clone();
    }

    // ── Response ──────────────────────────────────────────────────
    let mut message = format!(
        "PIREP accepted. Airline Profit: {}{}cr. You earned: {flight_credits}cr.",
        if breakdown.net_profit > 0 { "+" } else { "" },
        breakdown.net_profit
    );
    if credit_breakdown.total > 0 {
        message.push_str(&format!(" +{} bonus CR", credit_breakdown.total));
    }
    if checkride_passed {
        message.push_str(" CHECKRIDE PASSED!");
    }
    if breakdown.dotm_bonus > 0 {
        message.push_str(&format!(" (Includes {} DOTM Bonus!)", breakdown.dotm_bonus));
    }
    if breakdown.butter_bonus > 0 {
        message.push_str(&format!(
            " (Includes {} Butter Bonus!)",
            breakdown.butter_bonus
        ));
    }
    for fragment in &tour_messages {
        message.push_str(fragment);
    }
    if let Some(rank) = &new_rank {
        message.push_str(&format!(" PROMOTION: {rank}!"));
    }

    Ok(SettlementResponse {
        success: true,
        message,
        credits_earned: Some(flight_credits),
        bonus_credits: Some(credit_breakdown.total),
        credits_breakdown: credit_breakdown.details,
        new_rank,
        newly_granted_awards: Some(newly_granted_awards),
        aircraft_health: Some(aircraft_health.unwrap_or(100.0)),
        revenue_breakdown: Some(RevenueBreakdown {
            gross_revenue: breakdown.gross_revenue,
            fuel_tax: breakdown.fuel_tax,
            penalty_fines: breakdown.penalty_fines,
            total_deductions: breakdown.total_deductions,
            net_pilot_pay: breakdown.net_pilot_pay,
            dotm_bonus: breakdown.dotm_bonus,
            butter_bonus: breakdown.butter_bonus,
            total_earned: flight_credits,
        }),
    })
}

fn verify_signature(
    ctx: &SettlementContext<'_>,
    submission: &PirepSubmission,
) -> Result<(), SettlementError> {
    let level = signature::verify(
        ctx.secret,
        &submission.pilot_id,
        submission.landing_rate,
        submission.timestamp,
        submission.signature.as_deref(),
        ctx.now.timestamp_millis(),
    )
    .map_err(|e| {
        warn!("security: {e} (pilot {})", submission.pilot_id);
        SettlementError::Security(e.to_string())
    })?;
    if level == TrustLevel::Degraded {
        warn!(
            "pilot {} submitted without HMAC signature; timestamp check only",
            submission.pilot_id
        );
    }
    Ok(())
}

/// Persist a rejected record and run the cleanup mutation: the active
/// flight and every open bid go away, nothing else moves.
fn reject(
    state: &mut AirlineState,
    ctx: &SettlementContext<'_>,
    submission: &PirepSubmission,
    pilot_id: &str,
    pilot_name: &str,
    comments: Option<&str>,
) {
    let flight_id = state.allocate_flight_id();
    state.insert_flight(FlightRecord {
        id: flight_id,
        pilot_id: pilot_id.to_string(),
        pilot_name: pilot_name.to_string(),
        flight_number: flight_number_of(submission),
        callsign: submission.callsign.clone(),
        departure_icao: submission.departure_icao.clone(),
        arrival_icao: submission.arrival_icao.clone(),
        alternate_icao: submission.alternate_icao.clone(),
        route: submission.route.clone(),
        aircraft_type: submission.aircraft_type.clone(),
        flight_time_minutes: submission.flight_time_minutes,
        landing_rate: submission.landing_rate,
        landing_grade: None,
        max_g_force: submission.touchdown_g().unwrap_or(1.0),
        fuel_used: submission.fuel_used,
        distance_nm: submission.distance_nm,
        pax: submission.pax.unwrap_or(0),
        cargo: submission.cargo.unwrap_or(0),
        score: submission.score.unwrap_or(100),
        comfort_score: submission.comfort_score.unwrap_or(100.0),
        deductions: submission.deduction_reasons(),
        approved_status: ApprovedStatus::Rejected,
        comments: comments
            .map(str::to_string)
            .or_else(|| submission.comments.clone()),
        acars_version: acars_version_of(submission),
        submitted_at: ctx.now,
        revenue_passenger: 0,
        revenue_cargo: 0,
        expense_fuel: 0,
        expense_airport: 0,
        expense_pilot: 0,
        expense_maintenance: 0,
        real_profit: 0,
        passenger_rating: None,
        passenger_review: None,
        credits_earned: None,
        credits_breakdown: Vec::new(),
    });
    state.remove_active_flight(pilot_id, &submission.callsign);
    state.remove_open_bids(pilot_id);
}

fn apply_finance(
    state: &mut AirlineState,
    submission: &PirepSubmission,
    pilot_id: &str,
    pilot_name: &str,
    flight_id: u64,
    breakdown: &economy::EconomyBreakdown,
    now: DateTime<Utc>,
) {
    let entries = [
        (
            breakdown.gross_revenue,
            FinanceKind::FlightRevenue,
            format!(
                "Revenue Flight {} ({}-{})",
                submission.callsign, submission.departure_icao, submission.arrival_icao
            ),
        ),
        (
            -breakdown.expense_fuel,
            FinanceKind::FuelCost,
            format!("Fuel for {}", submission.callsign),
        ),
        (
            -breakdown.expense_airport,
            FinanceKind::LandingFee,
            format!("Landing fees at {}", submission.arrival_icao),
        ),
        (
            -breakdown.expense_pilot,
            FinanceKind::PilotPay,
            format!("Pilot salary for {pilot_name}"),
        ),
        (
            -breakdown.expense_maintenance,
            FinanceKind::Maintenance,
            format!("Wear & tear for {}", submission.aircraft_type),
        ),
        (
            breakdown.total_deductions,
            FinanceKind::RevenueSplit,
            format!(
                "Vault deposit: fuel tax {} Cr + penalties {} Cr from {}",
                breakdown.fuel_tax, breakdown.penalty_fines, submission.callsign
            ),
        ),
    ];
    for (amount, kind, description) in entries {
        state.finance_log.push(FinanceEntry {
            amount,
            kind,
            description,
            reference_flight: flight_id,
            pilot_id: pilot_id.to_string(),
        });
    }
    state.finance.balance += breakdown.net_profit + breakdown.total_deductions;
    state.finance.total_revenue += breakdown.gross_revenue;
    state.finance.total_expenses += breakdown.total_expenses;
    state.finance.last_updated = Some(now);
}

/// Deactivate a destination-of-the-month whose window has passed.
fn deactivate_stale_dotm(state: &mut AirlineState, now: DateTime<Utc>) {
    if let Some(dotm) = &mut state.dotm {
        if dotm.is_active && !(dotm.month == now.month() && dotm.year == now.year()) {
            dotm.is_active = false;
        }
    }
}

fn flight_number_of(submission: &PirepSubmission) -> String {
    if submission.flight_number.is_empty() {
        "N/A".to_string()
    } else {
        submission.flight_number.clone()
    }
}

fn acars_version_of(submission: &PirepSubmission) -> String {
    submission
        .acars_version
        .clone()
        .unwrap_or_else(|| "1.0.0".to_string())
}

/// 1-5 stars from the flight score.
fn passenger_rating(score: i64) -> u8 {
    let stars = (score as f64 / 20.0).ceil() as i64;
    stars.clamp(1, 5) as u8
}

const REVIEWS_EXCELLENT: [&str; 4] = [
    "Best flight of my life! The landing was like a kiss.",
    "Smooth operator! Didn't even feel the touchdown.",
    "Professional service and a perfect landing. A+",
    "Luxury in the air. 5 stars all the way.",
];
const REVIEWS_GOOD: [&str; 4] = [
    "A solid flight, fairly smooth arrival.",
    "Everything went well. The crew was very polite.",
    "On time and safe. Average landing.",
    "Good value for money. Would fly Skylink again.",
];
const REVIEWS_FIRM: [&str; 4] = [
    "A bit of a bump on landing, but we got there safe.",
    "Decent flight, but the touchdown was a little firm.",
    "Average experience. Nothing special.",
    "Work on those landings! Otherwise a good flight.",
];
const REVIEWS_BAD: [&str; 4] = [
    "I think I need to see a chiropractor! Hard landing.",
    "Terrifying landing. Why was it so hard?",
    "Not a great experience. Very rough arrival.",
    "Please retrain the pilot. That was not smooth at all.",
];

fn passenger_review(landing_rate: f64, score: i64, rng: &mut impl Rng) -> &'static str {
    let bank: &[&'static str; 4] = if landing_rate > -150.0 && score >= 90 {
        &REVIEWS_EXCELLENT
    } else if landing_rate > -300.0 && score >= 75 {
        &REVIEWS_GOOD
    } else if landing_rate > -500.0 {
        &REVIEWS_FIRM
    } else {
        &REVIEWS_BAD
    };
    bank[rng.gen_range(0..bank.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::state::Pilot;

    fn context(config: &EconomyConfig) -> SettlementContext<'_> {
        SettlementContext {
            config,
            secret: None,
            now: Utc::now(),
        }
    }

    fn seeded_state() -> AirlineState {
        let mut state = AirlineState::default();
        state.pilots.push(Pilot::new("SKY0001", "Ada", "Nasser"));
        state
    }

    fn submission(landing_rate: f64) -> PirepSubmission {
        PirepSubmission {
            pilot_id: "SKY0001".to_string(),
            flight_number: "SKY101".to_string(),
            callsign: "SKY101".to_string(),
            departure_icao: "OMDB".to_string(),
            arrival_icao: "OTHH".to_string(),
            aircraft_type: "B738".to_string(),
            flight_time_minutes: 60.0,
            landing_rate,
            fuel_used: 2000.0,
            distance_nm: 500.0,
            pax: Some(120),
            cargo: Some(2500),
            score: Some(95),
            ..PirepSubmission::default()
        }
    }

    #[test]
    fn threshold_boundary_is_strict() {
        let config = EconomyConfig::default();
        let mut rng = SmallRng::seed_from_u64(7);

        let mut state = seeded_state();
        let at = settle(&mut state, &context(&config), &submission(-700.0), &mut rng).unwrap();
        assert!(!at.message.contains("REJECTED"), "{}", at.message);

        let mut state = seeded_state();
        let below =
            settle(&mut state, &context(&config), &submission(-701.0), &mut rng).unwrap();
        assert!(below.message.contains("REJECTED"), "{}", below.message);
        assert!(state.finance_log.is_empty());
    }

    #[test]
    fn unknown_pilot_is_not_found() {
        let config = EconomyConfig::default();
        let mut state = AirlineState::default();
        let mut rng = SmallRng::seed_from_u64(7);
        let err =
            settle(&mut state, &context(&config), &submission(-150.0), &mut rng).unwrap_err();
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn blacklisted_pilot_is_blocked_before_mutation() {
        let config = EconomyConfig::default();
        let mut state = seeded_state();
        state.pilots[0].status = PilotStatus::Blacklist;
        let mut rng = SmallRng::seed_from_u64(7);
        let err =
            settle(&mut state, &context(&config), &submission(-150.0), &mut rng).unwrap_err();
        assert_eq!(err.http_status(), 403);
        assert!(state.flights.is_empty());
    }

    #[test]
    fn checkride_fails_on_hard_landing() {
        let config = EconomyConfig::default();
        let mut state = seeded_state();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut sub = submission(-450.0);
        sub.flight_number = "CHK001".to_string();
        let response = settle(&mut state, &context(&config), &sub, &mut rng).unwrap();
        assert!(response.message.contains("Checkride FAILED"));
        assert_eq!(state.flights.len(), 1);
        assert_eq!(state.flights[0].approved_status, ApprovedStatus::Rejected);
        // No economy ran.
        assert_eq!(state.pilots[0].balance, 0);
    }

    #[test]
    fn checkride_pass_is_announced() {
        let config = EconomyConfig::default();
        let mut state = seeded_state();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut sub = submission(-150.0);
        sub.flight_number = "CHK001".to_string();
        let response = settle(&mut state, &context(&config), &sub, &mut rng).unwrap();
        assert!(response.message.contains("CHECKRIDE PASSED"));
    }

    #[test]
    fn finance_ledger_reconciles_with_running_totals() {
        let config = EconomyConfig::default();
        let mut state = seeded_state();
        let mut rng = SmallRng::seed_from_u64(42);
        let starting_balance = state.finance.balance;

        settle(&mut state, &context(&config), &submission(-150.0), &mut rng).unwrap();
        settle(&mut state, &context(&config), &submission(-220.0), &mut rng).unwrap();

        let ledger_sum: i64 = state.finance_log.iter().map(|e| e.amount).sum();
        assert_eq!(state.finance.balance - starting_balance, ledger_sum);
    }

    #[test]
    fn passenger_rating_bands() {
        assert_eq!(passenger_rating(100), 5);
        assert_eq!(passenger_rating(81), 5);
        assert_eq!(passenger_rating(80), 4);
        assert_eq!(passenger_rating(1), 1);
        assert_eq!(passenger_rating(0), 1);
    }
}
