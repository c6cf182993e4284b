//! End-to-end settlement scenarios against a seeded airline state.
use chrono::{TimeZone, Utc};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use skylink_core::pirep::PirepSubmission;
use skylink_core::settlement::{settle, SettlementContext};
use skylink_core::state::{
    ActiveFlightRow, AirlineState, AircraftStatus, BidStatus, DestinationOfTheMonth, FleetAircraft,
    Pilot, StoredBid,
};
use skylink_core::EconomyConfig;

fn seeded_state() -> AirlineState {
    let mut state = AirlineState::default();
    let mut pilot = Pilot::new("SKY0001", "Ada", "Nasser");
    pilot.balance = 1000;
    state.pilots.push(pilot);
    state.fleet.push(FleetAircraft::new("SL-ABC", "B738", "OMDB"));
    state.bids.push(StoredBid {
        id: 1,
        pilot_id: "SKY0001".to_string(),
        callsign: "SKY101".to_string(),
        aircraft_registration: Some("SL-ABC".to_string()),
        planned_fuel: Some(2050.0),
        activity_id: None,
        status: BidStatus::InProgress,
    });
    state.active_flights.push(ActiveFlightRow {
        pilot_id: "SKY0001".to_string(),
        callsign: "SKY101".to_string(),
        flight_number: "SKY101".to_string(),
        departure_icao: "OMDB".to_string(),
        arrival_icao: "OTHH".to_string(),
        started_at: Utc.with_ymd_and_hms(2026, 8, 7, 10, 0, 0).unwrap(),
    });
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
        aircraft_registration: Some("SL-ABC".to_string()),
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
fn smooth_flight_settles_cleanly() {
    let config = EconomyConfig::default();
    let ctx = SettlementContext {
        config: &config,
        secret: None,
        now: Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap(),
    };
    let mut state = seeded_state();
    let mut rng = SmallRng::seed_from_u64(99);

    let response = settle(&mut state, &ctx, &submission(-150.0), &mut rng).unwrap();

    assert!(response.success);
    assert!(response.message.contains("PIREP accepted"));
    // Routine landing: only baseline wear on the airframe.
    let health = response.aircraft_health.unwrap();
    assert!((99.5..=100.0).contains(&health), "health {health}");
    assert_eq!(state.fleet[0].status, AircraftStatus::Available);
    // One flight does not cross any rank threshold.
    assert!(response.new_rank.is_none());

    // Pilot was paid: base balance plus flight credits plus bonus credits.
    let breakdown = response.revenue_breakdown.unwrap();
    let expected_balance =
        1000 + breakdown.total_earned + response.bonus_credits.unwrap();
    assert_eq!(state.pilots[0].balance, expected_balance);
    assert_eq!(state.pilots[0].total_flights, 1);
    assert!((state.pilots[0].total_hours - 1.0).abs() < 1e-9);
    assert_eq!(state.pilots[0].current_location, "OTHH");

    // The bid was consumed and the active flight removed.
    assert!(state.bids.is_empty());
    assert!(state.active_flights.is_empty());

    // Ledger entries reconcile with the airline running totals.
    let ledger_sum: i64 = state.finance_log.iter().map(|e| e.amount).sum();
    assert_eq!(state.finance.balance - 1_000_000, ledger_sum);
}

#[test]
fn hard_landing_is_rejected_without_economy() {
    let config = EconomyConfig::default();
    let ctx = SettlementContext {
        config: &config,
        secret: None,
        now: Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap(),
    };
    let mut state = seeded_state();
    let mut rng = SmallRng::seed_from_u64(99);

    let response = settle(&mut state, &ctx, &submission(-750.0), &mut rng).unwrap();

    assert!(response.success);
    assert!(response.message.contains("REJECTED"));
    assert!(response.revenue_breakdown.is_none());

    // Cleanup only: record persisted, bid and active flight removed.
    assert_eq!(state.flights.len(), 1);
    assert!(state.bids.is_empty());
    assert!(state.active_flights.is_empty());

    // No economy, fleet, or pilot mutation.
    assert!(state.finance_log.is_empty());
    assert_eq!(state.finance.total_revenue, 0);
    assert_eq!(state.pilots[0].balance, 1000);
    assert_eq!(state.pilots[0].total_flights, 0);
    assert_eq!(state.fleet[0].condition, 100.0);
}

#[test]
fn retried_submission_cannot_double_consume_the_bid() {
    let config = EconomyConfig::default();
    let ctx = SettlementContext {
        config: &config,
        secret: None,
        now: Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap(),
    };
    let mut state = seeded_state();
    let mut rng = SmallRng::seed_from_u64(99);

    let first = settle(&mut state, &ctx, &submission(-150.0), &mut rng).unwrap();
    let balance_after_first = state.pilots[0].balance;

    // Client retry after a lost response. The bid and active flight are
    // gone, so fleet resolution falls back and no bid is re-consumed.
    let second = settle(&mut state, &ctx, &submission(-150.0), &mut rng).unwrap();
    assert!(second.success);
    assert!(state.bids.is_empty());
    assert_eq!(state.flights.len(), 2);

    // The duplicate still pays (documented at-most-once boundary), but the
    // fuel-efficiency bonus tied to the bid's planned fuel is gone.
    assert!(state.pilots[0].balance > balance_after_first);
    assert!(first.bonus_credits.unwrap() >= second.bonus_credits.unwrap());
}

#[test]
fn dotm_window_bonus_lands_in_message_and_breakdown() {
    let config = EconomyConfig::default();
    let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
    let ctx = SettlementContext {
        config: &config,
        secret: None,
        now,
    };
    let mut state = seeded_state();
    state.dotm = Some(DestinationOfTheMonth {
        airport_icao: "OTHH".to_string(),
        month: 8,
        year: 2026,
        bonus_points: 750,
        is_active: true,
    });
    let mut rng = SmallRng::seed_from_u64(99);

    let response = settle(&mut state, &ctx, &submission(-150.0), &mut rng).unwrap();
    assert!(response.message.contains("750 DOTM Bonus"));
    assert_eq!(response.revenue_breakdown.unwrap().dotm_bonus, 750);
}

#[test]
fn stale_dotm_is_deactivated_and_pays_nothing() {
    let config = EconomyConfig::default();
    let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
    let ctx = SettlementContext {
        config: &config,
        secret: None,
        now,
    };
    let mut state = seeded_state();
    state.dotm = Some(DestinationOfTheMonth {
        airport_icao: "OTHH".to_string(),
        month: 7,
        year: 2026,
        bonus_points: 750,
        is_active: true,
    });
    let mut rng = SmallRng::seed_from_u64(99);

    let response = settle(&mut state, &ctx, &submission(-150.0), &mut rng).unwrap();
    assert_eq!(response.revenue_breakdown.unwrap().dotm_bonus, 0);
    assert!(!state.dotm.as_ref().unwrap().is_active);
}

#[test]
fn signed_submission_round_trips_through_settlement() {
    let config = EconomyConfig::default();
    let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
    let ctx = SettlementContext {
        config: &config,
        secret: Some("shared-secret"),
        now,
    };
    let mut state = seeded_state();
    let mut rng = SmallRng::seed_from_u64(99);

    let mut sub = submission(-150.0);
    let ts = now.timestamp_millis() - 1_000;
    sub.timestamp = Some(ts);
    sub.signature = Some(skylink_core::signature::sign(
        "shared-secret",
        &sub.pilot_id,
        sub.landing_rate,
        ts,
    ));
    assert!(settle(&mut state, &ctx, &sub, &mut rng).is_ok());

    // Tampering after signing is caught.
    let mut state = seeded_state();
    sub.landing_rate = -80.0;
    let err = settle(&mut state, &ctx, &sub, &mut rng).unwrap_err();
    assert_eq!(err.http_status(), 403);
}
