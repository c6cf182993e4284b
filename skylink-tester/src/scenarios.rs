//! Scenario catalog: each scenario drives the client session and the
//! settlement pipeline end to end and asserts the outcome.
use anyhow::{ensure, Context, Result};
use chrono::{TimeZone, Utc};
use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use skylink_core::session::{FlightSession, StartTrigger};
use skylink_core::settlement::{settle, SettlementContext};
use skylink_core::state::{
    Activity, ActivityLeg, AirlineState, Award, AwardCategory, BidStatus, FleetAircraft, Pilot,
    StoredBid, Tour, TourLeg,
};
use skylink_core::{EconomyConfig, RecordingBridge};

use crate::flightgen::{board, fly, submission, FlightPlanSpec};

/// One scenario's verdict.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScenarioResult {
    pub name: String,
    pub seed: u64,
    pub passed: bool,
    pub error: Option<String>,
}

pub type ScenarioFn = fn(u64) -> Result<()>;

/// Name, description, runner.
pub const CATALOG: [(&str, &str, ScenarioFn); 6] = [
    (
        "smoke",
        "Full client flight feeding an accepted settlement",
        run_smoke,
    ),
    (
        "hard-landing",
        "Auto-reject path: cleanup only, no economy",
        run_hard_landing,
    ),
    (
        "checkride",
        "Checkride pass and fail verdicts",
        run_checkride,
    ),
    (
        "tour",
        "Tour progression through completion and award grant",
        run_tour,
    ),
    (
        "replay-guard",
        "Duplicate start triggers and duplicate settlements",
        run_replay_guard,
    ),
    (
        "go-around",
        "Black box re-arms across a go-around",
        run_go_around,
    ),
];

pub fn find(name: &str) -> Option<ScenarioFn> {
    CATALOG
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, _, f)| *f)
}

fn seeded_airline() -> AirlineState {
    let mut state = AirlineState::default();
    let mut pilot = Pilot::new("SKY0001", "Test", "Pilot");
    pilot.balance = 1000;
    state.pilots.push(pilot);
    state.fleet.push(FleetAircraft::new("SL-ABC", "B738", "OMDB"));
    state.bids.push(StoredBid {
        id: 1,
        pilot_id: "SKY0001".to_string(),
        callsign: "SKY101".to_string(),
        aircraft_registration: Some("SL-ABC".to_string()),
        planned_fuel: None,
        activity_id: None,
        status: BidStatus::InProgress,
    });
    state
}

fn context(config: &EconomyConfig) -> SettlementContext<'_> {
    SettlementContext {
        config,
        secret: None,
        now: Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap(),
    }
}

fn run_smoke(seed: u64) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let plan = FlightPlanSpec::default();
    let t0 = Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap();

    let mut session = FlightSession::new(RecordingBridge::default());
    board(&mut session, &plan, t0);
    let fpm = fly(&mut session, &plan, &mut rng, t0);
    ensure!(
        session.bridge().calls("start_flight") == 1,
        "expected exactly one start, got {}",
        session.bridge().calls("start_flight")
    );
    ensure!(
        (fpm - plan.landing_fpm).abs() < 1e-9,
        "black box fpm {fpm} != planned {}",
        plan.landing_fpm
    );

    let config = EconomyConfig::default();
    let mut state = seeded_airline();
    let sub = submission(&plan, fpm, &mut rng);
    let response = settle(&mut state, &context(&config), &sub, &mut rng)
        .context("settlement refused")?;
    ensure!(response.success, "settlement not successful");
    ensure!(
        response.message.contains("PIREP accepted"),
        "unexpected message: {}",
        response.message
    );
    ensure!(state.bids.is_empty(), "bid not consumed");
    ensure!(
        state.pilots[0].balance > 1000,
        "pilot was not paid: {}",
        state.pilots[0].balance
    );
    debug!("smoke response: {}", response.message);
    Ok(())
}

fn run_hard_landing(seed: u64) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let plan = FlightPlanSpec {
        landing_fpm: -750.0,
        ..FlightPlanSpec::default()
    };
    let config = EconomyConfig::default();
    let mut state = seeded_airline();
    let sub = submission(&plan, plan.landing_fpm, &mut rng);
    let response = settle(&mut state, &context(&config), &sub, &mut rng)?;

    ensure!(
        response.message.contains("REJECTED"),
        "expected rejection, got: {}",
        response.message
    );
    ensure!(state.finance_log.is_empty(), "rejection created ledger rows");
    ensure!(
        state.pilots[0].balance == 1000,
        "rejection touched the pilot balance"
    );
    ensure!(state.bids.is_empty(), "rejection left the bid open");
    ensure!(
        state.fleet[0].condition == 100.0,
        "rejection damaged the airframe"
    );
    Ok(())
}

fn run_checkride(seed: u64) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let config = EconomyConfig::default();

    // Fail: hard touchdown on a checkride flight number.
    let fail_plan = FlightPlanSpec {
        flight_number: "CHK001".to_string(),
        landing_fpm: -430.0,
        ..FlightPlanSpec::default()
    };
    let mut state = seeded_airline();
    let sub = submission(&fail_plan, fail_plan.landing_fpm, &mut rng);
    let response = settle(&mut state, &context(&config), &sub, &mut rng)?;
    ensure!(
        response.message.contains("Checkride FAILED"),
        "expected checkride failure, got: {}",
        response.message
    );
    ensure!(
        state.pilots[0].total_flights == 0,
        "failed checkride still settled economy"
    );

    // Pass: gentle touchdown.
    let pass_plan = FlightPlanSpec {
        flight_number: "CHK001".to_string(),
        landing_fpm: -140.0,
        ..FlightPlanSpec::default()
    };
    let mut state = seeded_airline();
    let sub = submission(&pass_plan, pass_plan.landing_fpm, &mut rng);
    let response = settle(&mut state, &context(&config), &sub, &mut rng)?;
    ensure!(
        response.message.contains("CHECKRIDE PASSED"),
        "expected checkride pass, got: {}",
        response.message
    );
    Ok(())
}

fn run_tour(seed: u64) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let config = EconomyConfig::default();
    let mut state = seeded_airline();
    state.tours.push(Tour {
        id: "tour-1".to_string(),
        name: "Desert Circuit".to_string(),
        is_active: true,
        reward_credits: 2000,
        legs: vec![
            TourLeg {
                departure_icao: "OMDB".to_string(),
                arrival_icao: "OTHH".to_string(),
                aircraft_types: Vec::new(),
            },
            TourLeg {
                departure_icao: "OTHH".to_string(),
                arrival_icao: "OERK".to_string(),
                aircraft_types: Vec::new(),
            },
        ],
    });
    state.tour_progress.push(skylink_core::state::TourProgress {
        pilot_id: "SKY0001".to_string(),
        tour_id: "tour-1".to_string(),
        status: skylink_core::state::ProgressStatus::InProgress,
        current_leg_index: 0,
        completed_legs: Vec::new(),
        completed_at: None,
    });
    state.awards.push(Award {
        id: "award-1".to_string(),
        name: "Desert Circuit Wing".to_string(),
        category: AwardCategory::Special,
        required_value: None,
        active: true,
        linked_tour_id: Some("tour-1".to_string()),
    });

    let leg1 = FlightPlanSpec::default();
    let sub = submission(&leg1, -160.0, &mut rng);
    let response = settle(&mut state, &context(&config), &sub, &mut rng)?;
    ensure!(
        response.message.contains("Tour Leg 1 Completed"),
        "leg 1 missed: {}",
        response.message
    );

    let leg2 = FlightPlanSpec {
        callsign: "SKY102".to_string(),
        flight_number: "SKY102".to_string(),
        departure_icao: "OTHH".to_string(),
        arrival_icao: "OERK".to_string(),
        ..FlightPlanSpec::default()
    };
    let sub = submission(&leg2, -170.0, &mut rng);
    let response = settle(&mut state, &context(&config), &sub, &mut rng)?;
    ensure!(
        response.message.contains("TOUR COMPLETED"),
        "completion missed: {}",
        response.message
    );
    ensure!(
        response.message.contains("AWARD UNLOCKED"),
        "award missed: {}",
        response.message
    );
    ensure!(state.pilot_awards.len() == 1, "award row not created");
    Ok(())
}

fn run_replay_guard(seed: u64) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let plan = FlightPlanSpec::default();
    let t0 = Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap();

    // Client half: a rapid second trigger inside the cooldown is absorbed.
    let mut session = FlightSession::new(RecordingBridge::default());
    board(&mut session, &plan, t0);
    session.start_flight(StartTrigger::Manual, t0);
    session.start_flight(StartTrigger::Forced, t0 + chrono::Duration::seconds(4));
    ensure!(
        session.bridge().calls("start_flight") == 1,
        "cooldown failed: {} starts",
        session.bridge().calls("start_flight")
    );

    // Server half: activity legs never advance twice for the same leg.
    let config = EconomyConfig::default();
    let mut state = seeded_airline();
    state.activities.push(Activity {
        id: "act-1".to_string(),
        title: "Gulf Shuttle".to_string(),
        active: true,
        reward_points: 0,
        legs: vec![ActivityLeg {
            id: "leg-1".to_string(),
            departure_icao: Some("OMDB".to_string()),
            arrival_icao: Some("OTHH".to_string()),
            aircraft_types: Vec::new(),
        }],
    });
    state.bids[0].activity_id = Some("act-1".to_string());

    let sub = submission(&plan, -160.0, &mut rng);
    settle(&mut state, &context(&config), &sub, &mut rng)?;
    let legs_after_first = state.activity_progress[0].legs_complete;

    // Retry of the same submission: the bid is gone, but even if the
    // activity were re-entered the completed leg id blocks a re-match.
    settle(&mut state, &context(&config), &sub, &mut rng)?;
    ensure!(
        state.activity_progress[0].legs_complete == legs_after_first,
        "activity leg advanced twice"
    );
    Ok(())
}

fn run_go_around(seed: u64) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let plan = FlightPlanSpec {
        landing_fpm: -520.0,
        ..FlightPlanSpec::default()
    };
    let t0 = Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap();

    let mut session = FlightSession::new(RecordingBridge::default());
    board(&mut session, &plan, t0);
    let first_fpm = fly(&mut session, &plan, &mut rng, t0);
    ensure!(
        (first_fpm - plan.landing_fpm).abs() < 1e-9,
        "first touchdown fpm {first_fpm}"
    );

    // Go around: climb away, come back gentler. The box must re-arm and
    // report the second touchdown independently.
    let go_around = FlightPlanSpec {
        landing_fpm: -130.0,
        ..plan.clone()
    };
    let second_fpm = fly(&mut session, &go_around, &mut rng, t0 + chrono::Duration::hours(1));
    ensure!(
        (second_fpm - go_around.landing_fpm).abs() < 1e-9,
        "second touchdown fpm {second_fpm}"
    );
    Ok(())
}
