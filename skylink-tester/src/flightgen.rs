//! Synthetic flight generator: drives a [`FlightSession`] through a
//! believable telemetry stream and produces the matching PIREP submission.
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skylink_core::envelope::{AuthState, BridgeEnvelope, FlightStatus};
use skylink_core::pirep::{FlightLog, LandingAnalysis, PirepSubmission};
use skylink_core::session::FlightSession;
use skylink_core::telemetry::TelemetrySnapshot;
use skylink_core::HostBridge;

/// Plan for one synthetic flight.
#[derive(Debug, Clone)]
pub struct FlightPlanSpec {
    pub pilot_id: String,
    pub flight_number: String,
    pub callsign: String,
    pub departure_icao: String,
    pub arrival_icao: String,
    pub aircraft_type: String,
    pub aircraft_registration: Option<String>,
    pub distance_nm: f64,
    pub flight_minutes: f64,
    /// Target touchdown vertical speed, fpm (negative).
    pub landing_fpm: f64,
    pub score: i64,
}

impl Default for FlightPlanSpec {
    fn default() -> Self {
        Self {
            pilot_id: "SKY0001".to_string(),
            flight_number: "SKY101".to_string(),
            callsign: "SKY101".to_string(),
            departure_icao: "OMDB".to_string(),
            arrival_icao: "OTHH".to_string(),
            aircraft_type: "B738".to_string(),
            aircraft_registration: Some("SL-ABC".to_string()),
            distance_nm: 210.0,
            flight_minutes: 62.0,
            landing_fpm: -180.0,
            score: 95,
        }
    }
}

fn frame(alt: f64, radio: f64, vs: f64, gs: f64, on_ground: bool, phase: &str) -> BridgeEnvelope {
    BridgeEnvelope::Telemetry(TelemetrySnapshot {
        altitude: alt,
        radio_altitude: radio,
        vertical_speed: vs,
        ground_speed: gs,
        on_ground,
        phase: phase.to_string(),
        engines_on: true,
        ..TelemetrySnapshot::default()
    })
}

/// Log the session in and load its bid for the plan.
pub fn board<B: HostBridge>(
    session: &mut FlightSession<B>,
    plan: &FlightPlanSpec,
    now: DateTime<Utc>,
) {
    session.handle_envelope(
        BridgeEnvelope::Auth(AuthState {
            is_logged_in: true,
            pilot_id: plan.pilot_id.clone(),
            pilot_name: "Test Pilot".to_string(),
            ..AuthState::default()
        }),
        now,
    );
    let bid = format!(
        r#"{{"type":"bid","callsign":"{}","flightNumber":"{}","departureIcao":"{}",
            "arrivalIcao":"{}","aircraftType":"{}","expiresAt":"{}"}}"#,
        plan.callsign,
        plan.flight_number,
        plan.departure_icao,
        plan.arrival_icao,
        plan.aircraft_type,
        (now + Duration::hours(24)).to_rfc3339(),
    );
    session.handle_raw(&bid, now);
}

/// Fly the whole profile. Returns the touchdown fpm the black box captured.
pub fn fly<B: HostBridge>(
    session: &mut FlightSession<B>,
    plan: &FlightPlanSpec,
    rng: &mut ChaCha8Rng,
    start: DateTime<Utc>,
) -> f64 {
    let mut now = start;

    // Taxi out below the motion gate, then the takeoff roll trips it.
    session.handle_envelope(frame(15.0, 0.0, 0.0, 14.0, true, "Taxi"), now);
    now += Duration::seconds(45);
    session.handle_envelope(frame(15.0, 0.0, 0.0, 90.0, true, "Takeoff"), now);

    session.handle_envelope(
        BridgeEnvelope::Flight(FlightStatus {
            is_active: true,
            flight_number: plan.flight_number.clone(),
            callsign: plan.callsign.clone(),
            departure_icao: plan.departure_icao.clone(),
            arrival_icao: plan.arrival_icao.clone(),
            aircraft_type: plan.aircraft_type.clone(),
            ..FlightStatus::default()
        }),
        now,
    );

    // Climb and cruise.
    let cruise_alt = 24_000.0 + f64::from(rng.gen_range(0..8)) * 1000.0;
    for step in 1..=6 {
        now += Duration::minutes(2);
        let alt = cruise_alt * f64::from(step) / 6.0;
        session.handle_envelope(frame(alt, alt, 1800.0, 290.0, false, "Climb"), now);
    }
    now += Duration::minutes(plan.flight_minutes as i64 / 2);
    session.handle_envelope(frame(cruise_alt, cruise_alt, 0.0, 450.0, false, "Cruise"), now);

    // Descent into the approach band.
    for step in (1..=5).rev() {
        now += Duration::minutes(3);
        let alt = cruise_alt * f64::from(step) / 6.0;
        session.handle_envelope(frame(alt, alt, -1600.0, 280.0, false, "Descent"), now);
    }

    // Short final: the worst vertical speed inside the band is the landing
    // rate the black box must report.
    now += Duration::minutes(2);
    session.handle_envelope(frame(1500.0, 45.0, plan.landing_fpm, 140.0, false, "Approach"), now);
    session.handle_envelope(
        frame(1460.0, 8.0, plan.landing_fpm * 0.4, 132.0, false, "Flare"),
        now + Duration::seconds(20),
    );
    session.handle_envelope(
        frame(1455.0, 0.5, -40.0, 125.0, true, "Landing"),
        now + Duration::seconds(25),
    );
    session.handle_envelope(
        frame(1455.0, 0.0, 0.0, 35.0, true, "Rollout"),
        now + Duration::seconds(50),
    );

    session
        .last_touchdown()
        .map_or(plan.landing_fpm, |td| td.fpm)
}

/// Build the submission the desktop host would post after [`fly`].
pub fn submission(
    plan: &FlightPlanSpec,
    touchdown_fpm: f64,
    rng: &mut ChaCha8Rng,
) -> PirepSubmission {
    PirepSubmission {
        pilot_id: plan.pilot_id.clone(),
        flight_number: plan.flight_number.clone(),
        callsign: plan.callsign.clone(),
        departure_icao: plan.departure_icao.clone(),
        arrival_icao: plan.arrival_icao.clone(),
        aircraft_type: plan.aircraft_type.clone(),
        aircraft_registration: plan.aircraft_registration.clone(),
        flight_time_minutes: plan.flight_minutes,
        landing_rate: touchdown_fpm,
        fuel_used: plan.distance_nm * rng.gen_range(8.0..11.0),
        distance_nm: plan.distance_nm,
        pax: Some(rng.gen_range(60..160)),
        cargo: Some(rng.gen_range(800..4000)),
        score: Some(plan.score),
        log: Some(FlightLog {
            landing_analysis: Some(LandingAnalysis {
                butter_score: None,
                g_force_touchdown: Some(1.0 + touchdown_fpm.abs() / 1000.0),
            }),
            ..FlightLog::default()
        }),
        ..PirepSubmission::default()
    }
}
