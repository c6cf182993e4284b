//! Telemetry snapshots and the significance filter
use serde::{Deserialize, Serialize};

/// Instantaneous sim state pushed over the bridge.
///
/// Ephemeral: each snapshot supersedes the previous one and nothing here is
/// persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetrySnapshot {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub radio_altitude: f64,
    pub heading: f64,
    pub ground_speed: f64,
    pub ias: f64,
    pub vertical_speed: f64,
    pub pitch: f64,
    pub bank: f64,
    pub g_force: f64,
    pub on_ground: bool,
    pub engines_on: bool,
    pub total_fuel: f64,
    pub flaps_position: f64,
    pub gear_position: f64,
    pub parking_brake: bool,
    pub throttle: f64,
    pub stall_warning: bool,
    pub overspeed_warning: bool,
    pub aircraft_title: String,
    pub phase: String,
    pub fuel_percent: f64,
    pub sim_rate: f64,
    pub is_paused: bool,
    pub total_pause_seconds: f64,
    pub is_non_standard: bool,
    pub integrity_score: f64,
    pub flight_progress: f64,
    pub distance_flown_nm: f64,
    pub planned_distance_nm: f64,
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            radio_altitude: 0.0,
            heading: 0.0,
            ground_speed: 0.0,
            ias: 0.0,
            vertical_speed: 0.0,
            pitch: 0.0,
            bank: 0.0,
            g_force: 1.0,
            on_ground: true,
            engines_on: false,
            total_fuel: 0.0,
            flaps_position: 0.0,
            gear_position: 0.0,
            parking_brake: false,
            throttle: 0.0,
            stall_warning: false,
            overspeed_warning: false,
            aircraft_title: "N/A".to_string(),
            phase: "Preflight".to_string(),
            fuel_percent: 0.0,
            sim_rate: 1.0,
            is_paused: false,
            total_pause_seconds: 0.0,
            is_non_standard: false,
            integrity_score: 100.0,
            flight_progress: 0.0,
            distance_flown_nm: 0.0,
            planned_distance_nm: 0.0,
        }
    }
}

/// Whether a candidate snapshot differs enough from the previous one to be
/// worth applying. Phase, ground, and warning flags are always significant;
/// numeric fields use per-field deltas.
#[must_use]
pub fn telemetry_changed(a: &TelemetrySnapshot, b: &TelemetrySnapshot) -> bool {
    a.phase != b.phase
        || a.on_ground != b.on_ground
        || a.stall_warning != b.stall_warning
        || a.overspeed_warning != b.overspeed_warning
        || (a.altitude - b.altitude).abs() > 5.0
        || (a.ias - b.ias).abs() > 1.0
        || (a.ground_speed - b.ground_speed).abs() > 1.0
        || (a.heading - b.heading).abs() > 0.5
        || (a.vertical_speed - b.vertical_speed).abs() > 10.0
        || (a.g_force - b.g_force).abs() > 0.005
        || (a.radio_altitude - b.radio_altitude).abs() > 1.0
}

/// Great-circle distance in nautical miles.
#[must_use]
pub fn haversine_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_NM: f64 = 3440.065;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_NM * a.sqrt().asin()
}
