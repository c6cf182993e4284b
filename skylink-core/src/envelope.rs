//! Bridge wire protocol: inbound envelopes from the host, keyed by a `type`
//! discriminator. Unknown or malformed input fails closed (dropped).
use serde::{Deserialize, Serialize};

use crate::bid::BidMessage;
use crate::telemetry::TelemetrySnapshot;

/// Auth / pilot profile state pushed by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthState {
    pub is_logged_in: bool,
    pub pilot_name: String,
    pub pilot_id: String,
    pub pilot_rank: String,
    pub pilot_avatar: String,
    pub pilot_hours: f64,
    pub pilot_xp: f64,
    pub weight_unit: Option<String>,
    pub device_code: String,
    pub is_logging_in: bool,
}

/// Sim / API link status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionState {
    pub sim_connected: bool,
    pub api_connected: bool,
}

/// Out-Off-On-In timestamps as formatted by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OooiTimes {
    pub gate_out: String,
    pub wheels_off: String,
    pub wheels_on: String,
    pub gate_in: String,
}

/// In-progress flight state pushed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlightStatus {
    pub is_active: bool,
    pub flight_number: String,
    pub callsign: String,
    pub departure_icao: String,
    pub arrival_icao: String,
    pub aircraft_type: String,
    pub current_phase: String,
    pub flight_time: String,
    pub comfort_score: f64,
    pub exceedance_count: u32,
    pub distance_nm: f64,
    pub fuel_used: f64,
    pub landing_rate: f64,
    pub progress: f64,
    pub oooi: OooiTimes,
}

impl Default for FlightStatus {
    fn default() -> Self {
        Self {
            is_active: false,
            flight_number: String::new(),
            callsign: String::new(),
            departure_icao: String::new(),
            arrival_icao: String::new(),
            aircraft_type: String::new(),
            current_phase: "Preflight".to_string(),
            flight_time: "00:00".to_string(),
            comfort_score: 100.0,
            exceedance_count: 0,
            distance_nm: 0.0,
            fuel_used: 0.0,
            landing_rate: 0.0,
            progress: 0.0,
            oooi: OooiTimes::default(),
        }
    }
}

/// Final score pushed by the host after a flight ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreReport {
    pub final_score: f64,
    pub landing_grade: String,
    pub landing_description: String,
    pub xp_earned: f64,
    pub rejected: bool,
    pub rejection_reason: String,
}

/// Free-text activity or exceedance line from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogMessage {
    pub message: String,
    pub timestamp: Option<String>,
}

/// Station weather pushed by the host or fetched out of band.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherReport {
    pub station: String,
    pub temperature: String,
    pub wind: String,
    pub visibility: String,
    pub clouds: String,
    pub pressure: String,
    pub metar: String,
    /// QNH in hPa when the host already parsed it.
    pub qnh: Option<f64>,
}

/// Touchdown position for the arrival map marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TouchdownPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub landing_rate: f64,
    pub ground_speed: f64,
}

/// Updater progress pushed by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateStatus {
    pub status: String,
    pub message: String,
    pub version: Option<String>,
    pub progress: Option<f64>,
}

/// Every message the host can push, keyed by the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BridgeEnvelope {
    Telemetry(TelemetrySnapshot),
    Auth(AuthState),
    Connection(ConnectionState),
    Flight(FlightStatus),
    Score(ScoreReport),
    Activity(LogMessage),
    Exceedance(LogMessage),
    Weather(WeatherReport),
    Touchdown(TouchdownPoint),
    Bid(BidMessage),
    UpdateStatus(UpdateStatus),
}

impl BridgeEnvelope {
    /// Parse a raw host message. Malformed JSON and unknown `type` tags
    /// both yield `None`; the router never throws into its caller.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_telemetry_envelope() {
        let raw = r#"{"type":"telemetry","altitude":3500.5,"onGround":false,"verticalSpeed":-720.0}"#;
        match BridgeEnvelope::parse(raw) {
            Some(BridgeEnvelope::Telemetry(t)) => {
                assert_eq!(t.altitude, 3500.5);
                assert!(!t.on_ground);
                assert_eq!(t.vertical_speed, -720.0);
                // Unspecified fields take wire defaults.
                assert_eq!(t.g_force, 1.0);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_fails_closed() {
        assert!(BridgeEnvelope::parse(r#"{"type":"mystery","x":1}"#).is_none());
        assert!(BridgeEnvelope::parse(r#"{"x":1}"#).is_none());
        assert!(BridgeEnvelope::parse("not json at all").is_none());
    }

    #[test]
    fn update_status_round_trips() {
        let raw = r#"{"type":"updateStatus","status":"downloading","message":"Fetching 3.1.0","progress":42.0}"#;
        match BridgeEnvelope::parse(raw) {
            Some(BridgeEnvelope::UpdateStatus(u)) => {
                assert_eq!(u.status, "downloading");
                assert_eq!(u.progress, Some(42.0));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }
}
