//! PIREP wire types: the signed submission and the settlement response.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One professionalism deduction recorded by the client during the flight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deduction {
    pub reason: String,
    pub points: Option<f64>,
}

/// Landing analysis computed client-side from the black box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LandingAnalysis {
    pub butter_score: Option<f64>,
    pub g_force_touchdown: Option<f64>,
}

/// Client flight log attached to a submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlightLog {
    pub deductions: SmallVec<[Deduction; 4]>,
    pub landing_analysis: Option<LandingAnalysis>,
    pub max_g_force: Option<f64>,
}

/// Client-computed airframe damage summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AirframeDamage {
    pub total_damage: f64,
}

/// A coarse telemetry point from the submitted flight log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetryPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub ground_speed: f64,
    pub vertical_speed: f64,
}

/// Signed, timestamped report of one completed flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PirepSubmission {
    pub pilot_id: String,
    pub flight_number: String,
    pub callsign: String,
    pub departure_icao: String,
    pub arrival_icao: String,
    pub alternate_icao: Option<String>,
    pub route: Option<String>,
    pub aircraft_type: String,
    pub aircraft_registration: Option<String>,
    pub flight_time_minutes: f64,
    pub landing_rate: f64,
    pub fuel_used: f64,
    pub distance_nm: f64,
    pub pax: Option<u32>,
    pub cargo: Option<u32>,
    pub score: Option<i64>,
    pub telemetry: Vec<TelemetryPoint>,
    pub comfort_score: Option<f64>,
    pub log: Option<FlightLog>,
    pub airframe_damage: Option<AirframeDamage>,
    pub comments: Option<String>,
    pub acars_version: Option<String>,
    /// Unix milliseconds at signing time.
    pub timestamp: Option<i64>,
    pub signature: Option<String>,
}

impl Default for PirepSubmission {
    fn default() -> Self {
        Self {
            pilot_id: String::new(),
            flight_number: String::new(),
            callsign: String::new(),
            departure_icao: String::new(),
            arrival_icao: String::new(),
            alternate_icao: None,
            route: None,
            aircraft_type: String::new(),
            aircraft_registration: None,
            flight_time_minutes: 0.0,
            landing_rate: 0.0,
            fuel_used: 0.0,
            distance_nm: 0.0,
            pax: None,
            cargo: None,
            score: None,
            telemetry: Vec::new(),
            comfort_score: None,
            log: None,
            airframe_damage: None,
            comments: None,
            acars_version: None,
            timestamp: None,
            signature: None,
        }
    }
}

impl PirepSubmission {
    /// Whether the flight number marks a checkride.
    #[must_use]
    pub fn is_checkride(&self) -> bool {
        self.flight_number.starts_with("CHK") || self.flight_number.starts_with("EXAM")
    }

    /// Touchdown G reported by the client, preferring the landing analysis.
    #[must_use]
    pub fn touchdown_g(&self) -> Option<f64> {
        let log = self.log.as_ref()?;
        log.landing_analysis
            .as_ref()
            .and_then(|a| a.g_force_touchdown)
            .or(log.max_g_force)
    }

    #[must_use]
    pub fn butter_score(&self) -> Option<f64> {
        self.log
            .as_ref()?
            .landing_analysis
            .as_ref()?
            .butter_score
    }

    #[must_use]
    pub fn deduction_reasons(&self) -> Vec<String> {
        self.log
            .as_ref()
            .map(|l| l.deductions.iter().map(|d| d.reason.clone()).collect())
            .unwrap_or_default()
    }
}

/// Money split echoed back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueBreakdown {
    pub gross_revenue: i64,
    pub fuel_tax: i64,
    pub penalty_fines: i64,
    pub total_deductions: i64,
    pub net_pilot_pay: i64,
    pub dotm_bonus: i64,
    pub butter_bonus: i64,
    pub total_earned: i64,
}

/// Settlement response. Policy rejections are successful settlements too:
/// `success` stays true and only `message` is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettlementResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_earned: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_credits: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub credits_breakdown: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_rank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newly_granted_awards: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_health: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_breakdown: Option<RevenueBreakdown>,
}

impl SettlementResponse {
    /// Response for a policy rejection (hard landing, failed checkride).
    #[must_use]
    pub fn rejection(message: String) -> Self {
        Self {
            success: true,
            message,
            ..Self::default()
        }
    }
}
