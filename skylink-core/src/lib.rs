//! Skylink ACARS Engine
//!
//! Platform-agnostic core for the Skylink virtual-airline companion: the
//! client-side flight-session state machine (bridge message routing,
//! telemetry filtering, touchdown detection, bid lifecycle) and the
//! server-side PIREP settlement pipeline (signature verification, rejection
//! gates, economy, fleet wear, tour/activity progression, ranks and awards).
//! No UI, HTTP, or storage backend lives here; those sit behind the
//! [`HostBridge`] and [`StateStore`] seams.

pub mod bid;
pub mod blackbox;
pub mod config;
pub mod credits;
pub mod economy;
pub mod envelope;
pub mod grading;
pub mod pirep;
pub mod progression;
pub mod rank;
pub mod session;
pub mod settlement;
pub mod signature;
pub mod state;
pub mod telemetry;
pub mod wear;

// Re-export commonly used types
pub use bid::{Bid, BidMessage, StartFlightParams};
pub use blackbox::{BlackBox, Touchdown};
pub use config::{ConfigError, EconomyConfig};
pub use credits::{calculate_flight_credits, CreditBreakdown, CreditInputs};
pub use economy::{EconomyBreakdown, EconomyInputs};
pub use envelope::{
    AuthState, BridgeEnvelope, ConnectionState, FlightStatus, LogMessage, ScoreReport,
    TouchdownPoint, UpdateStatus, WeatherReport,
};
pub use grading::{cockpit_grade, landing_score, settlement_grade, CockpitGrade, SettlementGrade};
pub use pirep::{PirepSubmission, RevenueBreakdown, SettlementResponse};
pub use session::{FlightSession, Notice, NoticeKind, StartTrigger};
pub use settlement::{settle, SettlementContext, SettlementError};
pub use state::{AirlineState, FleetAircraft, Pilot};
pub use telemetry::{haversine_nm, telemetry_changed, TelemetrySnapshot};

/// Capability surface of the desktop host. The session issues flight
/// commands and fire-and-forget actions through this; a null implementation
/// keeps the engine usable where no host exists (browser dev mode).
pub trait HostBridge {
    fn start_flight(&self, params: &StartFlightParams);
    fn end_flight(&self);
    fn cancel_flight(&self);
    fn login(&self);
    fn logout(&self);
    fn fetch_bid(&self);
    fn cancel_bid(&self);
    fn check_for_update(&self);
}

/// No-op host for environments without a bridge. Selected once at startup;
/// every call is a logged no-op rather than an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBridge;

impl HostBridge for NoopBridge {
    fn start_flight(&self, params: &StartFlightParams) {
        log::debug!("bridge unavailable: start_flight({})", params.callsign);
    }
    fn end_flight(&self) {
        log::debug!("bridge unavailable: end_flight");
    }
    fn cancel_flight(&self) {
        log::debug!("bridge unavailable: cancel_flight");
    }
    fn login(&self) {
        log::debug!("bridge unavailable: login");
    }
    fn logout(&self) {
        log::debug!("bridge unavailable: logout");
    }
    fn fetch_bid(&self) {
        log::debug!("bridge unavailable: fetch_bid");
    }
    fn cancel_bid(&self) {
        log::debug!("bridge unavailable: cancel_bid");
    }
    fn check_for_update(&self) {
        log::debug!("bridge unavailable: check_for_update");
    }
}

/// Host double that records every call, for session tests and the QA
/// harness.
#[derive(Debug, Default)]
pub struct RecordingBridge {
    calls: std::sync::Mutex<Vec<String>>,
}

impl RecordingBridge {
    fn record(&self, method: &str) {
        self.calls
            .lock()
            .expect("recording bridge lock")
            .push(method.to_string());
    }

    /// How many times a method was invoked.
    #[must_use]
    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .expect("recording bridge lock")
            .iter()
            .filter(|m| m.as_str() == method)
            .count()
    }

    /// Every recorded call in order.
    #[must_use]
    pub fn all_calls(&self) -> Vec<String> {
        self.calls.lock().expect("recording bridge lock").clone()
    }
}

impl HostBridge for RecordingBridge {
    fn start_flight(&self, _params: &StartFlightParams) {
        self.record("start_flight");
    }
    fn end_flight(&self) {
        self.record("end_flight");
    }
    fn cancel_flight(&self) {
        self.record("cancel_flight");
    }
    fn login(&self) {
        self.record("login");
    }
    fn logout(&self) {
        self.record("logout");
    }
    fn fetch_bid(&self) {
        self.record("fetch_bid");
    }
    fn cancel_bid(&self) {
        self.record("cancel_bid");
    }
    fn check_for_update(&self) {
        self.record("check_for_update");
    }
}

/// Trait for abstracting datastore snapshots.
/// Platform-specific implementations should provide this.
pub trait StateStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the airline state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    fn save(&self, state: &AirlineState) -> Result<(), Self::Error>;

    /// Load the previously persisted airline state, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be loaded.
    fn load(&self) -> Result<Option<AirlineState>, Self::Error>;
}
