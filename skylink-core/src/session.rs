//! Client flight session: the aggregate state machine fed by bridge
//! messages. Owns the bid lifecycle, the landing black box, activity and
//! exceedance logs, and the local logbook.
use chrono::{DateTime, Utc};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::bid::{Bid, StartFlightParams};
use crate::blackbox::{BlackBox, Touchdown};
use crate::envelope::{
    AuthState, BridgeEnvelope, ConnectionState, FlightStatus, LogMessage, ScoreReport,
    TouchdownPoint, UpdateStatus, WeatherReport,
};
use crate::grading::cockpit_grade;
use crate::telemetry::{telemetry_changed, TelemetrySnapshot};
use crate::HostBridge;

/// Re-entry cooldown absorbing duplicate start triggers, milliseconds.
const START_COOLDOWN_MS: i64 = 10_000;
/// Rolling cap for activity/exceedance logs.
const LOG_CAP: usize = 100;
/// Rolling cap for the local logbook.
const LOGBOOK_CAP: usize = 200;
/// Standard sea-level pressure, hPa.
const STANDARD_QNH_HPA: f64 = 1013.25;

const SUCCESS_KEYWORDS: [&str; 11] = [
    "takeoff", "landing", "arrived", "departed", "completed", "started", "cruise", "pushback",
    "taxi", "boarding", "reached",
];
const WARNING_KEYWORDS: [&str; 7] = [
    "warning", "alert", "exceed", "violation", "overspeed", "stall", "fail",
];

/// What triggered a flight start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTrigger {
    Manual,
    /// Movement detected with a loaded bid.
    AutoMotion,
    /// Pilot override when auto-start did not fire.
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Danger,
}

/// A transient notification for the presentation layer to surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    Success,
    Warning,
    Info,
}

/// One line in the activity or exceedance log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLogEntry {
    pub id: u64,
    pub kind: LogKind,
    pub event: String,
    pub timestamp: String,
}

/// Completed-flight summary kept locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogbookEntry {
    pub date: String,
    pub callsign: String,
    pub route: String,
    pub departure_icao: String,
    pub arrival_icao: String,
    pub aircraft_type: String,
    pub fpm: f64,
    pub score: i64,
    pub grade: String,
    pub flight_time: String,
    pub report: String,
}

fn classify_log(message: &str) -> LogKind {
    let lower = message.to_lowercase();
    if WARNING_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return LogKind::Warning;
    }
    if SUCCESS_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return LogKind::Success;
    }
    LogKind::Info
}

/// Session-scoped start latches. Constructed with the session and torn down
/// with it, so a presentation-layer remount cannot duplicate a start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartGuard {
    auto_start_fired: bool,
    last_start_ms: i64,
}

impl StartGuard {
    const fn cooldown_open(&self, now_ms: i64) -> bool {
        now_ms - self.last_start_ms >= START_COOLDOWN_MS
    }
}

/// The aggregate flight-session state machine.
#[derive(Debug)]
pub struct FlightSession<B: HostBridge> {
    bridge: B,
    telemetry: TelemetrySnapshot,
    last_applied: Option<TelemetrySnapshot>,
    auth: AuthState,
    connection: ConnectionState,
    flight: FlightStatus,
    score: Option<ScoreReport>,
    weather: Option<WeatherReport>,
    qnh_hpa: f64,
    bid: Option<Bid>,
    touchdown_point: Option<TouchdownPoint>,
    last_touchdown: Option<Touchdown>,
    update_status: Option<UpdateStatus>,
    activity_log: Vec<SessionLogEntry>,
    exceedance_log: Vec<SessionLogEntry>,
    logbook: Vec<LogbookEntry>,
    notices: Vec<Notice>,
    black_box: BlackBox,
    start_guard: StartGuard,
    next_log_id: u64,
}

impl<B: HostBridge> FlightSession<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            telemetry: TelemetrySnapshot::default(),
            last_applied: None,
            auth: AuthState::default(),
            connection: ConnectionState::default(),
            flight: FlightStatus::default(),
            score: None,
            weather: None,
            qnh_hpa: STANDARD_QNH_HPA,
            bid: None,
            touchdown_point: None,
            last_touchdown: None,
            update_status: None,
            activity_log: Vec::new(),
            exceedance_log: Vec::new(),
            logbook: Vec::new(),
            notices: Vec::new(),
            black_box: BlackBox::new(),
            start_guard: StartGuard::default(),
            next_log_id: 0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────

    pub const fn bridge(&self) -> &B {
        &self.bridge
    }

    pub const fn telemetry(&self) -> &TelemetrySnapshot {
        &self.telemetry
    }

    pub const fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub const fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub const fn flight(&self) -> &FlightStatus {
        &self.flight
    }

    pub const fn score(&self) -> Option<&ScoreReport> {
        self.score.as_ref()
    }

    pub const fn weather(&self) -> Option<&WeatherReport> {
        self.weather.as_ref()
    }

    pub const fn bid(&self) -> Option<&Bid> {
        self.bid.as_ref()
    }

    pub const fn touchdown_point(&self) -> Option<&TouchdownPoint> {
        self.touchdown_point.as_ref()
    }

    pub const fn last_touchdown(&self) -> Option<&Touchdown> {
        self.last_touchdown.as_ref()
    }

    pub const fn update_status(&self) -> Option<&UpdateStatus> {
        self.update_status.as_ref()
    }

    pub fn activity_log(&self) -> &[SessionLogEntry] {
        &self.activity_log
    }

    pub fn exceedance_log(&self) -> &[SessionLogEntry] {
        &self.exceedance_log
    }

    pub fn logbook(&self) -> &[LogbookEntry] {
        &self.logbook
    }

    pub const fn black_box(&self) -> &BlackBox {
        &self.black_box
    }

    /// QNH-corrected indicated altitude, feet.
    pub fn qnh_altitude(&self) -> i64 {
        (self.telemetry.altitude + (self.qnh_hpa - STANDARD_QNH_HPA) * 27.3).round() as i64
    }

    /// Take all pending notices for display.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ── Message routing ───────────────────────────────────────────

    /// Route one raw host message. Malformed input is dropped silently.
    pub fn handle_raw(&mut self, raw: &str, now: DateTime<Utc>) {
        if let Some(envelope) = BridgeEnvelope::parse(raw) {
            self.handle_envelope(envelope, now);
        }
    }

    pub fn handle_envelope(&mut self, envelope: BridgeEnvelope, now: DateTime<Utc>) {
        match envelope {
            BridgeEnvelope::Telemetry(t) => self.handle_telemetry(t, now),
            BridgeEnvelope::Auth(a) => self.handle_auth(a),
            BridgeEnvelope::Connection(c) => self.handle_connection(c),
            BridgeEnvelope::Flight(f) => self.handle_flight(f),
            BridgeEnvelope::Score(s) => self.handle_score(s, now),
            BridgeEnvelope::Activity(m) => self.handle_activity(m, now),
            BridgeEnvelope::Exceedance(m) => self.handle_exceedance(m, now),
            BridgeEnvelope::Weather(w) => self.handle_weather(w),
            BridgeEnvelope::Touchdown(td) => self.touchdown_point = Some(td),
            BridgeEnvelope::Bid(b) => self.handle_bid_message(b.into_bid()),
            BridgeEnvelope::UpdateStatus(u) => self.update_status = Some(u),
        }
    }

    fn handle_telemetry(&mut self, t: TelemetrySnapshot, now: DateTime<Utc>) {
        // Suppress state churn: apply only significant changes.
        if let Some(last) = &self.last_applied {
            if !telemetry_changed(last, &t) {
                return;
            }
        }
        self.last_applied = Some(t.clone());

        let prev = std::mem::replace(&mut self.telemetry, t);
        let t = self.telemetry.clone();

        if !prev.phase.is_empty()
            && !t.phase.is_empty()
            && prev.phase != t.phase
            && t.phase != "Preflight"
        {
            self.push_notice(NoticeKind::Info, format!("Phase: {} -> {}", prev.phase, t.phase));
        }
        if t.stall_warning && !prev.stall_warning {
            self.push_notice(NoticeKind::Danger, "STALL WARNING".to_string());
        }
        if t.overspeed_warning && !prev.overspeed_warning {
            self.push_notice(NoticeKind::Danger, "OVERSPEED".to_string());
        }

        if let Some(touchdown) = self.black_box.observe(&t) {
            self.push_notice(
                NoticeKind::Info,
                format!(
                    "Touchdown: {:.0} FPM - {}",
                    touchdown.fpm, touchdown.grade
                ),
            );
            self.last_touchdown = Some(touchdown);
        }

        self.try_auto_start(now);
    }

    fn handle_auth(&mut self, auth: AuthState) {
        let was_ready = self.auth.is_logged_in && !self.auth.pilot_id.is_empty();
        self.auth = auth;
        let is_ready = self.auth.is_logged_in && !self.auth.pilot_id.is_empty();
        // Fetch the open bid once login and pilot id are both present.
        if is_ready && !was_ready {
            self.bridge.fetch_bid();
        }
    }

    fn handle_connection(&mut self, connection: ConnectionState) {
        if connection.sim_connected && !self.connection.sim_connected {
            self.push_notice(NoticeKind::Success, "Simulator connected".to_string());
        }
        if !connection.sim_connected && self.connection.sim_connected {
            self.push_notice(NoticeKind::Warning, "Simulator disconnected".to_string());
        }
        self.connection = connection;
    }

    fn handle_flight(&mut self, flight: FlightStatus) {
        if flight.is_active && !self.flight.is_active && !flight.callsign.is_empty() {
            debug!("flight started: {}", flight.callsign);
            // An already-running flight must never auto-start again.
            self.start_guard.auto_start_fired = true;
        }
        self.flight = flight;
        self.maybe_release_start_guard();
    }

    fn handle_score(&mut self, score: ScoreReport, now: DateTime<Utc>) {
        if !self.flight.callsign.is_empty() {
            let fpm = if self.flight.landing_rate != 0.0 {
                self.flight.landing_rate
            } else {
                self.black_box.touchdown_fpm()
            };
            let grade = if score.landing_grade.is_empty() {
                cockpit_grade(fpm).to_string()
            } else {
                score.landing_grade.clone()
            };
            let report = format!(
                "{} has landed at {} with a landing rate of {:.2}fpm and performance score of {}%.",
                self.flight.callsign, self.flight.arrival_icao, fpm, score.final_score
            );
            self.logbook.insert(
                0,
                LogbookEntry {
                    date: now.format("%Y-%m-%d").to_string(),
                    callsign: self.flight.callsign.clone(),
                    route: format!(
                        "{}-{}",
                        self.flight.departure_icao, self.flight.arrival_icao
                    ),
                    departure_icao: self.flight.departure_icao.clone(),
                    arrival_icao: self.flight.arrival_icao.clone(),
                    aircraft_type: self.flight.aircraft_type.clone(),
                    fpm,
                    score: score.final_score.round() as i64,
                    grade,
                    flight_time: self.flight.flight_time.clone(),
                    report,
                },
            );
            self.logbook.truncate(LOGBOOK_CAP);
        }
        self.score = Some(score);
    }

    fn handle_activity(&mut self, message: LogMessage, now: DateTime<Utc>) {
        if message.message.is_empty() {
            return;
        }
        // Skip when the most recent entry repeats the same message.
        if self
            .activity_log
            .first()
            .is_some_and(|e| e.event == message.message)
        {
            return;
        }
        let entry = self.make_log_entry(&message, now, None);
        self.activity_log.insert(0, entry);
        self.activity_log.truncate(LOG_CAP);
    }

    fn handle_exceedance(&mut self, message: LogMessage, now: DateTime<Utc>) {
        if message.message.is_empty() {
            return;
        }
        if self
            .exceedance_log
            .first()
            .is_some_and(|e| e.event == message.message)
        {
            return;
        }
        let entry = self.make_log_entry(&message, now, Some(LogKind::Warning));
        self.exceedance_log.insert(0, entry);
        self.exceedance_log.truncate(LOG_CAP);
        self.push_notice(NoticeKind::Warning, message.message);
    }

    fn handle_weather(&mut self, weather: WeatherReport) {
        if let Some(qnh) = weather.qnh.filter(|q| *q > 0.0) {
            self.qnh_hpa = qnh;
        } else if let Some(qnh) = parse_qnh(&weather.pressure) {
            self.qnh_hpa = qnh;
        }
        self.weather = Some(weather);
    }

    fn handle_bid_message(&mut self, bid: Option<Bid>) {
        if bid.is_some() && self.flight.is_active {
            // A bid and an active flight are mutually exclusive.
            debug!("bid ignored: flight already active");
            return;
        }
        debug!(
            "bid message received: {}",
            bid.as_ref().map_or("null", |b| b.callsign.as_str())
        );
        self.bid = bid;
        self.maybe_release_start_guard();
    }

    // ── Bid lifecycle ─────────────────────────────────────────────

    /// Inject a bid fetched out of band (portal API), bypassing the bridge.
    pub fn inject_bid(&mut self, bid: Option<Bid>) {
        self.handle_bid_message(bid);
    }

    /// Start the booked flight. Returns true when the start command was
    /// actually issued to the host.
    pub fn start_flight(&mut self, trigger: StartTrigger, now: DateTime<Utc>) -> bool {
        if self.auth.pilot_id.is_empty() {
            return false;
        }
        if self.flight.is_active {
            return false;
        }
        let Some(bid) = &self.bid else {
            return false;
        };
        if bid.is_expired(now) {
            return false;
        }
        let now_ms = now.timestamp_millis();
        if !self.start_guard.cooldown_open(now_ms) {
            return false;
        }
        self.start_guard.last_start_ms = now_ms;
        if trigger == StartTrigger::AutoMotion {
            self.start_guard.auto_start_fired = true;
        }

        let params = StartFlightParams::from_bid(bid, &self.auth.pilot_id);
        self.bridge.start_flight(&params);

        let (log_line, notice) = match trigger {
            StartTrigger::AutoMotion => (
                "Auto-Start: movement detected, flight recording initiated",
                "Flight started - ACARS recording active",
            ),
            StartTrigger::Forced => (
                "Manual override: flight force-initialized by pilot",
                "Flight started - ACARS recording active",
            ),
            StartTrigger::Manual => (
                "Flight started, telemetry recording initiated",
                "Flight started - ACARS recording active",
            ),
        };
        self.add_log_entry(log_line, now);
        self.push_notice(NoticeKind::Success, notice.to_string());
        true
    }

    /// End the active flight and hand it to the host for submission.
    pub fn end_flight(&mut self) {
        self.bridge.end_flight();
        self.push_notice(NoticeKind::Info, "Submitting flight...".to_string());
    }

    /// Cancel the active flight without settlement and reset session state.
    pub fn cancel_flight(&mut self) {
        self.bridge.cancel_flight();
        self.flight = FlightStatus::default();
        self.score = None;
        self.bid = None;
        self.touchdown_point = None;
        self.last_touchdown = None;
        self.activity_log.clear();
        self.exceedance_log.clear();
        self.black_box.reset();
        self.maybe_release_start_guard();
        self.push_notice(NoticeKind::Info, "Flight cancelled - ACARS reset".to_string());
    }

    /// Cancel the booked bid.
    pub fn cancel_bid(&mut self) {
        self.bridge.cancel_bid();
    }

    /// Begin the host login flow.
    pub fn login(&self) {
        self.bridge.login();
    }

    /// Log out of the host; the host answers with a fresh auth message.
    pub fn logout(&self) {
        self.bridge.logout();
    }

    /// Ask the host updater to check for a new build.
    pub fn check_for_update(&mut self) {
        self.update_status = None;
        self.bridge.check_for_update();
    }

    /// Timer-driven upkeep: expire the bid when its window has passed.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        let expired = self.bid.as_ref().is_some_and(|b| b.is_expired(now));
        if expired {
            self.bridge.cancel_bid();
            self.bid = None;
            self.maybe_release_start_guard();
            self.push_notice(NoticeKind::Warning, "Bid expired".to_string());
        }
    }

    /// Append a free-form activity log entry.
    pub fn add_log_entry(&mut self, message: &str, now: DateTime<Utc>) {
        self.handle_activity(
            LogMessage {
                message: message.to_string(),
                timestamp: None,
            },
            now,
        );
    }

    // ── Internals ─────────────────────────────────────────────────

    fn try_auto_start(&mut self, now: DateTime<Utc>) {
        if self.start_guard.auto_start_fired {
            return;
        }
        if self.flight.is_active || self.auth.pilot_id.is_empty() {
            return;
        }
        let Some(bid) = &self.bid else {
            return;
        };
        if bid.is_expired(now) {
            return;
        }
        let moving = self.telemetry.altitude > 50.0 || self.telemetry.ground_speed > 30.0;
        if moving {
            debug!(
                "auto-start: altitude {:.0}, gs {:.0}",
                self.telemetry.altitude, self.telemetry.ground_speed
            );
            self.start_guard.auto_start_fired = true;
            self.start_flight(StartTrigger::AutoMotion, now);
        }
    }

    /// The auto-start latch resets only when the flight has truly ended with
    /// no bid loaded, never on a presentation-layer remount.
    fn maybe_release_start_guard(&mut self) {
        if !self.flight.is_active && self.bid.is_none() {
            self.start_guard.auto_start_fired = false;
        }
    }

    fn make_log_entry(
        &mut self,
        message: &LogMessage,
        now: DateTime<Utc>,
        kind: Option<LogKind>,
    ) -> SessionLogEntry {
        self.next_log_id += 1;
        SessionLogEntry {
            id: self.next_log_id,
            kind: kind.unwrap_or_else(|| classify_log(&message.message)),
            event: message.message.clone(),
            timestamp: message
                .timestamp
                .clone()
                .unwrap_or_else(|| now.format("%H:%M:%S").to_string()),
        }
    }

    fn push_notice(&mut self, kind: NoticeKind, message: String) {
        self.notices.push(Notice { kind, message });
    }
}

/// Extract QNH in hPa from a free-text pressure field. Values that look
/// like inHg (under 100) are converted.
fn parse_qnh(pressure: &str) -> Option<f64> {
    static PRESSURE_RE: OnceLock<Regex> = OnceLock::new();
    let re = PRESSURE_RE
        .get_or_init(|| Regex::new(r"(\d{2,4}(?:\.\d+)?)").expect("pressure pattern is valid"));
    let value: f64 = re.captures(pressure)?.get(1)?.as_str().parse().ok()?;
    if value < 100.0 {
        Some(value * 33.8639)
    } else {
        Some(value)
    }
}
