//! Airline datastore: every collection the settlement pipeline reads or
//! mutates, held as one serializable state aggregate. The server owns a
//! single `AirlineState` behind a lock; `StateStore` snapshots it.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rolling damage-log cap per airframe.
pub const DAMAGE_LOG_CAP: usize = 50;

// ── Pilots ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PilotStatus {
    #[default]
    Active,
    Inactive,
    Blacklist,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pilot {
    pub pilot_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub rank: String,
    pub status: PilotStatus,
    pub balance: i64,
    pub total_credits: i64,
    pub total_hours: f64,
    pub transfer_hours: f64,
    pub total_flights: u64,
    pub routes_flown: Vec<String>,
    pub current_location: String,
    pub last_flight_at: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl Pilot {
    #[must_use]
    pub fn new(pilot_id: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            pilot_id: pilot_id.to_string(),
            email: String::new(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            rank: "Cadet".to_string(),
            status: PilotStatus::Active,
            balance: 0,
            total_credits: 0,
            total_hours: 0.0,
            transfer_hours: 0.0,
            total_flights: 0,
            routes_flown: Vec::new(),
            current_location: String::new(),
            last_flight_at: None,
            last_activity: None,
        }
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Hours counted toward rank requirements.
    #[must_use]
    pub fn rank_hours(&self) -> f64 {
        self.total_hours + self.transfer_hours
    }
}

// ── Fleet ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AircraftStatus {
    #[default]
    Available,
    Maintenance,
    Grounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageKind {
    Wear,
    HardLanding,
    Severe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub kind: DamageKind,
    pub amount: f64,
    pub at: DateTime<Utc>,
    pub flight_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetAircraft {
    pub registration: String,
    pub aircraft_type: String,
    /// Airframe health percentage, 0-100.
    pub condition: f64,
    pub status: AircraftStatus,
    pub current_location: String,
    pub flight_count: u64,
    pub total_hours: f64,
    pub damage_log: Vec<DamageEvent>,
    pub grounded_reason: Option<String>,
    pub repair_until: Option<DateTime<Utc>>,
    pub damaged_at: Option<DateTime<Utc>>,
    pub damaged_by_pilot: Option<String>,
    pub damaged_by_flight: Option<u64>,
}

impl FleetAircraft {
    #[must_use]
    pub fn new(registration: &str, aircraft_type: &str, location: &str) -> Self {
        Self {
            registration: registration.to_string(),
            aircraft_type: aircraft_type.to_string(),
            condition: 100.0,
            status: AircraftStatus::Available,
            current_location: location.to_string(),
            flight_count: 0,
            total_hours: 0.0,
            damage_log: Vec::new(),
            grounded_reason: None,
            repair_until: None,
            damaged_at: None,
            damaged_by_pilot: None,
            damaged_by_flight: None,
        }
    }

    pub fn push_damage(&mut self, event: DamageEvent) {
        self.damage_log.push(event);
        if self.damage_log.len() > DAMAGE_LOG_CAP {
            let excess = self.damage_log.len() - DAMAGE_LOG_CAP;
            self.damage_log.drain(..excess);
        }
    }
}

// ── Flight records ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovedStatus {
    Accepted,
    Rejected,
}

/// Immutable ledger row for one submission attempt. Never mutated after
/// creation except for the late credits backfill on the same settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub id: u64,
    pub pilot_id: String,
    pub pilot_name: String,
    pub flight_number: String,
    pub callsign: String,
    pub departure_icao: String,
    pub arrival_icao: String,
    pub alternate_icao: Option<String>,
    pub route: Option<String>,
    pub aircraft_type: String,
    pub flight_time_minutes: f64,
    pub landing_rate: f64,
    pub landing_grade: Option<String>,
    pub max_g_force: f64,
    pub fuel_used: f64,
    pub distance_nm: f64,
    pub pax: u32,
    pub cargo: u32,
    pub score: i64,
    pub comfort_score: f64,
    pub deductions: Vec<String>,
    pub approved_status: ApprovedStatus,
    pub comments: Option<String>,
    pub acars_version: String,
    pub submitted_at: DateTime<Utc>,
    pub revenue_passenger: i64,
    pub revenue_cargo: i64,
    pub expense_fuel: i64,
    pub expense_airport: i64,
    pub expense_pilot: i64,
    pub expense_maintenance: i64,
    pub real_profit: i64,
    pub passenger_rating: Option<u8>,
    pub passenger_review: Option<String>,
    pub credits_earned: Option<i64>,
    pub credits_breakdown: Vec<String>,
}

// ── Finance ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinanceKind {
    FlightRevenue,
    FuelCost,
    LandingFee,
    PilotPay,
    Maintenance,
    RevenueSplit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceEntry {
    pub amount: i64,
    pub kind: FinanceKind,
    pub description: String,
    pub reference_flight: u64,
    pub pilot_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirlineFinance {
    pub balance: i64,
    pub total_revenue: i64,
    pub total_expenses: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for AirlineFinance {
    fn default() -> Self {
        Self {
            balance: 1_000_000,
            total_revenue: 0,
            total_expenses: 0,
            last_updated: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceEntry {
    pub aircraft_registration: String,
    pub kind: DamageKind,
    pub health_before: f64,
    pub health_after: f64,
    pub cost_cr: i64,
    pub description: String,
    pub flight_id: u64,
    pub pilot_id: String,
}

// ── Ranks & awards ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rank {
    pub name: String,
    pub order: u32,
    pub requirement_hours: f64,
    pub requirement_flights: u64,
    pub auto_promote: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AwardCategory {
    FlightHours,
    Flights,
    Landings,
    Special,
    Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub id: String,
    pub name: String,
    pub category: AwardCategory,
    pub required_value: Option<f64>,
    pub active: bool,
    pub linked_tour_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilotAward {
    pub pilot_id: String,
    pub award_id: String,
    pub earned_at: DateTime<Utc>,
}

// ── Tours & activities ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourLeg {
    pub departure_icao: String,
    pub arrival_icao: String,
    /// Empty means any type qualifies.
    #[serde(default)]
    pub aircraft_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub reward_credits: i64,
    pub legs: Vec<TourLeg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressStatus {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourProgress {
    pub pilot_id: String,
    pub tour_id: String,
    pub status: ProgressStatus,
    pub current_leg_index: usize,
    pub completed_legs: Vec<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLeg {
    pub id: String,
    /// None matches any departure.
    pub departure_icao: Option<String>,
    /// None matches any arrival.
    pub arrival_icao: Option<String>,
    #[serde(default)]
    pub aircraft_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub active: bool,
    pub reward_points: i64,
    pub legs: Vec<ActivityLeg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityProgress {
    pub pilot_id: String,
    pub activity_id: String,
    pub legs_complete: usize,
    pub percent_complete: u32,
    pub completed_leg_ids: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub last_leg_flown: Option<DateTime<Utc>>,
    pub date_complete: Option<DateTime<Utc>>,
    pub days_to_complete: Option<i64>,
}

// ── Bids & active flights (server side) ───────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidStatus {
    Active,
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBid {
    pub id: u64,
    pub pilot_id: String,
    pub callsign: String,
    pub aircraft_registration: Option<String>,
    pub planned_fuel: Option<f64>,
    pub activity_id: Option<String>,
    pub status: BidStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveFlightRow {
    pub pilot_id: String,
    pub callsign: String,
    pub flight_number: String,
    pub departure_icao: String,
    pub arrival_icao: String,
    pub started_at: DateTime<Utc>,
}

// ── Destination of the month ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationOfTheMonth {
    pub airport_icao: String,
    /// 1-12.
    pub month: u32,
    pub year: i32,
    pub bonus_points: i64,
    pub is_active: bool,
}

// ── The aggregate ─────────────────────────────────────────────────

/// Every collection behind the settlement pipeline. One logical datastore
/// with per-settlement exclusive access; there is no cross-collection
/// transaction beyond that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirlineState {
    pub pilots: Vec<Pilot>,
    pub fleet: Vec<FleetAircraft>,
    pub flights: Vec<FlightRecord>,
    pub active_flights: Vec<ActiveFlightRow>,
    pub bids: Vec<StoredBid>,
    pub tours: Vec<Tour>,
    pub tour_progress: Vec<TourProgress>,
    pub activities: Vec<Activity>,
    pub activity_progress: Vec<ActivityProgress>,
    pub ranks: Vec<Rank>,
    pub awards: Vec<Award>,
    pub pilot_awards: Vec<PilotAward>,
    pub dotm: Option<DestinationOfTheMonth>,
    pub finance: AirlineFinance,
    pub finance_log: Vec<FinanceEntry>,
    pub maintenance_log: Vec<MaintenanceEntry>,
    next_flight_id: u64,
}

impl Default for AirlineState {
    fn default() -> Self {
        Self {
            pilots: Vec::new(),
            fleet: Vec::new(),
            flights: Vec::new(),
            active_flights: Vec::new(),
            bids: Vec::new(),
            tours: Vec::new(),
            tour_progress: Vec::new(),
            activities: Vec::new(),
            activity_progress: Vec::new(),
            ranks: default_ranks(),
            awards: Vec::new(),
            pilot_awards: Vec::new(),
            dotm: None,
            finance: AirlineFinance::default(),
            finance_log: Vec::new(),
            maintenance_log: Vec::new(),
            next_flight_id: 1,
        }
    }
}

impl AirlineState {
    /// Find a pilot by id or email, case-insensitively. The id the desktop
    /// client holds may differ in casing from the roster entry.
    #[must_use]
    pub fn find_pilot(&self, pilot_id: &str) -> Option<&Pilot> {
        self.pilots.iter().find(|p| {
            p.pilot_id.eq_ignore_ascii_case(pilot_id) || p.email.eq_ignore_ascii_case(pilot_id)
        })
    }

    pub fn find_pilot_mut(&mut self, pilot_id: &str) -> Option<&mut Pilot> {
        self.pilots.iter_mut().find(|p| {
            p.pilot_id.eq_ignore_ascii_case(pilot_id) || p.email.eq_ignore_ascii_case(pilot_id)
        })
    }

    #[must_use]
    pub fn find_aircraft(&self, registration: &str) -> Option<&FleetAircraft> {
        self.fleet
            .iter()
            .find(|a| a.registration.eq_ignore_ascii_case(registration))
    }

    pub fn find_aircraft_mut(&mut self, registration: &str) -> Option<&mut FleetAircraft> {
        self.fleet
            .iter_mut()
            .find(|a| a.registration.eq_ignore_ascii_case(registration))
    }

    /// Allocate the next flight-record id.
    pub fn allocate_flight_id(&mut self) -> u64 {
        let id = self.next_flight_id;
        self.next_flight_id += 1;
        id
    }

    pub fn insert_flight(&mut self, record: FlightRecord) {
        self.flights.push(record);
    }

    #[must_use]
    pub fn flight(&self, id: u64) -> Option<&FlightRecord> {
        self.flights.iter().find(|f| f.id == id)
    }

    pub fn flight_mut(&mut self, id: u64) -> Option<&mut FlightRecord> {
        self.flights.iter_mut().find(|f| f.id == id)
    }

    /// Open bid (Active or InProgress) for a pilot + callsign pair.
    #[must_use]
    pub fn find_open_bid(&self, pilot_id: &str, callsign: &str) -> Option<&StoredBid> {
        self.bids
            .iter()
            .find(|b| b.pilot_id == pilot_id && b.callsign == callsign)
    }

    pub fn remove_bid(&mut self, bid_id: u64) {
        self.bids.retain(|b| b.id != bid_id);
    }

    /// Drop every open bid a pilot holds.
    pub fn remove_open_bids(&mut self, pilot_id: &str) {
        self.bids.retain(|b| b.pilot_id != pilot_id);
    }

    pub fn remove_active_flight(&mut self, pilot_id: &str, callsign: &str) {
        self.active_flights
            .retain(|f| !(f.pilot_id == pilot_id && f.callsign == callsign));
    }

    #[must_use]
    pub fn has_award(&self, pilot_id: &str, award_id: &str) -> bool {
        self.pilot_awards
            .iter()
            .any(|pa| pa.pilot_id == pilot_id && pa.award_id == award_id)
    }
}

/// Built-in rank ladder, ordered. Hours count flown + transfer hours.
#[must_use]
pub fn default_ranks() -> Vec<Rank> {
    let table: [(&str, u32, f64, u64); 7] = [
        ("Cadet", 0, 0.0, 0),
        ("Second Officer", 1, 10.0, 10),
        ("First Officer", 2, 50.0, 40),
        ("Senior First Officer", 3, 100.0, 75),
        ("Captain", 4, 250.0, 150),
        ("Senior Captain", 5, 500.0, 300),
        ("Check Airman", 6, 1000.0, 500),
    ];
    table
        .iter()
        .map(|(name, order, hours, flights)| Rank {
            name: (*name).to_string(),
            order: *order,
            requirement_hours: *hours,
            requirement_flights: *flights,
            auto_promote: true,
        })
        .collect()
}
