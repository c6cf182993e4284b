//! Bids: reserved flight plans awaiting a start.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Expiry window used for the countdown percentage.
const BID_WINDOW_HOURS: i64 = 24;

/// Bid payload as pushed over the bridge. A null/empty callsign means
/// "no bid" and clears the current booking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BidMessage {
    pub callsign: Option<String>,
    pub flight_number: String,
    pub departure_icao: String,
    pub arrival_icao: String,
    pub departure_name: String,
    pub arrival_name: String,
    pub aircraft_type: String,
    pub aircraft_registration: String,
    pub route: String,
    pub pax: u32,
    pub cargo: u32,
    pub created_at: String,
    pub expires_at: String,
}

impl BidMessage {
    /// Resolve the wire payload into a live bid, or `None` when it carries
    /// no callsign.
    #[must_use]
    pub fn into_bid(self) -> Option<Bid> {
        let callsign = self.callsign.as_deref().unwrap_or("").trim().to_string();
        if callsign.is_empty() {
            return None;
        }
        let expires_at = DateTime::parse_from_rfc3339(&self.expires_at)
            .ok()
            .map(|t| t.with_timezone(&Utc));
        Some(Bid {
            callsign,
            flight_number: self.flight_number,
            departure_icao: self.departure_icao,
            arrival_icao: self.arrival_icao,
            departure_name: self.departure_name,
            arrival_name: self.arrival_name,
            aircraft_type: self.aircraft_type,
            aircraft_registration: self.aircraft_registration,
            route: self.route,
            pax: self.pax,
            cargo: self.cargo,
            expires_at,
        })
    }
}

/// A booked flight plan. Mutually exclusive with an active flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub callsign: String,
    pub flight_number: String,
    pub departure_icao: String,
    pub arrival_icao: String,
    pub departure_name: String,
    pub arrival_name: String,
    pub aircraft_type: String,
    pub aircraft_registration: String,
    pub route: String,
    pub pax: u32,
    pub cargo: u32,
    /// None when the host sent an unparseable expiry; such bids never expire
    /// client-side (the server remains authoritative).
    pub expires_at: Option<DateTime<Utc>>,
}

impl Bid {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|end| now > end)
    }

    /// Remaining share of the booking window in `[0, 1]`, for the countdown
    /// bar.
    #[must_use]
    pub fn expiry_fraction(&self, now: DateTime<Utc>) -> f64 {
        let Some(end) = self.expires_at else {
            return 1.0;
        };
        let remaining_ms = (end - now).num_milliseconds();
        let window_ms = BID_WINDOW_HOURS * 3_600_000;
        (remaining_ms as f64 / window_ms as f64).clamp(0.0, 1.0)
    }
}

/// Parameters handed to the host when a flight starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartFlightParams {
    pub pilot_id: String,
    pub flight_number: String,
    pub callsign: String,
    pub departure_icao: String,
    pub arrival_icao: String,
    pub route: String,
    pub aircraft_type: String,
    pub aircraft_registration: String,
    pub pax: u32,
    pub cargo: u32,
}

impl StartFlightParams {
    #[must_use]
    pub fn from_bid(bid: &Bid, pilot_id: &str) -> Self {
        Self {
            pilot_id: pilot_id.to_string(),
            flight_number: if bid.flight_number.is_empty() {
                bid.callsign.clone()
            } else {
                bid.flight_number.clone()
            },
            callsign: bid.callsign.clone(),
            departure_icao: bid.departure_icao.clone(),
            arrival_icao: bid.arrival_icao.clone(),
            route: bid.route.clone(),
            aircraft_type: bid.aircraft_type.clone(),
            aircraft_registration: bid.aircraft_registration.clone(),
            pax: bid.pax,
            cargo: bid.cargo,
        }
    }
}
