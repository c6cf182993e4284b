//! Fleet wear: landing damage, status transitions, repair timers.
use chrono::{DateTime, Duration, Utc};

use crate::config::EconomyConfig;
use crate::state::{AircraftStatus, DamageEvent, DamageKind, FleetAircraft, MaintenanceEntry};

/// Baseline wear applied by every settled flight, percent.
const BASE_WEAR: f64 = 0.5;
/// Landing rates below this accrue derived hard-landing damage, fpm.
const HARD_LANDING_FPM: f64 = -400.0;
/// Damage per fpm beyond the hard-landing threshold.
const DAMAGE_PER_FPM: f64 = 0.1;
/// G-force beyond which touchdown G adds damage.
const HIGH_G_FLOOR: f64 = 1.8;
/// Damage per G beyond the floor.
const DAMAGE_PER_G: f64 = 10.0;
/// Landing rates below this additionally schedule a repair timer, fpm.
const REPAIR_TIMER_FPM: f64 = -600.0;
/// Condition below which an airframe goes to routine maintenance.
const MAINTENANCE_THRESHOLD: f64 = 40.0;

/// Landing-severity inputs for one settled flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WearParams {
    pub landing_rate: f64,
    pub g_force_touchdown: Option<f64>,
    /// Client-computed total damage; takes precedence over the derived
    /// model when positive.
    pub explicit_damage: Option<f64>,
}

/// What one settlement did to an airframe.
#[derive(Debug, Clone, PartialEq)]
pub struct WearOutcome {
    pub damage: f64,
    pub health_before: f64,
    pub health_after: f64,
    pub maintenance: Option<MaintenanceEntry>,
    pub repair_until: Option<DateTime<Utc>>,
}

/// Damage percentage for a landing, before clamping to the airframe.
#[must_use]
pub fn landing_damage(params: &WearParams) -> f64 {
    if let Some(explicit) = params.explicit_damage.filter(|d| *d > 0.0) {
        return explicit;
    }
    let mut damage = BASE_WEAR;
    if params.landing_rate < HARD_LANDING_FPM {
        damage += (params.landing_rate.abs() - HARD_LANDING_FPM.abs()) * DAMAGE_PER_FPM;
    }
    if let Some(g) = params.g_force_touchdown {
        let g = g.abs();
        if g > HIGH_G_FLOOR {
            damage += (g - HIGH_G_FLOOR) * DAMAGE_PER_G;
        }
    }
    damage
}

/// Status as a function of condition and any open repair timer.
#[must_use]
pub fn status_for(
    condition: f64,
    grounded_threshold: f64,
    repair_until: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> AircraftStatus {
    if repair_until.is_some_and(|until| now < until) {
        return AircraftStatus::Maintenance;
    }
    if condition < grounded_threshold {
        AircraftStatus::Grounded
    } else if condition < MAINTENANCE_THRESHOLD {
        AircraftStatus::Maintenance
    } else {
        AircraftStatus::Available
    }
}

const fn damage_kind(damage: f64) -> DamageKind {
    if damage >= 50.0 {
        DamageKind::Severe
    } else if damage >= 5.0 {
        DamageKind::HardLanding
    } else {
        DamageKind::Wear
    }
}

/// Apply one settled flight's wear to an airframe: condition delta, hour and
/// cycle counters, relocation, damage log, status recomputation, and the
/// repair timer for severe hard landings.
pub fn apply_landing_wear(
    aircraft: &mut FleetAircraft,
    params: &WearParams,
    config: &EconomyConfig,
    arrival_icao: &str,
    flight_minutes: f64,
    callsign: &str,
    flight_id: u64,
    pilot_id: &str,
    now: DateTime<Utc>,
) -> WearOutcome {
    let health_before = aircraft.condition;
    let damage = landing_damage(params);

    aircraft.current_location = arrival_icao.to_string();
    aircraft.condition = ((aircraft.condition - damage) * 100.0).round() / 100.0;
    aircraft.condition = aircraft.condition.clamp(0.0, 100.0);
    aircraft.total_hours += flight_minutes / 60.0;
    aircraft.flight_count += 1;

    let mut maintenance = None;
    if damage > BASE_WEAR {
        let kind = damage_kind(damage);
        aircraft.push_damage(DamageEvent {
            kind,
            amount: (damage * 100.0).round() / 100.0,
            at: now,
            flight_id: Some(flight_id),
        });
        maintenance = Some(MaintenanceEntry {
            aircraft_registration: aircraft.registration.clone(),
            kind,
            health_before,
            health_after: aircraft.condition,
            cost_cr: 0,
            description: format!(
                "Flight {callsign}: {damage:.1}% damage (LR: {:.0} fpm)",
                params.landing_rate
            ),
            flight_id,
            pilot_id: pilot_id.to_string(),
        });
    }

    aircraft.status = status_for(
        aircraft.condition,
        config.grounded_health_threshold,
        None,
        now,
    );
    if aircraft.status == AircraftStatus::Grounded {
        aircraft.grounded_reason = Some(format!(
            "Health dropped to {:.1}% after flight {callsign}",
            aircraft.condition
        ));
    }

    let mut repair_until = None;
    if params.landing_rate < REPAIR_TIMER_FPM {
        let damage_percent = (params.landing_rate - HARD_LANDING_FPM).abs() * 0.05;
        let repair_hours = (damage_percent * config.repair_hours_per_percent).ceil() as i64;
        let until = now + Duration::hours(repair_hours);
        aircraft.status = AircraftStatus::Maintenance;
        aircraft.repair_until = Some(until);
        aircraft.damaged_at = Some(now);
        aircraft.damaged_by_pilot = Some(pilot_id.to_string());
        aircraft.damaged_by_flight = Some(flight_id);
        aircraft.grounded_reason = Some(format!(
            "Hard landing {:.0} fpm — under repair until {}",
            params.landing_rate,
            until.format("%Y-%m-%dT%H:%MZ")
        ));
        repair_until = Some(until);
    }

    WearOutcome {
        damage,
        health_before,
        health_after: aircraft.condition,
        maintenance,
        repair_until,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(landing_rate: f64) -> WearParams {
        WearParams {
            landing_rate,
            g_force_touchdown: None,
            explicit_damage: None,
        }
    }

    #[test]
    fn routine_landing_wears_half_a_percent() {
        let d = landing_damage(&params(-150.0));
        assert_eq!(d, BASE_WEAR);
    }

    #[test]
    fn derived_damage_combines_fpm_and_g() {
        // 100 fpm beyond threshold -> +10, 0.2 G beyond floor -> +2
        let d = landing_damage(&WearParams {
            landing_rate: -500.0,
            g_force_touchdown: Some(2.0),
            explicit_damage: None,
        });
        assert!((d - 12.5).abs() < 1e-9, "got {d}");
    }

    #[test]
    fn explicit_damage_takes_precedence() {
        let d = landing_damage(&WearParams {
            landing_rate: -650.0,
            g_force_touchdown: Some(2.4),
            explicit_damage: Some(3.25),
        });
        assert_eq!(d, 3.25);
    }

    #[test]
    fn status_thresholds() {
        let now = Utc::now();
        assert_eq!(status_for(85.0, 20.0, None, now), AircraftStatus::Available);
        assert_eq!(
            status_for(39.9, 20.0, None, now),
            AircraftStatus::Maintenance
        );
        assert_eq!(status_for(19.9, 20.0, None, now), AircraftStatus::Grounded);
        // Open repair timer forces maintenance regardless of condition.
        assert_eq!(
            status_for(95.0, 20.0, Some(now + Duration::hours(2)), now),
            AircraftStatus::Maintenance
        );
        // Elapsed timer no longer does.
        assert_eq!(
            status_for(95.0, 20.0, Some(now - Duration::hours(2)), now),
            AircraftStatus::Available
        );
    }

    #[test]
    fn condition_stays_in_range_and_severe_landings_schedule_repair() {
        let config = EconomyConfig::default();
        let mut aircraft = FleetAircraft::new("SL-DEF", "A320", "OMDB");
        aircraft.condition = 3.0;
        let now = Utc::now();
        let outcome = apply_landing_wear(
            &mut aircraft,
            &params(-680.0),
            &config,
            "OTHH",
            90.0,
            "SKY201",
            7,
            "SKY0001",
            now,
        );
        assert_eq!(aircraft.condition, 0.0);
        assert!(outcome.repair_until.is_some());
        assert_eq!(aircraft.status, AircraftStatus::Maintenance);
        assert_eq!(aircraft.current_location, "OTHH");
        assert_eq!(aircraft.flight_count, 1);
        // |(-680) - (-400)| * 0.05 = 14 percent, * 2 h/percent = 28 h
        assert_eq!(
            outcome.repair_until.unwrap() - now,
            Duration::hours(28)
        );
        assert!(outcome.maintenance.is_some());
    }

    #[test]
    fn grounded_when_condition_drops_below_threshold() {
        let config = EconomyConfig::default();
        let mut aircraft = FleetAircraft::new("SL-GHI", "B738", "OMDB");
        aircraft.condition = 21.0;
        let outcome = apply_landing_wear(
            &mut aircraft,
            &WearParams {
                landing_rate: -450.0,
                g_force_touchdown: None,
                explicit_damage: None,
            },
            &config,
            "OTHH",
            60.0,
            "SKY202",
            8,
            "SKY0001",
            Utc::now(),
        );
        // 0.5 base + 50*0.1 = 5.5 damage
        assert!((outcome.damage - 5.5).abs() < 1e-9);
        assert_eq!(aircraft.condition, 15.5);
        assert_eq!(aircraft.status, AircraftStatus::Grounded);
        assert!(aircraft.grounded_reason.is_some());
    }
}
