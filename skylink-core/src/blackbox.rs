//! Landing black box: touchdown detection with FPM and G capture.
use serde::{Deserialize, Serialize};

use crate::grading::{cockpit_grade, landing_score, CockpitGrade};
use crate::telemetry::TelemetrySnapshot;

/// Radio altitude band in which the detector arms, in feet.
const ARM_CEILING_FT: f64 = 50.0;
const ARM_FLOOR_FT: f64 = 1.0;
/// Minimum ground speed for a confirmed touchdown, in knots. Filters out a
/// momentary gear compression at walking pace.
const TOUCHDOWN_MIN_GS_KT: f64 = 30.0;

/// A single confirmed touchdown, reported exactly once per landing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Touchdown {
    pub fpm: f64,
    pub g_force: f64,
    pub grade: CockpitGrade,
    pub score: i64,
}

/// Touchdown-detection state machine.
///
/// Cycle per landing: Disarmed -> Armed (radio altitude inside the arm band
/// while airborne) -> Fired (weight on wheels at speed) -> Disarmed (climb
/// back above the arm ceiling). While armed it records the lowest vertical
/// speed and highest G seen before wheels touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlackBox {
    armed: bool,
    fired: bool,
    touchdown_fpm: f64,
    max_g_force: f64,
}

impl Default for BlackBox {
    fn default() -> Self {
        Self {
            armed: false,
            fired: false,
            touchdown_fpm: 0.0,
            max_g_force: 1.0,
        }
    }
}

impl BlackBox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    #[must_use]
    pub const fn has_fired(&self) -> bool {
        self.fired
    }

    /// Last captured touchdown vertical speed, fpm (negative is down).
    #[must_use]
    pub const fn touchdown_fpm(&self) -> f64 {
        self.touchdown_fpm
    }

    #[must_use]
    pub const fn max_g_force(&self) -> f64 {
        self.max_g_force
    }

    /// Feed one telemetry frame. Returns `Some(Touchdown)` on the single
    /// frame where ground contact is confirmed; `None` otherwise.
    pub fn observe(&mut self, t: &TelemetrySnapshot) -> Option<Touchdown> {
        if t.radio_altitude < ARM_CEILING_FT && t.radio_altitude > ARM_FLOOR_FT && !t.on_ground {
            self.armed = true;
            // Last vertical speed before wheels touch is the most accurate FPM.
            if t.vertical_speed < self.touchdown_fpm {
                self.touchdown_fpm = t.vertical_speed;
            }
            if t.g_force > self.max_g_force {
                self.max_g_force = t.g_force;
            }
        }

        let mut report = None;
        if self.armed
            && !self.fired
            && t.on_ground
            && t.radio_altitude <= ARM_FLOOR_FT
            && t.ground_speed > TOUCHDOWN_MIN_GS_KT
        {
            self.fired = true;
            let fpm = self.touchdown_fpm;
            report = Some(Touchdown {
                fpm,
                g_force: self.max_g_force,
                grade: cockpit_grade(fpm),
                score: landing_score(fpm),
            });
        }

        // Go-around / touch-and-go: climbing back above the band rearms.
        if !t.on_ground && t.radio_altitude > ARM_CEILING_FT {
            self.reset();
        }

        report
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(radio_alt: f64, vs: f64, on_ground: bool, gs: f64, g: f64) -> TelemetrySnapshot {
        TelemetrySnapshot {
            radio_altitude: radio_alt,
            altitude: radio_alt + 100.0,
            vertical_speed: vs,
            on_ground,
            ground_speed: gs,
            g_force: g,
            ..TelemetrySnapshot::default()
        }
    }

    #[test]
    fn fires_once_with_minimum_vs_captured() {
        let mut bb = BlackBox::new();
        assert!(bb.observe(&frame(40.0, -300.0, false, 130.0, 1.0)).is_none());
        assert!(bb.observe(&frame(20.0, -450.0, false, 128.0, 1.1)).is_none());
        assert!(bb.observe(&frame(5.0, -200.0, false, 125.0, 1.2)).is_none());
        let td = bb
            .observe(&frame(0.0, -50.0, true, 120.0, 1.4))
            .expect("touchdown fires");
        assert_eq!(td.fpm, -450.0);
        assert_eq!(td.g_force, 1.2);

        // Same touchdown, later frames: suppressed.
        assert!(bb.observe(&frame(0.0, 0.0, true, 80.0, 1.0)).is_none());
        assert!(bb.observe(&frame(0.0, 0.0, true, 40.0, 1.0)).is_none());
    }

    #[test]
    fn slow_contact_does_not_fire() {
        let mut bb = BlackBox::new();
        bb.observe(&frame(10.0, -100.0, false, 20.0, 1.0));
        assert!(bb.observe(&frame(0.0, 0.0, true, 10.0, 1.0)).is_none());
        assert!(bb.is_armed());
    }

    #[test]
    fn go_around_rearms_for_second_touchdown() {
        let mut bb = BlackBox::new();
        bb.observe(&frame(30.0, -400.0, false, 130.0, 1.0));
        assert!(bb.observe(&frame(0.5, -100.0, true, 120.0, 1.1)).is_some());

        // Climb away above the band: full reset.
        bb.observe(&frame(80.0, 900.0, false, 140.0, 1.0));
        assert!(!bb.is_armed());
        assert!(!bb.has_fired());

        bb.observe(&frame(25.0, -180.0, false, 125.0, 1.0));
        let td = bb
            .observe(&frame(0.5, -50.0, true, 118.0, 1.05))
            .expect("second landing fires again");
        assert_eq!(td.fpm, -180.0);
    }

    #[test]
    fn never_fires_before_arming() {
        let mut bb = BlackBox::new();
        // Ground contact without ever passing through the arm band.
        assert!(bb.observe(&frame(0.0, 0.0, true, 120.0, 1.0)).is_none());
    }
}
