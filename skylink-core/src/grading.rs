//! Landing grading and scoring.
//!
//! Two bucket tables are in service: the cockpit table drives the touchdown
//! toast and logbook, the settlement table is what gets persisted on the
//! flight record. They are intentionally different scales and must not be
//! merged (see DESIGN.md).
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grade shown to the pilot at touchdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CockpitGrade {
    Greased,
    Great,
    Average,
    Hard,
    Structural,
}

impl fmt::Display for CockpitGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Greased => "Greased",
            Self::Great => "Great",
            Self::Average => "Average",
            Self::Hard => "Hard",
            Self::Structural => "Structural",
        };
        f.write_str(name)
    }
}

/// Grade persisted on the settled flight record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementGrade {
    Butter,
    Smooth,
    Acceptable,
    Firm,
    Hard,
}

impl fmt::Display for SettlementGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Butter => "Butter",
            Self::Smooth => "Smooth",
            Self::Acceptable => "Acceptable",
            Self::Firm => "Firm",
            Self::Hard => "Hard",
        };
        f.write_str(name)
    }
}

#[must_use]
pub fn cockpit_grade(fpm: f64) -> CockpitGrade {
    let abs = fpm.abs();
    if abs <= 160.0 {
        CockpitGrade::Greased
    } else if abs <= 240.0 {
        CockpitGrade::Great
    } else if abs <= 400.0 {
        CockpitGrade::Average
    } else if abs <= 600.0 {
        CockpitGrade::Hard
    } else {
        CockpitGrade::Structural
    }
}

#[must_use]
pub fn settlement_grade(fpm: f64) -> SettlementGrade {
    let abs = fpm.abs();
    if abs <= 60.0 {
        SettlementGrade::Butter
    } else if abs <= 150.0 {
        SettlementGrade::Smooth
    } else if abs <= 300.0 {
        SettlementGrade::Acceptable
    } else if abs <= 500.0 {
        SettlementGrade::Firm
    } else {
        SettlementGrade::Hard
    }
}

/// Landing score out of 100. Centered on -160 fpm; each fpm of deviation
/// costs 66/158 points, truncated and clamped to [0, 100].
#[must_use]
pub fn landing_score(fpm: f64) -> i64 {
    let deviation = (fpm.abs() - 160.0).abs();
    let raw = (100.0 - deviation * (66.0 / 158.0)).floor();
    raw.clamp(0.0, 100.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_anchors() {
        assert_eq!(landing_score(-160.0), 100);
        assert_eq!(landing_score(-318.0), 34);
        assert_eq!(landing_score(-398.0), 0);
    }

    #[test]
    fn score_never_leaves_range() {
        for fpm in [-2000.0, -900.0, -500.0, -160.0, -10.0, 0.0] {
            let s = landing_score(fpm);
            assert!((0..=100).contains(&s), "score {s} for {fpm}");
        }
    }

    #[test]
    fn cockpit_buckets() {
        assert_eq!(cockpit_grade(-120.0), CockpitGrade::Greased);
        assert_eq!(cockpit_grade(-200.0), CockpitGrade::Great);
        assert_eq!(cockpit_grade(-400.0), CockpitGrade::Average);
        assert_eq!(cockpit_grade(-550.0), CockpitGrade::Hard);
        assert_eq!(cockpit_grade(-601.0), CockpitGrade::Structural);
    }

    #[test]
    fn settlement_buckets() {
        assert_eq!(settlement_grade(-55.0), SettlementGrade::Butter);
        assert_eq!(settlement_grade(-150.0), SettlementGrade::Smooth);
        assert_eq!(settlement_grade(-250.0), SettlementGrade::Acceptable);
        assert_eq!(settlement_grade(-500.0), SettlementGrade::Firm);
        assert_eq!(settlement_grade(-650.0), SettlementGrade::Hard);
    }
}
