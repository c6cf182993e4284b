//! Rank promotion and automated award grants.
use chrono::{DateTime, Utc};
use log::info;

use crate::state::{AirlineState, AwardCategory, PilotAward};

/// Promote a pilot to the highest auto-promote rank their cumulative hours
/// and flights qualify for. Returns the new rank name when a promotion
/// happened.
pub fn check_and_upgrade_rank(state: &mut AirlineState, pilot_id: &str) -> Option<String> {
    let pilot = state.find_pilot(pilot_id)?;
    let hours = pilot.rank_hours();
    let flights = pilot.total_flights;
    let current_order = state
        .ranks
        .iter()
        .find(|r| r.name == pilot.rank)
        .map_or(-1, |r| i64::from(r.order));

    let eligible = state
        .ranks
        .iter()
        .filter(|r| {
            r.auto_promote
                && hours >= r.requirement_hours
                && flights >= r.requirement_flights
                && i64::from(r.order) > current_order
        })
        .max_by_key(|r| r.order)?
        .name
        .clone();

    let pilot = state.find_pilot_mut(pilot_id)?;
    info!(
        "promoting pilot {} from {} to {eligible}",
        pilot.pilot_id, pilot.rank
    );
    pilot.rank = eligible.clone();
    Some(eligible)
}

/// Grant every automated award whose requirement the pilot's refreshed
/// totals now meet. Returns newly granted award names.
pub fn check_and_grant_awards(
    state: &mut AirlineState,
    pilot_id: &str,
    now: DateTime<Utc>,
) -> Vec<String> {
    let Some(pilot) = state.find_pilot(pilot_id) else {
        return Vec::new();
    };
    let canonical_id = pilot.pilot_id.clone();
    let total_hours = pilot.total_hours;
    let total_flights = pilot.total_flights;

    let earned: Vec<(String, String)> = state
        .awards
        .iter()
        .filter(|award| award.active)
        .filter_map(|award| {
            let pilot_value = match award.category {
                AwardCategory::FlightHours => total_hours,
                // Landings are tracked one-per-flight.
                AwardCategory::Flights | AwardCategory::Landings => total_flights as f64,
                AwardCategory::Special | AwardCategory::Event => return None,
            };
            let required = award.required_value?;
            (pilot_value >= required).then(|| (award.id.clone(), award.name.clone()))
        })
        .collect();

    let mut granted = Vec::new();
    for (award_id, award_name) in earned {
        if state.has_award(&canonical_id, &award_id) {
            continue;
        }
        state.pilot_awards.push(PilotAward {
            pilot_id: canonical_id.clone(),
            award_id,
            earned_at: now,
        });
        info!("award granted: pilot {canonical_id} earned \"{award_name}\"");
        granted.push(award_name);
    }
    granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Award, Pilot};

    fn state_with_pilot(hours: f64, flights: u64) -> AirlineState {
        let mut state = AirlineState::default();
        let mut pilot = Pilot::new("SKY0001", "Ada", "Nasser");
        pilot.total_hours = hours;
        pilot.total_flights = flights;
        state.pilots.push(pilot);
        state
    }

    #[test]
    fn promotes_to_highest_eligible_rank() {
        let mut state = state_with_pilot(120.0, 100);
        let new_rank = check_and_upgrade_rank(&mut state, "SKY0001");
        assert_eq!(new_rank.as_deref(), Some("Senior First Officer"));
        assert_eq!(state.pilots[0].rank, "Senior First Officer");
    }

    #[test]
    fn no_promotion_when_requirements_not_met() {
        let mut state = state_with_pilot(5.0, 4);
        assert!(check_and_upgrade_rank(&mut state, "SKY0001").is_none());
        assert_eq!(state.pilots[0].rank, "Cadet");
    }

    #[test]
    fn flights_requirement_gates_promotion() {
        // Plenty of hours, not enough flights for First Officer.
        let mut state = state_with_pilot(60.0, 12);
        let new_rank = check_and_upgrade_rank(&mut state, "SKY0001");
        assert_eq!(new_rank.as_deref(), Some("Second Officer"));
    }

    #[test]
    fn transfer_hours_count_toward_rank() {
        let mut state = state_with_pilot(4.0, 20);
        state.pilots[0].transfer_hours = 8.0;
        let new_rank = check_and_upgrade_rank(&mut state, "SKY0001");
        assert_eq!(new_rank.as_deref(), Some("Second Officer"));
    }

    #[test]
    fn awards_grant_once() {
        let mut state = state_with_pilot(55.0, 30);
        state.awards.push(Award {
            id: "award-50h".to_string(),
            name: "50 Hours".to_string(),
            category: AwardCategory::FlightHours,
            required_value: Some(50.0),
            active: true,
            linked_tour_id: None,
        });

        let now = Utc::now();
        let first = check_and_grant_awards(&mut state, "SKY0001", now);
        assert_eq!(first, vec!["50 Hours".to_string()]);
        let second = check_and_grant_awards(&mut state, "SKY0001", now);
        assert!(second.is_empty());
        assert_eq!(state.pilot_awards.len(), 1);
    }

    #[test]
    fn special_awards_are_never_auto_granted() {
        let mut state = state_with_pilot(500.0, 400);
        state.awards.push(Award {
            id: "award-special".to_string(),
            name: "Founders Wing".to_string(),
            category: AwardCategory::Special,
            required_value: Some(1.0),
            active: true,
            linked_tour_id: None,
        });
        assert!(check_and_grant_awards(&mut state, "SKY0001", Utc::now()).is_empty());
    }
}
