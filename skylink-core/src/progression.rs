//! Tour and activity progression: leg matching, counters, completion
//! rewards, and linked award grants.
use chrono::{DateTime, Utc};
use log::warn;

use crate::state::{
    ActivityProgress, AirlineState, PilotAward, ProgressStatus, TourProgress,
};

/// Aircraft types barred from tour awards regardless of leg constraints.
fn is_fleet_violation(aircraft_type: &str) -> bool {
    let normalized: String = aircraft_type
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .to_uppercase();
    normalized.contains("A380") || normalized.contains("A388") || normalized.contains("380")
}

/// The settled leg being matched against progress records.
#[derive(Debug, Clone, Copy)]
pub struct FlownLeg<'a> {
    pub pilot_id: &'a str,
    pub departure_icao: &'a str,
    pub arrival_icao: &'a str,
    pub aircraft_type: &'a str,
}

/// Advance the activity a bid was booked against, if any. Returns message
/// fragments for the settlement response.
pub fn advance_activity(
    state: &mut AirlineState,
    activity_id: &str,
    leg: &FlownLeg<'_>,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut messages = Vec::new();

    let Some(activity) = state
        .activities
        .iter()
        .find(|a| a.id == activity_id && a.active)
        .cloned()
    else {
        return messages;
    };
    if activity.legs.is_empty() {
        return messages;
    }

    let progress_idx = state
        .activity_progress
        .iter()
        .position(|p| p.pilot_id == leg.pilot_id && p.activity_id == activity_id)
        .unwrap_or_else(|| {
            state.activity_progress.push(ActivityProgress {
                pilot_id: leg.pilot_id.to_string(),
                activity_id: activity_id.to_string(),
                legs_complete: 0,
                percent_complete: 0,
                completed_leg_ids: Vec::new(),
                start_date: now,
                last_leg_flown: None,
                date_complete: None,
                days_to_complete: None,
            });
            state.activity_progress.len() - 1
        });

    // Legs whose constraints the flown leg satisfies; a None airport matches
    // anything.
    let leg_to_mark = activity.legs.iter().find(|candidate| {
        let route_match = candidate
            .departure_icao
            .as_deref()
            .is_none_or(|d| d == leg.departure_icao)
            && candidate
                .arrival_icao
                .as_deref()
                .is_none_or(|a| a == leg.arrival_icao);
        let aircraft_match = candidate.aircraft_types.is_empty()
            || candidate.aircraft_types.iter().any(|t| t == leg.aircraft_type);
        let already_done = state.activity_progress[progress_idx]
            .completed_leg_ids
            .iter()
            .any(|id| id == &candidate.id);
        route_match && aircraft_match && !already_done
    });

    let Some(leg_to_mark) = leg_to_mark else {
        return messages;
    };

    let total_legs = activity.legs.len();
    let progress = &mut state.activity_progress[progress_idx];
    progress.completed_leg_ids.push(leg_to_mark.id.clone());
    progress.legs_complete = progress.completed_leg_ids.len();
    progress.percent_complete =
        ((progress.legs_complete as f64 / total_legs as f64) * 100.0).round() as u32;
    progress.last_leg_flown = Some(now);

    if progress.legs_complete >= total_legs {
        progress.date_complete = Some(now);
        let elapsed = now - progress.start_date;
        progress.days_to_complete =
            Some((elapsed.num_seconds() as f64 / 86_400.0).ceil().max(0.0) as i64);
        let reward = activity.reward_points;
        if reward > 0 {
            if let Some(pilot) = state.find_pilot_mut(leg.pilot_id) {
                pilot.balance += reward;
                pilot.total_credits += reward;
            }
            messages.push(format!(
                " ACTIVITY COMPLETED: {}! Bonus {reward} credits!",
                activity.title
            ));
        } else {
            messages.push(format!(" ACTIVITY COMPLETED: {}!", activity.title));
        }
    } else {
        messages.push(format!(
            " Activity Leg {} of {} Completed! ({})",
            state.activity_progress[progress_idx].legs_complete, total_legs, activity.title
        ));
    }

    messages
}

/// Advance every in-progress tour whose next leg the settled flight matches.
/// Completion grants reward credits and attempts the linked award.
pub fn advance_tours(
    state: &mut AirlineState,
    leg: &FlownLeg<'_>,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut messages = Vec::new();

    let progress_idxs: Vec<usize> = state
        .tour_progress
        .iter()
        .enumerate()
        .filter(|(_, p)| p.pilot_id == leg.pilot_id && p.status == ProgressStatus::InProgress)
        .map(|(i, _)| i)
        .collect();

    for idx in progress_idxs {
        let tour_id = state.tour_progress[idx].tour_id.clone();
        let Some(tour) = state
            .tours
            .iter()
            .find(|t| t.id == tour_id && t.is_active)
            .cloned()
        else {
            continue;
        };

        let next_index = state.tour_progress[idx].current_leg_index;
        let Some(next_leg) = tour.legs.get(next_index) else {
            continue;
        };
        let route_match = next_leg.departure_icao == leg.departure_icao
            && next_leg.arrival_icao == leg.arrival_icao;
        let aircraft_match = next_leg.aircraft_types.is_empty()
            || next_leg.aircraft_types.iter().any(|t| t == leg.aircraft_type);
        if !route_match || !aircraft_match {
            continue;
        }

        let progress: &mut TourProgress = &mut state.tour_progress[idx];
        progress.completed_legs.push(now);
        progress.current_leg_index += 1;

        if progress.current_leg_index >= tour.legs.len() {
            progress.status = ProgressStatus::Completed;
            progress.completed_at = Some(now);

            if tour.reward_credits > 0 {
                if let Some(pilot) = state.find_pilot_mut(leg.pilot_id) {
                    pilot.balance += tour.reward_credits;
                    pilot.total_credits += tour.reward_credits;
                }
                messages.push(format!(
                    " TOUR COMPLETED: {}! Bonus {} credits!",
                    tour.name, tour.reward_credits
                ));
            } else {
                messages.push(format!(" TOUR COMPLETED: {}!", tour.name));
            }

            messages.extend(grant_tour_award(state, &tour.id, leg, now));
        } else {
            messages.push(format!(
                " Tour Leg {} Completed! ({})",
                next_index + 1,
                tour.name
            ));
        }
    }

    messages
}

fn grant_tour_award(
    state: &mut AirlineState,
    tour_id: &str,
    leg: &FlownLeg<'_>,
    now: DateTime<Utc>,
) -> Vec<String> {
    let Some(award) = state
        .awards
        .iter()
        .find(|a| a.active && a.linked_tour_id.as_deref() == Some(tour_id))
        .cloned()
    else {
        return Vec::new();
    };

    if is_fleet_violation(leg.aircraft_type) {
        warn!(
            "tour award {} withheld: fleet violation ({})",
            award.name, leg.aircraft_type
        );
        return vec![" Fleet violation (A380) — award not granted.".to_string()];
    }

    if state.has_award(leg.pilot_id, &award.id) {
        return Vec::new();
    }
    state.pilot_awards.push(PilotAward {
        pilot_id: leg.pilot_id.to_string(),
        award_id: award.id,
        earned_at: now,
    });
    vec![format!(" AWARD UNLOCKED: {}!", award.name)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        Activity, ActivityLeg, Award, AwardCategory, Pilot, Tour, TourLeg,
    };

    fn leg<'a>(dep: &'a str, arr: &'a str, aircraft: &'a str) -> FlownLeg<'a> {
        FlownLeg {
            pilot_id: "SKY0001",
            departure_icao: dep,
            arrival_icao: arr,
            aircraft_type: aircraft,
        }
    }

    fn tour_state() -> AirlineState {
        let mut state = AirlineState::default();
        state.pilots.push(Pilot::new("SKY0001", "Ada", "Nasser"));
        state.tours.push(Tour {
            id: "tour-gulf".to_string(),
            name: "Gulf Hopper".to_string(),
            is_active: true,
            reward_credits: 1000,
            legs: vec![
                TourLeg {
                    departure_icao: "OMDB".to_string(),
                    arrival_icao: "OTHH".to_string(),
                    aircraft_types: Vec::new(),
                },
                TourLeg {
                    departure_icao: "OTHH".to_string(),
                    arrival_icao: "OERK".to_string(),
                    aircraft_types: Vec::new(),
                },
            ],
        });
        state.tour_progress.push(TourProgress {
            pilot_id: "SKY0001".to_string(),
            tour_id: "tour-gulf".to_string(),
            status: ProgressStatus::InProgress,
            current_leg_index: 0,
            completed_legs: Vec::new(),
            completed_at: None,
        });
        state
    }

    #[test]
    fn tour_legs_complete_in_order_only() {
        let mut state = tour_state();
        let now = Utc::now();

        // Second leg flown first: no advance.
        let msgs = advance_tours(&mut state, &leg("OTHH", "OERK", "B738"), now);
        assert!(msgs.is_empty());
        assert_eq!(state.tour_progress[0].current_leg_index, 0);

        let msgs = advance_tours(&mut state, &leg("OMDB", "OTHH", "B738"), now);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("Tour Leg 1 Completed"));
        assert_eq!(state.tour_progress[0].current_leg_index, 1);
    }

    #[test]
    fn tour_completion_pays_and_grants_award() {
        let mut state = tour_state();
        state.awards.push(Award {
            id: "award-gulf".to_string(),
            name: "Gulf Hopper Wing".to_string(),
            category: AwardCategory::Special,
            required_value: None,
            active: true,
            linked_tour_id: Some("tour-gulf".to_string()),
        });
        let now = Utc::now();
        advance_tours(&mut state, &leg("OMDB", "OTHH", "B738"), now);
        let msgs = advance_tours(&mut state, &leg("OTHH", "OERK", "B738"), now);

        assert!(msgs.iter().any(|m| m.contains("TOUR COMPLETED")));
        assert!(msgs.iter().any(|m| m.contains("AWARD UNLOCKED")));
        assert_eq!(state.tour_progress[0].status, ProgressStatus::Completed);
        assert_eq!(state.pilots[0].balance, 1000);
        assert_eq!(state.pilot_awards.len(), 1);
    }

    #[test]
    fn a380_withholds_the_linked_award() {
        let mut state = tour_state();
        state.awards.push(Award {
            id: "award-gulf".to_string(),
            name: "Gulf Hopper Wing".to_string(),
            category: AwardCategory::Special,
            required_value: None,
            active: true,
            linked_tour_id: Some("tour-gulf".to_string()),
        });
        let now = Utc::now();
        advance_tours(&mut state, &leg("OMDB", "OTHH", "A380-800"), now);
        let msgs = advance_tours(&mut state, &leg("OTHH", "OERK", "A380-800"), now);

        assert!(msgs.iter().any(|m| m.contains("TOUR COMPLETED")));
        assert!(msgs.iter().any(|m| m.contains("Fleet violation")));
        assert!(state.pilot_awards.is_empty());
        // Credits still paid; only the award is withheld.
        assert_eq!(state.pilots[0].balance, 1000);
    }

    fn activity_state() -> AirlineState {
        let mut state = AirlineState::default();
        state.pilots.push(Pilot::new("SKY0001", "Ada", "Nasser"));
        state.activities.push(Activity {
            id: "act-cargo".to_string(),
            title: "Cargo Week".to_string(),
            active: true,
            reward_points: 500,
            legs: vec![
                ActivityLeg {
                    id: "leg-1".to_string(),
                    departure_icao: Some("OMDB".to_string()),
                    arrival_icao: Some("OTHH".to_string()),
                    aircraft_types: Vec::new(),
                },
                ActivityLeg {
                    id: "leg-2".to_string(),
                    departure_icao: None,
                    arrival_icao: Some("OERK".to_string()),
                    aircraft_types: Vec::new(),
                },
            ],
        });
        state
    }

    #[test]
    fn activity_replay_is_idempotent_per_leg() {
        let mut state = activity_state();
        let now = Utc::now();

        let msgs = advance_activity(&mut state, "act-cargo", &leg("OMDB", "OTHH", "B738"), now);
        assert_eq!(msgs.len(), 1);
        assert_eq!(state.activity_progress[0].legs_complete, 1);

        // Same settled leg again: leg-1 is already recorded, and leg-2's
        // arrival constraint does not match, so nothing advances.
        let msgs = advance_activity(&mut state, "act-cargo", &leg("OMDB", "OTHH", "B738"), now);
        assert!(msgs.is_empty());
        assert_eq!(state.activity_progress[0].legs_complete, 1);
    }

    #[test]
    fn activity_completion_pays_reward() {
        let mut state = activity_state();
        let now = Utc::now();
        advance_activity(&mut state, "act-cargo", &leg("OMDB", "OTHH", "B738"), now);
        let msgs = advance_activity(&mut state, "act-cargo", &leg("OJAI", "OERK", "B738"), now);
        assert!(msgs[0].contains("ACTIVITY COMPLETED"));
        assert_eq!(state.pilots[0].balance, 500);
        assert_eq!(state.activity_progress[0].percent_complete, 100);
        assert!(state.activity_progress[0].date_complete.is_some());
    }

    #[test]
    fn wildcard_departure_matches_any_origin() {
        let mut state = activity_state();
        let now = Utc::now();
        let msgs = advance_activity(&mut state, "act-cargo", &leg("LOWW", "OERK", "B738"), now);
        assert_eq!(msgs.len(), 1);
        assert_eq!(state.activity_progress[0].completed_leg_ids, vec!["leg-2"]);
    }
}
