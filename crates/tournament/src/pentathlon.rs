//! Pentathlon: a fixed sequence of events, each a full round robin
//!
//! An event ends once every pair of agents has met in it. Agents are then
//! ranked on event wins and earn placement points; the event-win counter
//! (`tournament_points`) starts again from zero for the next event.

use rand::Rng;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::{FormatConfig, FormatType};
use crate::error::ConfigError;
use crate::format::{by_points_then_elo, check_setup, FormatHandler};
use crate::round_robin::{circle_pairings, cycle_length};
use crate::state::{PentathlonScores, PentathlonState};
use crate::types::{
    pair_key, position_of, AgentStanding, LookupMiss, MatchResult, MissReason, PairingResult,
    RoundData, Transition,
};

/// Placement points per event; fifth place and below score nothing
pub const POSITION_POINTS: [u32; 4] = [5, 3, 2, 1];

#[derive(Debug, Clone, Copy, Default)]
pub struct Pentathlon;

pub fn placement_points(rank: u32) -> u32 {
    rank.checked_sub(1)
        .and_then(|i| POSITION_POINTS.get(i as usize))
        .copied()
        .unwrap_or(0)
}

/// Close the current event: rank, award points, reset event wins
fn complete_event(state: &mut PentathlonState, standings: &mut [AgentStanding]) {
    let Some(event) = state.current_event().map(str::to_string) else {
        return;
    };

    let mut field: Vec<&AgentStanding> = standings
        .iter()
        .filter(|s| state.scores.contains_key(&s.address))
        .collect();
    field.sort_by(|a, b| by_points_then_elo(a, b));
    let placings: Vec<(String, u32)> = field
        .iter()
        .enumerate()
        .map(|(i, s)| (s.address.clone(), i as u32 + 1))
        .collect();

    for (address, rank) in &placings {
        if let Some(scores) = state.scores.get_mut(address) {
            scores.award(&event, *rank, placement_points(*rank));
        }
    }
    for standing in standings.iter_mut() {
        standing.tournament_points = 0;
    }

    tracing::info!(
        event = %event,
        winner = ?placings.first().map(|(a, _)| a),
        "event completed"
    );
    state.played.clear();
    state.current_event_index += 1;
}

/// Fields too small to play any matchup finish their events at once
fn close_unplayable_events(state: &mut PentathlonState, standings: &mut [AgentStanding]) {
    while state.current_event().is_some() && state.matchups_per_event() == 0 {
        complete_event(state, standings);
    }
}

impl FormatHandler for Pentathlon {
    type State = PentathlonState;

    const FORMAT: FormatType = FormatType::Pentathlon;

    fn initialize<R: Rng + ?Sized>(
        &self,
        participants: &[AgentStanding],
        config: &FormatConfig,
        _rng: &mut R,
    ) -> Result<Self::State, ConfigError> {
        check_setup(Self::FORMAT, participants, config)?;
        let mut state = PentathlonState {
            events: config.game_type_order.clone(),
            current_event_index: 0,
            seating: participants.iter().map(|p| p.address.clone()).collect(),
            scores: participants
                .iter()
                .map(|p| (p.address.clone(), PentathlonScores::default()))
                .collect::<BTreeMap<_, _>>(),
            played: BTreeSet::new(),
        };
        let mut standings = participants.to_vec();
        close_unplayable_events(&mut state, &mut standings);
        Ok(state)
    }

    /// Unplayed matchups of the current event, at most one match per agent.
    ///
    /// Candidates are taken in circle-method order so a round usually lines
    /// up with one round of the event's round robin.
    fn generate_pairings(
        &self,
        _participants: &[AgentStanding],
        _previous_rounds: &[RoundData],
        _current_round: u32,
        state: &Self::State,
    ) -> PairingResult {
        let mut result = PairingResult::default();
        if state.current_event().is_none() {
            return result;
        }

        let limit = state.seating.len() / 2;
        let mut busy: HashSet<String> = HashSet::new();
        'rounds: for round in 1..=cycle_length(state.seating.len()) {
            for pairing in circle_pairings(&state.seating, round).pairings {
                if result.pairings.len() >= limit {
                    break 'rounds;
                }
                if state.played.contains(&pairing.key())
                    || busy.contains(pairing.player1.as_str())
                    || busy.contains(pairing.player2.as_str())
                {
                    continue;
                }
                busy.insert(pairing.player1.clone());
                busy.insert(pairing.player2.clone());
                result.pairings.push(pairing);
            }
        }

        result.byes = state
            .seating
            .iter()
            .filter(|s| !busy.contains(s.as_str()))
            .cloned()
            .collect();
        result
    }

    fn update_standings(
        &self,
        standings: &[AgentStanding],
        results: &[MatchResult],
        state: &Self::State,
    ) -> Transition<Self::State> {
        let mut standings = standings.to_vec();
        let mut pentathlon = state.clone();
        let mut skipped = Vec::new();

        for result in results {
            if pentathlon.current_event().is_none() {
                skipped.push(LookupMiss::skip(result, MissReason::NoActiveMatch));
                continue;
            }
            let Some(loser_address) = result.loser.as_deref() else {
                skipped.push(LookupMiss::skip(result, MissReason::NoActiveMatch));
                continue;
            };
            let (Some(w), Some(_)) = (
                position_of(&standings, &result.winner),
                position_of(&standings, loser_address),
            ) else {
                skipped.push(LookupMiss::skip(result, MissReason::UnknownPlayer));
                continue;
            };
            if !pentathlon.scores.contains_key(&result.winner)
                || !pentathlon.scores.contains_key(loser_address)
                || result.winner == loser_address
            {
                skipped.push(LookupMiss::skip(result, MissReason::UnknownPlayer));
                continue;
            }

            let key = pair_key(&result.winner, loser_address);
            if pentathlon.played.contains(&key) {
                skipped.push(LookupMiss::skip(result, MissReason::MatchupAlreadyPlayed));
                continue;
            }
            pentathlon.played.insert(key);
            if !result.is_draw {
                standings[w].tournament_points += 1;
            }

            if pentathlon.played.len() >= pentathlon.matchups_per_event() {
                complete_event(&mut pentathlon, &mut standings);
            }
        }

        close_unplayable_events(&mut pentathlon, &mut standings);

        Transition {
            standings,
            state: pentathlon,
            skipped,
        }
    }

    fn is_complete(&self, _standings: &[AgentStanding], _rounds: &[RoundData], state: &Self::State) -> bool {
        state.current_event_index >= state.events.len()
    }

    /// Total points, then event wins (first places), then Elo
    fn final_rankings(
        &self,
        standings: &[AgentStanding],
        _rounds: &[RoundData],
        state: &Self::State,
    ) -> Vec<AgentStanding> {
        let totals = |address: &str| {
            state
                .scores
                .get(address)
                .map(|s| (s.total_points, s.first_places()))
                .unwrap_or((0, 0))
        };

        let mut ranked = standings.to_vec();
        ranked.sort_by(|a, b| {
            let (a_points, a_firsts) = totals(&a.address);
            let (b_points, b_firsts) = totals(&b.address);
            b_points
                .cmp(&a_points)
                .then_with(|| b_firsts.cmp(&a_firsts))
                .then_with(|| b.elo.cmp(&a.elo))
                .then_with(|| a.address.cmp(&b.address))
        });
        ranked
    }

    fn total_rounds(&self, participant_count: usize, config: &FormatConfig) -> u32 {
        config.game_type_order.len() as u32 * cycle_length(participant_count)
    }
}

#[cfg(test)]
#[path = "pentathlon_tests.rs"]
mod pentathlon_tests;
