//! Round robin: every agent meets every other agent once

use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::config::{FormatConfig, FormatType};
use crate::error::ConfigError;
use crate::format::{check_setup, FormatHandler};
use crate::state::RoundRobinState;
use crate::types::{
    position_of, AgentStanding, LookupMiss, MatchResult, MissReason, Pairing,
    PairingResult, RoundData, Transition,
};

/// Points for a win
pub const WIN_POINTS: i32 = 3;
/// Points each side gets for a draw
pub const DRAW_POINTS: i32 = 1;

#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobin;

/// Rounds in one full cycle for `n` players
pub fn cycle_length(n: usize) -> u32 {
    match n {
        0 | 1 => 0,
        n if n % 2 == 0 => n as u32 - 1,
        n => n as u32,
    }
}

/// Circle-method pairings for `round` (1-based) over a fixed seating.
///
/// The first seat stays put while the rest rotate by `round - 1`; seat `i`
/// meets seat `len - 1 - i`. With an odd seating an empty seat is added and
/// whoever faces it gets a bye.
pub fn circle_pairings(seating: &[String], round: u32) -> PairingResult {
    if seating.len() < 2 {
        return PairingResult {
            pairings: Vec::new(),
            byes: seating.to_vec(),
        };
    }

    let mut slots: Vec<Option<&str>> = seating.iter().map(|s| Some(s.as_str())).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let num_players = slots.len();
    let shift = (round.saturating_sub(1) as usize) % (num_players - 1);

    let mut rotating = slots[1..].to_vec();
    rotating.rotate_right(shift);
    let mut order = Vec::with_capacity(num_players);
    order.push(slots[0]);
    order.extend(rotating);

    let mut result = PairingResult::default();
    for i in 0..num_players / 2 {
        match (order[i], order[num_players - 1 - i]) {
            (Some(a), Some(b)) => result.pairings.push(Pairing::new(a, b)),
            (Some(a), None) | (None, Some(a)) => result.byes.push(a.to_string()),
            (None, None) => {}
        }
    }
    result
}

/// Match points scored by each address over the given results, counting
/// only games where both sides are in `group`
fn head_to_head_points<'a>(
    rounds: &'a [RoundData],
    group: &HashSet<&str>,
) -> HashMap<&'a str, i32> {
    let mut points = HashMap::new();
    for result in rounds.iter().flat_map(|r| r.results.iter()) {
        let Some(loser) = result.loser.as_deref() else {
            continue;
        };
        if !group.contains(result.winner.as_str()) || !group.contains(loser) {
            continue;
        }
        if result.is_draw {
            *points.entry(result.winner.as_str()).or_insert(0) += DRAW_POINTS;
            *points.entry(loser).or_insert(0) += DRAW_POINTS;
        } else {
            *points.entry(result.winner.as_str()).or_insert(0) += WIN_POINTS;
        }
    }
    points
}

impl FormatHandler for RoundRobin {
    type State = RoundRobinState;

    const FORMAT: FormatType = FormatType::RoundRobin;

    fn initialize<R: Rng + ?Sized>(
        &self,
        participants: &[AgentStanding],
        config: &FormatConfig,
        _rng: &mut R,
    ) -> Result<Self::State, ConfigError> {
        check_setup(Self::FORMAT, participants, config)?;
        Ok(RoundRobinState {
            seating: participants.iter().map(|p| p.address.clone()).collect(),
        })
    }

    fn generate_pairings(
        &self,
        _participants: &[AgentStanding],
        previous_rounds: &[RoundData],
        current_round: u32,
        state: &Self::State,
    ) -> PairingResult {
        let mut result = circle_pairings(&state.seating, current_round);
        let cycle = cycle_length(state.seating.len());
        if cycle == 0 {
            return result;
        }

        // Pairings already used earlier in this cycle
        let cycle_index = current_round.saturating_sub(1) / cycle;
        let used: HashSet<(String, String)> = previous_rounds
            .iter()
            .filter(|r| r.round != current_round && r.round.saturating_sub(1) / cycle == cycle_index)
            .flat_map(|r| r.pairings.iter().map(Pairing::key))
            .collect();

        let mut fresh = Vec::with_capacity(result.pairings.len());
        for pairing in result.pairings {
            if used.contains(&pairing.key()) {
                tracing::debug!(
                    player1 = %pairing.player1,
                    player2 = %pairing.player2,
                    "dropping repeated pairing"
                );
                result.byes.push(pairing.player1);
                result.byes.push(pairing.player2);
            } else {
                fresh.push(pairing);
            }
        }
        result.pairings = fresh;
        result
    }

    fn update_standings(
        &self,
        standings: &[AgentStanding],
        results: &[MatchResult],
        state: &Self::State,
    ) -> Transition<Self::State> {
        let mut standings = standings.to_vec();
        let mut skipped = Vec::new();

        for result in results {
            let Some(winner) = position_of(&standings, &result.winner) else {
                skipped.push(LookupMiss::skip(result, MissReason::UnknownPlayer));
                continue;
            };
            let loser = match result.loser.as_deref() {
                Some(address) => match position_of(&standings, address) {
                    Some(idx) => Some(idx),
                    None => {
                        skipped.push(LookupMiss::skip(result, MissReason::UnknownPlayer));
                        continue;
                    }
                },
                None => None,
            };

            if result.is_draw {
                standings[winner].tournament_points += DRAW_POINTS;
                if let Some(loser) = loser {
                    standings[loser].tournament_points += DRAW_POINTS;
                }
            } else {
                standings[winner].tournament_points += WIN_POINTS;
            }
        }

        Transition {
            standings,
            state: state.clone(),
            skipped,
        }
    }

    fn is_complete(&self, _standings: &[AgentStanding], rounds: &[RoundData], state: &Self::State) -> bool {
        // Only rounds that paired someone advance the cycle
        let completed = rounds
            .iter()
            .filter(|r| r.completed && !r.pairings.is_empty())
            .count();
        completed as u32 >= cycle_length(state.seating.len())
    }

    /// Points, then the mini-league among agents tied on points, then Elo
    fn final_rankings(
        &self,
        standings: &[AgentStanding],
        rounds: &[RoundData],
        _state: &Self::State,
    ) -> Vec<AgentStanding> {
        let mut tied: HashMap<i32, Vec<&str>> = HashMap::new();
        for standing in standings {
            tied.entry(standing.tournament_points)
                .or_default()
                .push(&standing.address);
        }

        let mut head_to_head: HashMap<&str, i32> = HashMap::new();
        for group in tied.values().filter(|g| g.len() > 1) {
            let members: HashSet<&str> = group.iter().copied().collect();
            for (address, points) in head_to_head_points(rounds, &members) {
                head_to_head.insert(address, points);
            }
        }

        let h2h = |s: &AgentStanding| head_to_head.get(s.address.as_str()).copied().unwrap_or(0);
        let mut ranked = standings.to_vec();
        ranked.sort_by(|a, b| {
            b.tournament_points
                .cmp(&a.tournament_points)
                .then_with(|| h2h(b).cmp(&h2h(a)))
                .then_with(|| b.elo.cmp(&a.elo))
                .then_with(|| a.address.cmp(&b.address))
        });
        ranked
    }

    fn total_rounds(&self, participant_count: usize, _config: &FormatConfig) -> u32 {
        cycle_length(participant_count)
    }
}

#[cfg(test)]
#[path = "round_robin_tests.rs"]
mod round_robin_tests;
