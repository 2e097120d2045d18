//! Best-of-N series on a seeded single-elimination bracket
//!
//! Each bracket match is a series: the same two players are re-paired every
//! round until one of them has `ceil(N/2)` wins. Series winners are re-seeded
//! into the next bracket round once every series of the current one is done.

use rand::Rng;
use std::collections::BTreeMap;

use crate::config::{FormatConfig, FormatType};
use crate::error::ConfigError;
use crate::format::{by_points_then_elo, by_seed, check_setup, elimination_rounds, FormatHandler};
use crate::state::{SeriesConfig, SeriesTable};
use crate::types::{
    position_of, AgentStanding, LookupMiss, MatchResult, MissReason, Pairing, PairingResult,
    RoundData, Transition,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct BestOfN;

/// Open a bracket round for `seeded` (best seed first): 1 v N, 2 v N-1, ...
/// With an odd count the top seed advances on a bye.
fn open_bracket_round(table: &mut SeriesTable, seeded: Vec<String>) {
    let mut rest = seeded.as_slice();
    table.byes.clear();
    if rest.len() % 2 == 1 {
        table.byes.push(rest[0].clone());
        rest = &rest[1..];
    }
    for i in 0..rest.len() / 2 {
        let id = table.next_series_id;
        table.next_series_id += 1;
        table.series.insert(
            id,
            SeriesConfig::new(
                id,
                table.bracket_round,
                rest[i].clone(),
                rest[rest.len() - 1 - i].clone(),
                table.wins_required,
            ),
        );
    }
}

/// Start the next bracket round once every series of this one is decided
fn advance_bracket(table: &mut SeriesTable, standings: &[AgentStanding]) {
    if table.current().next().is_none() || table.active().next().is_some() {
        return;
    }

    let mut advancing: Vec<&AgentStanding> = table
        .current()
        .filter_map(|s| s.winner.as_deref())
        .chain(table.byes.iter().map(String::as_str))
        .filter_map(|address| standings.iter().find(|s| s.address == address))
        .collect();
    if advancing.len() < 2 {
        return;
    }
    advancing.sort_by(|a, b| by_seed(a, b));
    let seeded: Vec<String> = advancing.iter().map(|s| s.address.clone()).collect();

    table.bracket_round += 1;
    tracing::info!(
        bracket_round = table.bracket_round,
        players = seeded.len(),
        "opening next bracket round"
    );
    open_bracket_round(table, seeded);
}

impl FormatHandler for BestOfN {
    type State = SeriesTable;

    const FORMAT: FormatType = FormatType::BestOfN;

    fn initialize<R: Rng + ?Sized>(
        &self,
        participants: &[AgentStanding],
        config: &FormatConfig,
        _rng: &mut R,
    ) -> Result<Self::State, ConfigError> {
        check_setup(Self::FORMAT, participants, config)?;

        let mut seeded: Vec<&AgentStanding> = participants.iter().collect();
        seeded.sort_by(|a, b| by_seed(a, b));

        let mut table = SeriesTable {
            series: BTreeMap::new(),
            next_series_id: 1,
            bracket_round: 1,
            byes: Vec::new(),
            wins_required: config.wins_required(),
        };
        open_bracket_round(&mut table, seeded.iter().map(|s| s.address.clone()).collect());
        Ok(table)
    }

    fn generate_pairings(
        &self,
        participants: &[AgentStanding],
        _previous_rounds: &[RoundData],
        _current_round: u32,
        state: &Self::State,
    ) -> PairingResult {
        let eliminated = |address: &str| {
            participants
                .iter()
                .any(|p| p.address == address && p.eliminated)
        };

        let pairings = state
            .active()
            .filter(|s| !eliminated(&s.player1) && !eliminated(&s.player2))
            .map(|s| Pairing::new(s.player1.clone(), s.player2.clone()))
            .collect();

        PairingResult {
            pairings,
            byes: state.byes.clone(),
        }
    }

    fn update_standings(
        &self,
        standings: &[AgentStanding],
        results: &[MatchResult],
        state: &Self::State,
    ) -> Transition<Self::State> {
        let mut standings = standings.to_vec();
        let mut table = state.clone();
        let mut skipped = Vec::new();

        for result in results {
            if result.is_draw {
                skipped.push(LookupMiss::skip(result, MissReason::DrawNotAllowed));
                continue;
            }
            let Some(loser_address) = result.loser.as_deref() else {
                skipped.push(LookupMiss::skip(result, MissReason::NoActiveMatch));
                continue;
            };
            let (Some(w), Some(l)) = (
                position_of(&standings, &result.winner),
                position_of(&standings, loser_address),
            ) else {
                skipped.push(LookupMiss::skip(result, MissReason::UnknownPlayer));
                continue;
            };
            let Some(series) = table
                .series
                .values_mut()
                .find(|s| !s.completed && s.involves(&result.winner, loser_address))
            else {
                skipped.push(LookupMiss::skip(result, MissReason::NoActiveMatch));
                continue;
            };

            standings[w].tournament_points += 1;
            if series.record_win(&result.winner) {
                standings[l].eliminated = true;
                tracing::info!(
                    series = series.id,
                    winner = %result.winner,
                    score = %format!("{}-{}", series.player1_wins, series.player2_wins),
                    "series decided"
                );
            }
            advance_bracket(&mut table, &standings);
        }

        Transition {
            standings,
            state: table,
            skipped,
        }
    }

    fn is_complete(&self, standings: &[AgentStanding], _rounds: &[RoundData], _state: &Self::State) -> bool {
        standings.iter().filter(|s| !s.eliminated).count() <= 1
    }

    /// Survivors first, then points (game wins), then Elo
    fn final_rankings(
        &self,
        standings: &[AgentStanding],
        _rounds: &[RoundData],
        _state: &Self::State,
    ) -> Vec<AgentStanding> {
        let mut ranked = standings.to_vec();
        ranked.sort_by(|a, b| {
            a.eliminated
                .cmp(&b.eliminated)
                .then_with(|| by_points_then_elo(a, b))
        });
        ranked
    }

    fn total_rounds(&self, participant_count: usize, config: &FormatConfig) -> u32 {
        elimination_rounds(participant_count) * config.series_length
    }
}

#[cfg(test)]
#[path = "best_of_n_tests.rs"]
mod best_of_n_tests;
