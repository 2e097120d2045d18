//! Simulated match execution for driving tournaments end to end
//!
//! Stands in for the real match executor: each game is decided by a
//! weighted coin flip on the two agents' Elo expectation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{FormatConfig, FormatType};
use crate::elo::expected_score;
use crate::error::ConfigError;
use crate::session::Tournament;
use crate::types::{AgentStanding, MatchResult, Pairing};

/// Rating assumed for agents missing from the standings
const FALLBACK_ELO: i32 = 1500;

/// An agent on the simulated roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntry {
    pub address: String,
    #[serde(default = "default_elo")]
    pub elo: i32,
}

fn default_elo() -> i32 {
    FALLBACK_ELO
}

/// A simulated tournament, as read from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub name: String,
    pub format: FormatType,
    /// Seeds both the format (rumble entry order) and the match dice
    #[serde(default)]
    pub seed: u64,
    /// Safety stop for formats that never finish with the given results
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Chance of a draw in formats that allow draws
    #[serde(default)]
    pub draw_rate: f64,
    #[serde(default)]
    pub config: FormatConfig,
    pub agents: Vec<AgentEntry>,
}

fn default_max_rounds() -> u32 {
    500
}

impl SimulationConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn standings(&self) -> Vec<AgentStanding> {
        self.agents
            .iter()
            .map(|a| AgentStanding::new(a.address.clone(), a.elo))
            .collect()
    }
}

/// Plays pairings by rolling against Elo expectations
pub struct MatchSimulator {
    rng: StdRng,
    draw_rate: f64,
}

impl MatchSimulator {
    pub fn new(seed: u64, draw_rate: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            draw_rate: draw_rate.clamp(0.0, 1.0),
        }
    }

    /// Play one game between the pairing's agents
    pub fn play(
        &mut self,
        match_id: String,
        pairing: &Pairing,
        standings: &[AgentStanding],
        allow_draws: bool,
    ) -> MatchResult {
        let elo_of = |address: &str| {
            standings
                .iter()
                .find(|s| s.address == address)
                .map(|s| s.elo)
                .unwrap_or(FALLBACK_ELO)
        };

        if allow_draws && self.draw_rate > 0.0 && self.rng.gen_bool(self.draw_rate) {
            return MatchResult::draw(match_id, pairing.player1.clone(), pairing.player2.clone());
        }

        let p1_expected = expected_score(elo_of(&pairing.player1), elo_of(&pairing.player2));
        if self.rng.gen_bool(p1_expected) {
            MatchResult::win(match_id, pairing.player1.clone(), pairing.player2.clone())
        } else {
            MatchResult::win(match_id, pairing.player2.clone(), pairing.player1.clone())
        }
    }

    /// Play every pairing of `round`; match ids are `r{round}-m{index}`
    pub fn play_round(
        &mut self,
        round: u32,
        pairings: &[Pairing],
        standings: &[AgentStanding],
        allow_draws: bool,
    ) -> Vec<MatchResult> {
        pairings
            .iter()
            .enumerate()
            .map(|(i, pairing)| self.play(format!("r{}-m{}", round, i), pairing, standings, allow_draws))
            .collect()
    }
}

/// How a simulated run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub completed: bool,
    pub rounds_played: u32,
    pub matches_played: u32,
    pub results_skipped: u32,
}

/// Drive `tournament` until it completes or `max_rounds` rounds were played
pub fn run_simulation(
    tournament: &mut Tournament,
    simulator: &mut MatchSimulator,
    max_rounds: u32,
) -> SimulationOutcome {
    let allow_draws = tournament.format().allows_draws();
    let mut outcome = SimulationOutcome {
        completed: tournament.is_complete(),
        rounds_played: 0,
        matches_played: 0,
        results_skipped: 0,
    };

    while !outcome.completed && outcome.rounds_played < max_rounds {
        let pairing = tournament.next_round();
        let round = tournament.pending_round().map_or(0, |r| r.round);
        let results = simulator.play_round(round, &pairing.pairings, tournament.standings(), allow_draws);
        outcome.matches_played += results.len() as u32;

        let played = results.len();
        let skipped = tournament.record_results(results);
        if played > 0 && skipped.len() == played {
            // Nothing landed; close the round rather than replaying it
            tournament.record_results(Vec::new());
        }
        outcome.results_skipped += skipped.len() as u32;
        outcome.rounds_played += 1;
        outcome.completed = tournament.is_complete();

        tracing::info!(
            round,
            matches = pairing.pairings.len(),
            byes = pairing.byes.len(),
            skipped = skipped.len(),
            "round finished"
        );
    }

    if !outcome.completed {
        tracing::warn!(max_rounds, "tournament did not finish within the round limit");
    }
    outcome
}

#[cfg(test)]
#[path = "simulator_tests.rs"]
mod simulator_tests;
