//! In-memory owner of one running tournament

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::{FormatConfig, FormatType};
use crate::error::ConfigError;
use crate::format::FormatState;
use crate::types::{AgentStanding, LookupMiss, MatchResult, PairingResult, RoundData};

/// One tournament: its format state, standings and round history.
///
/// Calls on a single `Tournament` must be serialized; separate tournaments
/// share nothing and can run on separate threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    format: FormatType,
    config: FormatConfig,
    state: FormatState,
    standings: Vec<AgentStanding>,
    rounds: Vec<RoundData>,
    /// Byes handed out in the pending round
    #[serde(default)]
    pending_byes: Vec<String>,
}

impl Tournament {
    pub fn new<R: Rng + ?Sized>(
        format: FormatType,
        participants: Vec<AgentStanding>,
        config: FormatConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let state = format.initialize(&participants, &config, rng)?;
        Ok(Self {
            format,
            config,
            state,
            standings: participants,
            rounds: Vec::new(),
            pending_byes: Vec::new(),
        })
    }

    pub fn format(&self) -> FormatType {
        self.format
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    pub fn state(&self) -> &FormatState {
        &self.state
    }

    pub fn standings(&self) -> &[AgentStanding] {
        &self.standings
    }

    pub fn rounds(&self) -> &[RoundData] {
        &self.rounds
    }

    /// The round waiting for results, if any
    pub fn pending_round(&self) -> Option<&RoundData> {
        self.rounds.last().filter(|r| !r.completed)
    }

    /// Generate and record the next round's pairings.
    ///
    /// While a round is still waiting for results, the same round is
    /// returned again instead of a new one.
    pub fn next_round(&mut self) -> PairingResult {
        if let Some(pending) = self.pending_round() {
            return PairingResult {
                pairings: pending.pairings.clone(),
                byes: self.pending_byes.clone(),
            };
        }

        let round = self.rounds.last().map_or(1, |r| r.round + 1);
        let result = self
            .state
            .generate_pairings(&self.standings, &self.rounds, round);
        self.rounds
            .push(RoundData::new(round, result.pairings.clone()));
        self.pending_byes = result.byes.clone();
        result
    }

    /// Apply a batch of results.
    ///
    /// A pending round is closed by the batch unless every result in a
    /// non-empty batch was skipped; an empty batch always closes it. Results
    /// arriving with no round pending are filed under the latest round (or a
    /// round 0 before the first one) and never open a round of their own.
    /// Only applied results enter the history. Returns the results that were
    /// skipped.
    pub fn record_results(&mut self, results: Vec<MatchResult>) -> Vec<LookupMiss> {
        let reported = results.len();
        let transition = self.state.update_standings(&self.standings, &results);
        let previously_applied = &self.state.applied_matches;
        let now_applied = &transition.state.applied_matches;
        let mut kept = HashSet::new();
        let applied: Vec<MatchResult> = results
            .into_iter()
            .filter(|r| {
                !previously_applied.contains(&r.match_id)
                    && now_applied.contains(&r.match_id)
                    && kept.insert(r.match_id.clone())
            })
            .collect();

        self.standings = transition.standings;
        self.state = transition.state;

        if self.pending_round().is_some() {
            if reported > 0 && applied.is_empty() {
                return transition.skipped;
            }
            if let Some(round) = self.rounds.last_mut() {
                round.results.extend(applied);
                round.completed = true;
            }
            self.pending_byes.clear();
        } else if !applied.is_empty() {
            tracing::debug!(results = applied.len(), "results arrived with no round pending");
            if self.rounds.is_empty() {
                let mut preliminary = RoundData::new(0, Vec::new());
                preliminary.completed = true;
                self.rounds.push(preliminary);
            }
            if let Some(round) = self.rounds.last_mut() {
                round.results.extend(applied);
            }
        }

        transition.skipped
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete(&self.standings, &self.rounds)
    }

    pub fn final_rankings(&self) -> Vec<AgentStanding> {
        self.state.final_rankings(&self.standings, &self.rounds)
    }

    pub fn estimated_rounds(&self) -> u32 {
        self.format.total_rounds(self.standings.len(), &self.config)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
