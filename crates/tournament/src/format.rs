//! The contract every format implements, and the closed registry over them
//!
//! An orchestrator calls [`FormatType::initialize`] once, then loops
//! `generate_pairings` -> (play matches) -> `update_standings` ->
//! `is_complete`, and finally asks for `final_rankings`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use crate::best_of_n::BestOfN;
use crate::config::{FormatConfig, FormatType};
use crate::double_elimination::DoubleElimination;
use crate::error::ConfigError;
use crate::pentathlon::Pentathlon;
use crate::round_robin::RoundRobin;
use crate::royal_rumble::RoyalRumble;
use crate::state::{Bracket, PentathlonState, RoundRobinState, RumbleState, SeriesTable};
use crate::types::{
    AgentStanding, LookupMiss, MatchResult, MissReason, PairingResult, RoundData, Transition,
};

/// Behaviour shared by all tournament formats.
///
/// Handlers are stateless; everything a format remembers between calls
/// lives in its `State`, which is passed in and handed back explicitly.
pub trait FormatHandler {
    type State;

    const FORMAT: FormatType;

    /// Build the initial auxiliary state. Same inputs (and RNG seed) give the same state.
    fn initialize<R: Rng + ?Sized>(
        &self,
        participants: &[AgentStanding],
        config: &FormatConfig,
        rng: &mut R,
    ) -> Result<Self::State, ConfigError>;

    /// Pairings for `current_round` (1-based). Never mutates anything.
    fn generate_pairings(
        &self,
        participants: &[AgentStanding],
        previous_rounds: &[RoundData],
        current_round: u32,
        state: &Self::State,
    ) -> PairingResult;

    /// Apply a batch of results, returning new standings and state.
    ///
    /// Results that do not fit the current state are skipped, never fatal.
    fn update_standings(
        &self,
        standings: &[AgentStanding],
        results: &[MatchResult],
        state: &Self::State,
    ) -> Transition<Self::State>;

    fn is_complete(&self, standings: &[AgentStanding], rounds: &[RoundData], state: &Self::State) -> bool;

    /// Every standing in a deterministic total order, best first
    fn final_rankings(
        &self,
        standings: &[AgentStanding],
        rounds: &[RoundData],
        state: &Self::State,
    ) -> Vec<AgentStanding>;

    /// Scheduling estimate, not a cap
    fn total_rounds(&self, participant_count: usize, config: &FormatConfig) -> u32;
}

/// Config and roster checks shared by every `initialize`
pub(crate) fn check_setup(
    format: FormatType,
    participants: &[AgentStanding],
    config: &FormatConfig,
) -> Result<(), ConfigError> {
    config.validate(format)?;
    let mut seen = HashSet::new();
    for standing in participants {
        if !seen.insert(standing.address.as_str()) {
            return Err(ConfigError::DuplicateParticipant(standing.address.clone()));
        }
    }
    Ok(())
}

/// Seeding order: higher Elo first, address breaks ties
pub(crate) fn by_seed(a: &AgentStanding, b: &AgentStanding) -> Ordering {
    b.elo.cmp(&a.elo).then_with(|| a.address.cmp(&b.address))
}

/// Points, then Elo, then address
pub(crate) fn by_points_then_elo(a: &AgentStanding, b: &AgentStanding) -> Ordering {
    b.tournament_points
        .cmp(&a.tournament_points)
        .then_with(|| by_seed(a, b))
}

/// Bracket rounds needed to reduce `n` players to one
pub(crate) fn elimination_rounds(n: usize) -> u32 {
    if n < 2 {
        0
    } else {
        (n as u32 - 1).ilog2() + 1
    }
}

/// Per-format state, one variant per format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", content = "data", rename_all = "snake_case")]
pub enum FormatData {
    RoundRobin(RoundRobinState),
    DoubleElimination(Bracket),
    BestOfN(SeriesTable),
    RoyalRumble(RumbleState),
    Pentathlon(PentathlonState),
}

/// Everything one tournament's format remembers between calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatState {
    pub data: FormatData,
    /// Match ids already applied; redeliveries are skipped
    pub applied_matches: BTreeSet<String>,
}

impl FormatType {
    pub fn initialize<R: Rng + ?Sized>(
        self,
        participants: &[AgentStanding],
        config: &FormatConfig,
        rng: &mut R,
    ) -> Result<FormatState, ConfigError> {
        let data = match self {
            FormatType::RoundRobin => {
                FormatData::RoundRobin(RoundRobin.initialize(participants, config, rng)?)
            }
            FormatType::DoubleElimination => {
                FormatData::DoubleElimination(DoubleElimination.initialize(participants, config, rng)?)
            }
            FormatType::BestOfN => FormatData::BestOfN(BestOfN.initialize(participants, config, rng)?),
            FormatType::RoyalRumble => {
                FormatData::RoyalRumble(RoyalRumble.initialize(participants, config, rng)?)
            }
            FormatType::Pentathlon => {
                FormatData::Pentathlon(Pentathlon.initialize(participants, config, rng)?)
            }
        };
        tracing::debug!(format = %self, participants = participants.len(), "tournament initialized");
        Ok(FormatState {
            data,
            applied_matches: BTreeSet::new(),
        })
    }

    pub fn total_rounds(self, participant_count: usize, config: &FormatConfig) -> u32 {
        match self {
            FormatType::RoundRobin => RoundRobin.total_rounds(participant_count, config),
            FormatType::DoubleElimination => DoubleElimination.total_rounds(participant_count, config),
            FormatType::BestOfN => BestOfN.total_rounds(participant_count, config),
            FormatType::RoyalRumble => RoyalRumble.total_rounds(participant_count, config),
            FormatType::Pentathlon => Pentathlon.total_rounds(participant_count, config),
        }
    }
}

impl FormatState {
    pub fn format_type(&self) -> FormatType {
        match &self.data {
            FormatData::RoundRobin(_) => FormatType::RoundRobin,
            FormatData::DoubleElimination(_) => FormatType::DoubleElimination,
            FormatData::BestOfN(_) => FormatType::BestOfN,
            FormatData::RoyalRumble(_) => FormatType::RoyalRumble,
            FormatData::Pentathlon(_) => FormatType::Pentathlon,
        }
    }

    pub fn generate_pairings(
        &self,
        participants: &[AgentStanding],
        previous_rounds: &[RoundData],
        current_round: u32,
    ) -> PairingResult {
        let result = match &self.data {
            FormatData::RoundRobin(s) => {
                RoundRobin.generate_pairings(participants, previous_rounds, current_round, s)
            }
            FormatData::DoubleElimination(s) => {
                DoubleElimination.generate_pairings(participants, previous_rounds, current_round, s)
            }
            FormatData::BestOfN(s) => {
                BestOfN.generate_pairings(participants, previous_rounds, current_round, s)
            }
            FormatData::RoyalRumble(s) => {
                RoyalRumble.generate_pairings(participants, previous_rounds, current_round, s)
            }
            FormatData::Pentathlon(s) => {
                Pentathlon.generate_pairings(participants, previous_rounds, current_round, s)
            }
        };
        tracing::debug!(
            round = current_round,
            pairings = result.pairings.len(),
            byes = ?result.byes,
            "pairings generated"
        );
        result
    }

    /// Apply results exactly once each and return the next state
    pub fn update_standings(&self, standings: &[AgentStanding], results: &[MatchResult]) -> Transition<FormatState> {
        let mut skipped = Vec::new();
        let mut fresh = Vec::with_capacity(results.len());
        let mut batch_ids = HashSet::new();
        for result in results {
            if self.applied_matches.contains(&result.match_id)
                || !batch_ids.insert(result.match_id.as_str())
            {
                skipped.push(LookupMiss::skip(result, MissReason::DuplicateResult));
            } else {
                fresh.push(result.clone());
            }
        }

        let transition = match &self.data {
            FormatData::RoundRobin(s) => RoundRobin
                .update_standings(standings, &fresh, s)
                .map_state(FormatData::RoundRobin),
            FormatData::DoubleElimination(s) => DoubleElimination
                .update_standings(standings, &fresh, s)
                .map_state(FormatData::DoubleElimination),
            FormatData::BestOfN(s) => BestOfN
                .update_standings(standings, &fresh, s)
                .map_state(FormatData::BestOfN),
            FormatData::RoyalRumble(s) => RoyalRumble
                .update_standings(standings, &fresh, s)
                .map_state(FormatData::RoyalRumble),
            FormatData::Pentathlon(s) => Pentathlon
                .update_standings(standings, &fresh, s)
                .map_state(FormatData::Pentathlon),
        };

        // Only results the format actually applied count as consumed
        let rejected: HashSet<&str> = transition
            .skipped
            .iter()
            .map(|miss| miss.match_id.as_str())
            .collect();
        let mut applied_matches = self.applied_matches.clone();
        applied_matches.extend(
            fresh
                .iter()
                .filter(|r| !rejected.contains(r.match_id.as_str()))
                .map(|r| r.match_id.clone()),
        );
        skipped.extend(transition.skipped);

        Transition {
            standings: transition.standings,
            state: FormatState {
                data: transition.state,
                applied_matches,
            },
            skipped,
        }
    }

    pub fn is_complete(&self, standings: &[AgentStanding], rounds: &[RoundData]) -> bool {
        match &self.data {
            FormatData::RoundRobin(s) => RoundRobin.is_complete(standings, rounds, s),
            FormatData::DoubleElimination(s) => DoubleElimination.is_complete(standings, rounds, s),
            FormatData::BestOfN(s) => BestOfN.is_complete(standings, rounds, s),
            FormatData::RoyalRumble(s) => RoyalRumble.is_complete(standings, rounds, s),
            FormatData::Pentathlon(s) => Pentathlon.is_complete(standings, rounds, s),
        }
    }

    pub fn final_rankings(&self, standings: &[AgentStanding], rounds: &[RoundData]) -> Vec<AgentStanding> {
        match &self.data {
            FormatData::RoundRobin(s) => RoundRobin.final_rankings(standings, rounds, s),
            FormatData::DoubleElimination(s) => DoubleElimination.final_rankings(standings, rounds, s),
            FormatData::BestOfN(s) => BestOfN.final_rankings(standings, rounds, s),
            FormatData::RoyalRumble(s) => RoyalRumble.final_rankings(standings, rounds, s),
            FormatData::Pentathlon(s) => Pentathlon.final_rankings(standings, rounds, s),
        }
    }

    pub fn as_bracket(&self) -> Option<&Bracket> {
        match &self.data {
            FormatData::DoubleElimination(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&SeriesTable> {
        match &self.data {
            FormatData::BestOfN(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_rumble(&self) -> Option<&RumbleState> {
        match &self.data {
            FormatData::RoyalRumble(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_pentathlon(&self) -> Option<&PentathlonState> {
        match &self.data {
            FormatData::Pentathlon(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod format_tests;
