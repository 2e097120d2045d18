//! Auxiliary state owned by each format
//!
//! Every container here is created by its format's `initialize` and only
//! ever replaced by that format's `update_standings`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::Pairing;

// =============================================================================
// Round robin
// =============================================================================

/// Fixed circle-method seating, taken at initialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRobinState {
    pub seating: Vec<String>,
}

// =============================================================================
// Double elimination
// =============================================================================

/// Bracket phases, in the only order they may occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketPhase {
    Winners,
    Losers,
    GrandFinal,
    Reset,
}

/// The two players contesting the grand final
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finalists {
    pub winners_champion: String,
    pub losers_champion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    /// Winners-bracket matches, one entry per round that had any
    pub rounds: Vec<Vec<Pairing>>,
    pub losers_rounds: Vec<Vec<Pairing>>,
    /// Grand final and, if it happened, the reset
    pub final_matches: Vec<Pairing>,
    pub current_phase: BracketPhase,
    pub finalists: Option<Finalists>,
}

impl Bracket {
    pub fn new() -> Self {
        Self {
            rounds: Vec::new(),
            losers_rounds: Vec::new(),
            final_matches: Vec::new(),
            current_phase: BracketPhase::Winners,
            finalists: None,
        }
    }

    /// Move to `next`; phases never go backwards
    pub fn set_phase(&mut self, next: BracketPhase) {
        assert!(
            next >= self.current_phase,
            "bracket phase cannot move from {:?} back to {:?}",
            self.current_phase,
            next
        );
        self.current_phase = next;
    }
}

impl Default for Bracket {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Best-of-N
// =============================================================================

/// One best-of-N series between two players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub id: u32,
    /// Bracket round this series belongs to (1-based)
    pub bracket_round: u32,
    pub player1: String,
    pub player2: String,
    pub wins_required: u32,
    pub player1_wins: u32,
    pub player2_wins: u32,
    pub completed: bool,
    pub winner: Option<String>,
}

impl SeriesConfig {
    pub fn new(id: u32, bracket_round: u32, player1: String, player2: String, wins_required: u32) -> Self {
        Self {
            id,
            bracket_round,
            player1,
            player2,
            wins_required,
            player1_wins: 0,
            player2_wins: 0,
            completed: false,
            winner: None,
        }
    }

    pub fn involves(&self, a: &str, b: &str) -> bool {
        (self.player1 == a && self.player2 == b) || (self.player1 == b && self.player2 == a)
    }

    /// The player who did not win; `None` while the series is open
    pub fn loser(&self) -> Option<&str> {
        let winner = self.winner.as_deref()?;
        if winner == self.player1 {
            Some(&self.player2)
        } else {
            Some(&self.player1)
        }
    }

    /// Count a game win for `winner`. Returns true if this win decided the series.
    ///
    /// Panics if the series is already decided or `winner` is not in it.
    pub fn record_win(&mut self, winner: &str) -> bool {
        assert!(!self.completed, "series {} already completed", self.id);
        if winner == self.player1 {
            self.player1_wins += 1;
        } else if winner == self.player2 {
            self.player2_wins += 1;
        } else {
            panic!("{} is not a player in series {}", winner, self.id);
        }
        assert!(
            !(self.player1_wins >= self.wins_required && self.player2_wins >= self.wins_required),
            "both players of series {} reached {} wins",
            self.id,
            self.wins_required
        );

        if self.player1_wins >= self.wins_required || self.player2_wins >= self.wins_required {
            self.completed = true;
            self.winner = Some(winner.to_string());
        }
        self.completed
    }
}

/// All series of a best-of-N tournament, keyed by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesTable {
    pub series: BTreeMap<u32, SeriesConfig>,
    /// Next id to hand out; ids are never reused
    pub next_series_id: u32,
    pub bracket_round: u32,
    /// Players advancing from the current bracket round without a series
    pub byes: Vec<String>,
    pub wins_required: u32,
}

impl SeriesTable {
    /// Series of the current bracket round
    pub fn current(&self) -> impl Iterator<Item = &SeriesConfig> + '_ {
        self.series
            .values()
            .filter(move |s| s.bracket_round == self.bracket_round)
    }

    pub fn active(&self) -> impl Iterator<Item = &SeriesConfig> + '_ {
        self.current().filter(|s| !s.completed)
    }
}

// =============================================================================
// Royal rumble
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RumbleParticipant {
    pub address: String,
    /// Position in the shuffled entry order (0-based)
    pub entry_order: u32,
    /// Clock time at which this participant becomes active
    pub entry_time: u64,
    /// 1 for the first elimination, 2 for the second, ...
    pub elimination_order: Option<u32>,
    pub eliminated_by: Option<String>,
    /// Seconds between entry and elimination
    pub survival_time: Option<u64>,
    pub eliminations: u32,
}

impl RumbleParticipant {
    pub fn is_eliminated(&self) -> bool {
        self.elimination_order.is_some()
    }

    /// Survival so far; for survivors this is measured against `now`
    pub fn survival_at(&self, now: u64) -> u64 {
        self.survival_time
            .unwrap_or_else(|| now.saturating_sub(self.entry_time))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RumbleState {
    pub participants: BTreeMap<String, RumbleParticipant>,
    pub current_time: u64,
    pub entry_interval: u64,
    pub eliminations_recorded: u32,
}

impl RumbleState {
    pub fn has_entered(&self, address: &str) -> bool {
        self.participants
            .get(address)
            .is_some_and(|p| p.entry_time <= self.current_time)
    }

    pub fn all_entered(&self) -> bool {
        self.participants
            .values()
            .all(|p| p.entry_time <= self.current_time)
    }

    /// Entered and still standing
    pub fn is_active(&self, address: &str) -> bool {
        self.participants
            .get(address)
            .is_some_and(|p| p.entry_time <= self.current_time && !p.is_eliminated())
    }
}

// =============================================================================
// Pentathlon
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PentathlonScores {
    pub event_scores: BTreeMap<String, u32>,
    pub event_ranks: BTreeMap<String, u32>,
    pub total_points: u32,
    pub events_completed: u32,
}

impl PentathlonScores {
    /// Record the finish in one event; keeps `total_points` equal to the score sum
    pub fn award(&mut self, event: &str, rank: u32, points: u32) {
        if let Some(previous) = self.event_scores.insert(event.to_string(), points) {
            self.total_points -= previous;
        } else {
            self.events_completed += 1;
        }
        self.event_ranks.insert(event.to_string(), rank);
        self.total_points += points;
    }

    pub fn first_places(&self) -> usize {
        self.event_ranks.values().filter(|&&r| r == 1).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PentathlonState {
    pub events: Vec<String>,
    /// Index into `events`; equal to its length once every event is done
    pub current_event_index: usize,
    /// Circle-method seating reused for every event
    pub seating: Vec<String>,
    pub scores: BTreeMap<String, PentathlonScores>,
    /// Unordered pairs that met in the current event
    pub played: BTreeSet<(String, String)>,
}

impl PentathlonState {
    pub fn current_event(&self) -> Option<&str> {
        self.events.get(self.current_event_index).map(String::as_str)
    }

    pub fn matchups_per_event(&self) -> usize {
        let n = self.seating.len();
        n * n.saturating_sub(1) / 2
    }
}
