//! Standings, results and round history shared by every format

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a double-elimination bracket a player sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    Winners,
    Losers,
}

impl fmt::Display for BracketSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketSide::Winners => write!(f, "winners"),
            BracketSide::Losers => write!(f, "losers"),
        }
    }
}

/// One participant's running standing in a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStanding {
    /// Stable, unique identifier of the agent
    pub address: String,
    /// Rating used for seeding and as the last tie-break
    pub elo: i32,
    /// Format-defined points (match points, game wins, event wins...)
    pub tournament_points: i32,
    pub eliminated: bool,
    /// Double elimination only; `None` is treated as the winners bracket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bracket_position: Option<BracketSide>,
    /// Double elimination only: losses taken so far
    #[serde(default)]
    pub losses_bracket: u32,
}

impl AgentStanding {
    pub fn new(address: impl Into<String>, elo: i32) -> Self {
        Self {
            address: address.into(),
            elo,
            tournament_points: 0,
            eliminated: false,
            bracket_position: None,
            losses_bracket: 0,
        }
    }
}

/// Outcome of one finished match, as reported by the match executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: String,
    /// For draws this is simply one of the two sides
    pub winner: String,
    /// For draws this is the other side; `None` when it was not reported
    pub loser: Option<String>,
    pub is_draw: bool,
}

impl MatchResult {
    pub fn win(match_id: impl Into<String>, winner: impl Into<String>, loser: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            winner: winner.into(),
            loser: Some(loser.into()),
            is_draw: false,
        }
    }

    pub fn draw(match_id: impl Into<String>, side_a: impl Into<String>, side_b: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            winner: side_a.into(),
            loser: Some(side_b.into()),
            is_draw: true,
        }
    }

    /// True if this result involves both addresses, in either order
    pub fn involves(&self, a: &str, b: &str) -> bool {
        match &self.loser {
            Some(loser) => {
                (self.winner == a && loser == b) || (self.winner == b && loser == a)
            }
            None => false,
        }
    }
}

/// Two agents scheduled to meet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pairing {
    pub player1: String,
    pub player2: String,
}

impl Pairing {
    pub fn new(player1: impl Into<String>, player2: impl Into<String>) -> Self {
        Self {
            player1: player1.into(),
            player2: player2.into(),
        }
    }

    /// Order-independent key used for duplicate detection
    pub fn key(&self) -> (String, String) {
        pair_key(&self.player1, &self.player2)
    }
}

/// Order-independent key for an unordered pair of addresses
pub fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Pairings for one round plus the agents who sit it out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingResult {
    pub pairings: Vec<Pairing>,
    pub byes: Vec<String>,
}

/// History entry for one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundData {
    pub round: u32,
    pub pairings: Vec<Pairing>,
    pub results: Vec<MatchResult>,
    pub completed: bool,
}

impl RoundData {
    pub fn new(round: u32, pairings: Vec<Pairing>) -> Self {
        Self {
            round,
            pairings,
            results: Vec::new(),
            completed: false,
        }
    }
}

/// Why a reported result was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissReason {
    /// Winner or loser is not a participant
    UnknownPlayer,
    /// The match id was already applied
    DuplicateResult,
    /// No open match, series or grand final between these two players
    NoActiveMatch,
    AlreadyEliminated,
    /// Royal rumble: a side has not entered the ring yet
    NotYetEntered,
    /// Elimination formats need a decisive result
    DrawNotAllowed,
    /// Pentathlon: the pair already met in the current event
    MatchupAlreadyPlayed,
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MissReason::UnknownPlayer => "unknown player",
            MissReason::DuplicateResult => "duplicate result",
            MissReason::NoActiveMatch => "no active match",
            MissReason::AlreadyEliminated => "player already eliminated",
            MissReason::NotYetEntered => "player has not entered yet",
            MissReason::DrawNotAllowed => "draws are not allowed",
            MissReason::MatchupAlreadyPlayed => "matchup already played",
        };
        f.write_str(text)
    }
}

/// A result that was skipped instead of applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupMiss {
    pub match_id: String,
    pub reason: MissReason,
}

impl LookupMiss {
    /// Record the miss and log it
    pub(crate) fn skip(result: &MatchResult, reason: MissReason) -> Self {
        tracing::warn!(
            match_id = %result.match_id,
            winner = %result.winner,
            loser = ?result.loser,
            %reason,
            "skipping match result"
        );
        Self {
            match_id: result.match_id.clone(),
            reason,
        }
    }
}

/// Output of `update_standings`: the new standings and state, plus what was skipped
#[derive(Debug, Clone)]
pub struct Transition<S> {
    pub standings: Vec<AgentStanding>,
    pub state: S,
    pub skipped: Vec<LookupMiss>,
}

impl<S> Transition<S> {
    pub fn map_state<T>(self, f: impl FnOnce(S) -> T) -> Transition<T> {
        Transition {
            standings: self.standings,
            state: f(self.state),
            skipped: self.skipped,
        }
    }
}

/// Index of `address` in `standings`
pub(crate) fn position_of(standings: &[AgentStanding], address: &str) -> Option<usize> {
    standings.iter().position(|s| s.address == address)
}
