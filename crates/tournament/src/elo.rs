//! Elo expectations and post-tournament rating updates

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{AgentStanding, MatchResult};

/// K-factor for Elo updates (higher = more volatile)
pub const K_FACTOR: f64 = 32.0;

/// Expected score of a player rated `rating` against `opponent` (0.0..=1.0)
pub fn expected_score(rating: i32, opponent: i32) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf(f64::from(opponent - rating) / 400.0))
}

/// Rating change for one game; `score` is 1.0, 0.5 or 0.0
pub fn rating_change(rating: f64, opponent: f64, score: f64) -> f64 {
    let expected = 1.0 / (1.0 + 10.0_f64.powf((opponent - rating) / 400.0));
    K_FACTOR * (score - expected)
}

/// Rating movement of one agent over a tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub address: String,
    pub before: i32,
    pub after: i32,
    pub games: u32,
}

/// Running ratings for every agent in a tournament
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EloTracker {
    /// Ratings keyed by address
    pub ratings: BTreeMap<String, f64>,
    /// Number of games played by each agent
    pub games_played: BTreeMap<String, u32>,
}

impl EloTracker {
    pub fn from_standings(standings: &[AgentStanding]) -> Self {
        Self {
            ratings: standings
                .iter()
                .map(|s| (s.address.clone(), f64::from(s.elo)))
                .collect(),
            games_played: BTreeMap::new(),
        }
    }

    pub fn rating(&self, address: &str) -> Option<i32> {
        self.ratings.get(address).map(|r| r.round() as i32)
    }

    /// Update both sides for one result; unknown agents are ignored
    pub fn record(&mut self, result: &MatchResult) {
        let Some(loser) = result.loser.as_deref() else {
            return;
        };
        let (Some(&r1), Some(&r2)) = (self.ratings.get(&result.winner), self.ratings.get(loser)) else {
            return;
        };

        let score = if result.is_draw { 0.5 } else { 1.0 };
        let change = rating_change(r1, r2, score);
        self.ratings.insert(result.winner.clone(), r1 + change);
        self.ratings.insert(loser.to_string(), r2 - change);

        *self.games_played.entry(result.winner.clone()).or_insert(0) += 1;
        *self.games_played.entry(loser.to_string()).or_insert(0) += 1;
    }

    pub fn record_all<'a>(&mut self, results: impl IntoIterator<Item = &'a MatchResult>) {
        for result in results {
            self.record(result);
        }
    }

    /// Before/after ratings for every standing, in standings order
    pub fn changes(&self, standings: &[AgentStanding]) -> Vec<RatingChange> {
        standings
            .iter()
            .map(|s| RatingChange {
                address: s.address.clone(),
                before: s.elo,
                after: self.rating(&s.address).unwrap_or(s.elo),
                games: self.games_played.get(&s.address).copied().unwrap_or(0),
            })
            .collect()
    }

    /// Ratings sorted best first
    pub fn leaderboard(&self) -> Vec<(String, f64, u32)> {
        let mut entries: Vec<_> = self
            .ratings
            .iter()
            .map(|(name, &rating)| {
                let games = self.games_played.get(name).copied().unwrap_or(0);
                (name.clone(), rating, games)
            })
            .collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        entries
    }
}

#[cfg(test)]
#[path = "elo_tests.rs"]
mod elo_tests;
