//! Tournament report storage and rendering

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::config::FormatType;
use crate::elo::{EloTracker, RatingChange};
use crate::session::Tournament;
use crate::types::RoundData;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to access report file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode or decode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// One line of the final table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub address: String,
    pub elo: i32,
    pub tournament_points: i32,
    pub eliminated: bool,
}

/// Complete record of a finished (or abandoned) tournament
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentReport {
    /// Name/description of the tournament
    pub name: String,
    pub format: FormatType,
    pub completed: bool,
    pub estimated_rounds: u32,
    pub rankings: Vec<RankingEntry>,
    /// Every round, with its pairings and reported results
    pub rounds: Vec<RoundData>,
    pub rating_changes: Vec<RatingChange>,
}

impl TournamentReport {
    /// Snapshot a tournament, computing Elo movement over all its results
    pub fn from_tournament(name: &str, tournament: &Tournament) -> Self {
        let mut tracker = EloTracker::from_standings(tournament.standings());
        tracker.record_all(tournament.rounds().iter().flat_map(|r| r.results.iter()));

        let rankings = tournament
            .final_rankings()
            .into_iter()
            .enumerate()
            .map(|(i, s)| RankingEntry {
                rank: i as u32 + 1,
                address: s.address,
                elo: s.elo,
                tournament_points: s.tournament_points,
                eliminated: s.eliminated,
            })
            .collect();

        Self {
            name: name.to_string(),
            format: tournament.format(),
            completed: tournament.is_complete(),
            estimated_rounds: tournament.estimated_rounds(),
            rankings,
            rounds: tournament.rounds().to_vec(),
            rating_changes: tracker.changes(tournament.standings()),
        }
    }

    pub fn winner(&self) -> Option<&str> {
        self.rankings.first().map(|r| r.address.as_str())
    }

    /// Save report to JSON file
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load report from JSON file
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Generate a text report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("=== Tournament: {} ===\n\n", self.name));
        report.push_str(&format!(
            "Format: {}, rounds played: {} (estimated {}){}\n\n",
            self.format,
            self.rounds.len(),
            self.estimated_rounds,
            if self.completed { "" } else { ", NOT COMPLETE" }
        ));

        report.push_str("Final standings:\n");
        report.push_str(&format!(
            "{:>4}  {:<24} {:>6} {:>8} {:>6}\n",
            "#", "Agent", "Points", "Elo", "Out"
        ));
        report.push_str(&"-".repeat(54));
        report.push('\n');

        for entry in &self.rankings {
            let change = self
                .rating_changes
                .iter()
                .find(|c| c.address == entry.address)
                .map(|c| c.after)
                .unwrap_or(entry.elo);
            report.push_str(&format!(
                "{:>4}  {:<24} {:>6} {:>8} {:>6}\n",
                entry.rank,
                entry.address,
                entry.tournament_points,
                format!("{}->{}", entry.elo, change),
                if entry.eliminated { "yes" } else { "" }
            ));
        }

        report
    }

    /// Print report to stdout
    pub fn print_report(&self) {
        println!("{}", self.generate_report());
    }
}

#[cfg(test)]
#[path = "results_tests.rs"]
mod results_tests;
