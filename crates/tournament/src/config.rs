//! Per-tournament configuration

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;

/// Event list used by the pentathlon when none is configured
pub const DEFAULT_GAME_TYPES: [&str; 4] = ["chess", "checkers", "connect_four", "go"];

/// The closed set of supported formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatType {
    RoundRobin,
    DoubleElimination,
    BestOfN,
    RoyalRumble,
    Pentathlon,
}

impl FormatType {
    pub const ALL: [FormatType; 5] = [
        FormatType::RoundRobin,
        FormatType::DoubleElimination,
        FormatType::BestOfN,
        FormatType::RoyalRumble,
        FormatType::Pentathlon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatType::RoundRobin => "round_robin",
            FormatType::DoubleElimination => "double_elimination",
            FormatType::BestOfN => "best_of_n",
            FormatType::RoyalRumble => "royal_rumble",
            FormatType::Pentathlon => "pentathlon",
        }
    }

    /// Whether drawn games count; elimination formats need a decisive result
    pub fn allows_draws(&self) -> bool {
        matches!(self, FormatType::RoundRobin | FormatType::Pentathlon)
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "round_robin" | "rr" => Ok(FormatType::RoundRobin),
            "double_elimination" | "double_elim" => Ok(FormatType::DoubleElimination),
            "best_of_n" | "series" => Ok(FormatType::BestOfN),
            "royal_rumble" | "rumble" => Ok(FormatType::RoyalRumble),
            "pentathlon" => Ok(FormatType::Pentathlon),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Format-specific tunables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Best-of-N: games per series (odd)
    pub series_length: u32,
    /// Royal rumble: seconds between entrants, also the clock step per update
    pub entry_interval_seconds: u64,
    /// Royal rumble: entrants present at time zero
    pub starting_participants: u32,
    /// Pentathlon: ordered event identifiers
    pub game_type_order: Vec<String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            series_length: 3,
            entry_interval_seconds: 60,
            starting_participants: 2,
            game_type_order: DEFAULT_GAME_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FormatConfig {
    /// Parse a config from TOML text; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Wins needed to take a best-of-N series
    pub fn wins_required(&self) -> u32 {
        self.series_length.div_ceil(2)
    }

    /// Check the tunables that `format` reads
    pub fn validate(&self, format: FormatType) -> Result<(), ConfigError> {
        match format {
            FormatType::RoundRobin | FormatType::DoubleElimination => Ok(()),
            FormatType::BestOfN => {
                if self.series_length == 0 || self.series_length % 2 == 0 {
                    return Err(ConfigError::InvalidSeriesLength(self.series_length));
                }
                Ok(())
            }
            FormatType::RoyalRumble => {
                if self.entry_interval_seconds == 0 {
                    return Err(ConfigError::InvalidEntryInterval);
                }
                if self.starting_participants == 0 {
                    return Err(ConfigError::InvalidStartingParticipants);
                }
                Ok(())
            }
            FormatType::Pentathlon => {
                if self.game_type_order.is_empty() {
                    return Err(ConfigError::EmptyEventList);
                }
                let mut seen = HashSet::new();
                for event in &self.game_type_order {
                    if !seen.insert(event.as_str()) {
                        return Err(ConfigError::DuplicateEvent(event.clone()));
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
