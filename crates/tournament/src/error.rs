//! Configuration errors raised when a tournament is set up

use thiserror::Error;

/// Invalid tournament configuration; fatal to starting that tournament
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("series length must be a positive odd number, got {0}")]
    InvalidSeriesLength(u32),

    #[error("entry interval must be greater than zero seconds")]
    InvalidEntryInterval,

    #[error("at least one starting participant is required")]
    InvalidStartingParticipants,

    #[error("event list is empty")]
    EmptyEventList,

    #[error("event listed more than once: {0}")]
    DuplicateEvent(String),

    #[error("participant listed more than once: {0}")]
    DuplicateParticipant(String),

    #[error("unknown tournament format: {0}")]
    UnknownFormat(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
