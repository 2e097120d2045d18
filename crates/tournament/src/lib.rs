//! Tournament format engine for agent competitions
//!
//! This crate provides:
//! - Five tournament formats (round robin, double elimination, best-of-N
//!   series, royal rumble, pentathlon) behind one [`FormatHandler`] contract
//! - [`FormatState`], the per-tournament state every call reads and returns
//! - [`Tournament`], an in-memory owner for one running tournament
//! - A seeded match simulator and JSON reports for running tournaments offline
//!
//! The engine does no I/O and no scheduling: the caller plays the matches.
//!
//! # Usage
//!
//! ```bash
//! # Simulate a tournament described in TOML
//! cargo run -p tournament_formats -- run demos/double_elimination.toml --out results.json
//!
//! # How many rounds a format needs for 16 agents
//! cargo run -p tournament_formats -- estimate double_elimination 16
//! ```

pub mod best_of_n;
pub mod config;
pub mod double_elimination;
pub mod elo;
pub mod error;
pub mod format;
pub mod pentathlon;
pub mod results;
pub mod round_robin;
pub mod royal_rumble;
pub mod session;
pub mod simulator;
pub mod state;
pub mod types;

pub use best_of_n::BestOfN;
pub use config::*;
pub use double_elimination::DoubleElimination;
pub use elo::{expected_score, EloTracker, RatingChange, K_FACTOR};
pub use error::*;
pub use format::{FormatData, FormatHandler, FormatState};
pub use pentathlon::Pentathlon;
pub use results::*;
pub use round_robin::RoundRobin;
pub use royal_rumble::RoyalRumble;
pub use session::Tournament;
pub use simulator::*;
pub use state::*;
pub use types::*;
