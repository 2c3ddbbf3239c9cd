//! CLI module
//!
//! Command-line interface for walking one endpoint.
//!
//! # Commands
//!
//! - `timeline` - Walk a `since_id`/`max_id` timeline
//! - `search` - Walk search results
//! - `followers` - Walk the follower ID list
//! - `friends` - Walk the friend ID list

mod commands;
mod runner;

pub use commands::{parse_key_value, Cli, Commands, OutputFormat};
pub use runner::{Runner, WalkSummary};
