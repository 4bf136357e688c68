//! Output module for reporting on the stored snapshot
//!
//! This module handles:
//! - Loading table counts and run history from storage
//! - Rendering them for the command line

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, HarvestStatistics};
