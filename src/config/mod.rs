//! Configuration module for the harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file targets the production portal.
//!
//! # Example
//!
//! ```no_run
//! use dkmh_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Writing snapshot to: {}", config.output.database_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, EndpointConfig, FilterConfig, OutputConfig, ParserConfig, ParserStrategy,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, hash_content, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
