//! CLI module for filingqa
//!
//! Handles command-line argument parsing and configuration management.

pub mod args;
pub mod config;

pub use args::{Args, Commands, Verbosity};
pub use config::{Config, EmbeddingConfig, PathsConfig, TokensConfig};
