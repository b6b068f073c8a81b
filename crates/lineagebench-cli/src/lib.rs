//! lineagebench CLI library.
//!
//! This module exposes internal types for testing purposes.
//! The main entry point is the `lineagebench` binary.

pub mod cli;
pub mod client;
pub mod expected;
pub mod input;
pub mod output;

// Re-export commonly used types
pub use cli::Args;
pub use client::{ClientConfig, HttpLineageParser};
