//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (rate-limit window, complexity budget, etc.)
//! - Environment variable names used for overrides
//! - The [`Config`] struct and logging option types

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
