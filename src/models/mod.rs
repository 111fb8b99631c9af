// src/models/mod.rs

//! Domain models for the forum watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod profile;
mod selectors;

// Re-export all public types
pub use config::{ClientConfig, Config, ForumConfig, WatchConfig};
pub use profile::{FieldError, ProfileField, ProfileSnapshot, UserProfile, VisitorMessage};
pub use selectors::ProfileSelectors;
