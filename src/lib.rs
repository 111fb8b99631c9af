// src/lib.rs

//! forumwatch library
//!
//! Extracts structured profiles from vBulletin member pages and watches a
//! member's post count for new activity.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
