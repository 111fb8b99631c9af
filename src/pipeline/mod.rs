//! Pipeline entry points for watcher operations.
//!
//! - `run_profile`: Fetch one member profile and report it
//! - `run_watch`: Poll a member's post count and announce increases

pub mod profile;
pub mod watch;

pub use profile::run_profile;
pub use watch::{LogNotifier, run_watch};
