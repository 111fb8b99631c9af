//! forumwatch CLI
//!
//! Fetches member profiles on demand and runs long-lived post watches.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use forumwatch::{error::Result, models::Config, pipeline, utils};

/// forumwatch - vBulletin member profile watcher
#[derive(Parser, Debug)]
#[command(
    name = "forumwatch",
    version,
    about = "Watches forum member profiles for new posts"
)]

struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "forumwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a member profile once and print it
    Profile {
        /// Member profile URL, or a bare numeric member id
        member: String,

        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Watch a member's post count and announce increases
    Watch {
        /// Member profile URL, or a bare numeric member id
        member: String,

        /// Poll interval in seconds (overrides config)
        #[arg(long)]
        interval: Option<u64>,

        /// Announcement logged on each new post
        #[arg(long)]
        announcement: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Resolve a CLI member argument (bare id or profile URL) to a member id.
fn resolve_member_id(member: &str) -> Result<u64> {
    if let Ok(id) = member.parse::<u64>() {
        return Ok(id);
    }
    utils::member_id_from_url(member)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Profile { member, json } => {
            let member_id = resolve_member_id(&member)?;
            let member_url = utils::member_page_url(&config.forum.base_url, member_id)?;
            pipeline::run_profile(Arc::new(config), &member_url, json).await?;
        }

        Command::Watch {
            member,
            interval,
            announcement,
        } => {
            if let Some(secs) = interval {
                config.watch.poll_interval_secs = secs;
            }
            config.validate()?;

            let member_id = resolve_member_id(&member)?;
            pipeline::run_watch(Arc::new(config), member_id, announcement).await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            log::info!("All validations passed!");
        }
    }

    Ok(())
}
