// src/pipeline/profile.rs

//! One-shot profile fetch pipeline.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, ProfileSnapshot};
use crate::services::ProfileScraper;
use crate::utils::http;

/// Fetch a member profile once and print it.
pub async fn run_profile(config: Arc<Config>, member_url: &str, json: bool) -> Result<()> {
    let client = http::create_client(&config.client)?;
    let scraper = ProfileScraper::new(Arc::clone(&config), client);

    log::info!("Fetching profile from {}", member_url);
    let profile = scraper.fetch_profile(member_url).await?;

    for error in &profile.errors {
        log::warn!("Field unavailable: {}", error);
    }

    let snapshot = ProfileSnapshot::new(profile);
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(&snapshot);
    }

    Ok(())
}

fn print_summary(snapshot: &ProfileSnapshot) {
    let profile = &snapshot.profile;

    println!("User:       {}", profile.user_name);
    println!("Joined:     {}", profile.join_date);
    println!("Posts:      {}", profile.total_posts);
    println!("Reputation: {}", profile.reputation);
    if !profile.bio_text.is_empty() {
        println!("Bio:        {}", profile.bio_text);
    }

    if !profile.visitor_messages.is_empty() {
        println!("Visitor messages:");
        for message in &profile.visitor_messages {
            println!("  <{}> {}", message.user_name, message.message);
        }
    }

    if !profile.errors.is_empty() {
        println!("Unavailable fields: {}", profile.errors.len());
    }
}
