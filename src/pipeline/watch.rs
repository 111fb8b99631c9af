// src/pipeline/watch.rs

//! Long-running post watch pipeline.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Config;
use crate::services::{Notifier, PostWatcher};
use crate::utils::{self, http};

/// Notifier that announces new posts on the log.
///
/// Stands in for a chat-delivery backend: the watch service only knows it
/// has a hook to call, not what the hook does.
pub struct LogNotifier {
    announcement: String,
}

impl LogNotifier {
    pub fn new(announcement: impl Into<String>) -> Self {
        Self {
            announcement: announcement.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self) {
        log::info!("{}", self.announcement);
    }
}

/// Watch a member's post count until the process is stopped.
///
/// The default announcement links to the member's latest posts, the same
/// place the reputation lookup starts from.
pub async fn run_watch(
    config: Arc<Config>,
    member_id: u64,
    announcement: Option<String>,
) -> Result<()> {
    let member_url = utils::member_page_url(&config.forum.base_url, member_id)?;
    let search_url = utils::search_page_url(&config.forum.base_url, member_id)?;

    let announcement =
        announcement.unwrap_or_else(|| format!("New post by member {member_id}: {search_url}"));

    let client = http::create_client(&config.client)?;
    let notifier = Arc::new(LogNotifier::new(announcement));
    let watcher = PostWatcher::new(Arc::clone(&config), client, notifier);

    log::info!(
        "Watching {} every {}s",
        member_url,
        config.watch.poll_interval_secs
    );
    watcher.watch(&member_url).await
}
