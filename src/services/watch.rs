// src/services/watch.rs

//! Post-count watch service.
//!
//! Polls a member profile on a fixed interval and fires a notification
//! exactly once per strictly-increasing post-count transition. The
//! comparison logic lives in [`PostCountTracker`] so it can be exercised
//! without timers or HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::{self, Duration, MissedTickBehavior};

use crate::error::Result;
use crate::models::{Config, ProfileField, UserProfile};
use crate::services::ProfileScraper;

/// Zero-argument notification hook fired on each detected increase.
///
/// Invoked from the watch task between ticks; implementations must not
/// block indefinitely or they delay the next poll.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self);
}

/// Tracks the last observed post count and decides when an alert is due.
///
/// The first observation only establishes the baseline. After that, a
/// strictly greater count fires and raises the baseline; equal or lower
/// counts are ignored, so deleted posts never lower the baseline or
/// produce a phantom alert later.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostCountTracker {
    baseline: Option<u32>,
}

impl PostCountTracker {
    /// Create an unarmed tracker with no baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one observed post count. Returns whether an alert is due.
    pub fn observe(&mut self, count: u32) -> bool {
        match self.baseline {
            None => {
                self.baseline = Some(count);
                false
            }
            Some(baseline) if count > baseline => {
                self.baseline = Some(count);
                true
            }
            Some(_) => false,
        }
    }

    /// The current baseline, if armed.
    pub fn baseline(&self) -> Option<u32> {
        self.baseline
    }
}

/// Service watching one member's post count.
///
/// Watchers for different members are fully independent; spawn one task
/// per member.
pub struct PostWatcher {
    config: Arc<Config>,
    scraper: ProfileScraper,
    notifier: Arc<dyn Notifier>,
}

impl PostWatcher {
    /// Create a new watcher using the given HTTP client and notifier.
    pub fn new(config: Arc<Config>, client: reqwest::Client, notifier: Arc<dyn Notifier>) -> Self {
        let scraper = ProfileScraper::new(Arc::clone(&config), client);
        Self {
            config,
            scraper,
            notifier,
        }
    }

    /// Poll the member page until stopped, firing the notifier on each
    /// strictly-increasing post count.
    ///
    /// Ticks are strictly serialized: a slow extraction delays the next
    /// tick instead of overlapping it. A fatal extraction error ends the
    /// watch when `watch.stop_on_error` is set; otherwise it is logged
    /// and the next tick retries.
    pub async fn watch(&self, member_url: &str) -> Result<()> {
        let mut interval =
            time::interval(Duration::from_secs(self.config.watch.poll_interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut tracker = PostCountTracker::new();

        loop {
            interval.tick().await;

            match self.scraper.fetch_profile(member_url).await {
                Ok(profile) => self.handle_profile(&mut tracker, &profile).await,
                Err(e) if self.config.watch.stop_on_error => {
                    log::error!("Watch for {} stopped: {}", member_url, e);
                    return Err(e);
                }
                Err(e) => {
                    log::warn!("Poll of {} failed, will retry: {}", member_url, e);
                }
            }
        }
    }

    /// Spawn the watch as an independent background task.
    pub fn spawn(self, member_url: String) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.watch(&member_url).await })
    }

    /// Compare one freshly extracted profile against the baseline.
    ///
    /// A profile whose post-count field failed to extract is skipped for
    /// this tick; its zero value must not become the baseline.
    async fn handle_profile(&self, tracker: &mut PostCountTracker, profile: &UserProfile) {
        if profile.field_failed(ProfileField::TotalPosts) {
            log::warn!(
                "Post count unavailable for {}, skipping tick",
                profile.user_name
            );
            return;
        }

        if tracker.observe(profile.total_posts) {
            log::info!(
                "Post count for {} rose to {}",
                profile.user_name,
                profile.total_posts
            );
            self.notifier.notify().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::models::FieldError;

    #[derive(Default)]
    struct CountingNotifier {
        fired: AtomicUsize,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn notify(&self) {
            self.fired.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn profile_with_posts(total_posts: u32) -> UserProfile {
        UserProfile {
            user_name: "Kalcor".to_string(),
            total_posts,
            ..UserProfile::default()
        }
    }

    fn watcher(notifier: Arc<CountingNotifier>) -> PostWatcher {
        PostWatcher::new(
            Arc::new(Config::default()),
            reqwest::Client::new(),
            notifier,
        )
    }

    #[test]
    fn first_observation_arms_without_firing() {
        let mut tracker = PostCountTracker::new();
        assert_eq!(tracker.baseline(), None);
        assert!(!tracker.observe(10));
        assert_eq!(tracker.baseline(), Some(10));
    }

    #[test]
    fn fires_once_per_increase() {
        let mut tracker = PostCountTracker::new();
        let fired: Vec<bool> = [10, 10, 12, 12, 15]
            .into_iter()
            .map(|count| tracker.observe(count))
            .collect();

        assert_eq!(fired, vec![false, false, true, false, true]);
        assert_eq!(tracker.baseline(), Some(15));
    }

    #[test]
    fn decrease_never_fires_or_lowers_baseline() {
        let mut tracker = PostCountTracker::new();
        tracker.observe(12);

        assert!(!tracker.observe(9));
        assert_eq!(tracker.baseline(), Some(12));

        // The next alert needs to clear the old high-water mark.
        assert!(!tracker.observe(12));
        assert!(tracker.observe(13));
    }

    #[tokio::test]
    async fn watcher_notifies_through_the_hook() {
        let notifier = Arc::new(CountingNotifier::default());
        let watcher = watcher(Arc::clone(&notifier));
        let mut tracker = PostCountTracker::new();

        for count in [10, 10, 12, 12, 15] {
            watcher
                .handle_profile(&mut tracker, &profile_with_posts(count))
                .await;
        }

        assert_eq!(notifier.fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn degraded_post_count_skips_the_tick() {
        let notifier = Arc::new(CountingNotifier::default());
        let watcher = watcher(Arc::clone(&notifier));
        let mut tracker = PostCountTracker::new();

        watcher
            .handle_profile(&mut tracker, &profile_with_posts(10))
            .await;

        let mut degraded = profile_with_posts(0);
        degraded.errors.push(FieldError::new(
            ProfileField::TotalPosts,
            "no entry labeled 'Total Posts:'",
        ));
        watcher.handle_profile(&mut tracker, &degraded).await;

        // The failed tick neither fired nor disturbed the baseline.
        assert_eq!(notifier.fired.load(Ordering::SeqCst), 0);
        assert_eq!(tracker.baseline(), Some(10));

        watcher
            .handle_profile(&mut tracker, &profile_with_posts(11))
            .await;
        assert_eq!(notifier.fired.load(Ordering::SeqCst), 1);
    }
}
