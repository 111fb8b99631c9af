// src/models/selectors.rs

//! CSS selectors for scraping member profile pages.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Locators for each extractable field on a member profile page.
///
/// One locator per field, so a forum skin change means editing one entry
/// here rather than touching the extraction code. Statistics entries
/// (join date, post count) are located by a text label within the stats
/// block, since the markup gives them no distinguishing class or id.
/// Defaults target a stock vBulletin 3 member page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSelectors {
    /// Selector for the profile owner's name
    #[serde(default = "defaults::user_name")]
    pub user_name_selector: String,

    /// Selector for the entries of the statistics block
    #[serde(default = "defaults::stats_item")]
    pub stats_item_selector: String,

    /// Text label prefixing the join date entry
    #[serde(default = "defaults::join_date_label")]
    pub join_date_label: String,

    /// Text label prefixing the post count entry
    #[serde(default = "defaults::total_posts_label")]
    pub total_posts_label: String,

    /// Selector for the "about me" text
    #[serde(default = "defaults::bio")]
    pub bio_selector: String,

    /// Selector for the visitor message container
    #[serde(default = "defaults::message_list")]
    pub message_list_selector: String,

    /// Selector for one message block within the container
    #[serde(default = "defaults::message_row")]
    pub message_row_selector: String,

    /// Selector for the author link within a message block
    #[serde(default = "defaults::message_author")]
    pub message_author_selector: String,

    /// Selector for the body within a message block
    #[serde(default = "defaults::message_body")]
    pub message_body_selector: String,

    /// Selector for post permalinks on the find-user search page
    #[serde(default = "defaults::search_post_link")]
    pub search_post_link_selector: String,

    /// Selector for candidate reputation cells within a post table
    #[serde(default = "defaults::reputation_cell")]
    pub reputation_cell_selector: String,

    /// Text label prefixing the reputation value
    #[serde(default = "defaults::reputation_label")]
    pub reputation_label: String,
}

impl Default for ProfileSelectors {
    fn default() -> Self {
        Self {
            user_name_selector: defaults::user_name(),
            stats_item_selector: defaults::stats_item(),
            join_date_label: defaults::join_date_label(),
            total_posts_label: defaults::total_posts_label(),
            bio_selector: defaults::bio(),
            message_list_selector: defaults::message_list(),
            message_row_selector: defaults::message_row(),
            message_author_selector: defaults::message_author(),
            message_body_selector: defaults::message_body(),
            search_post_link_selector: defaults::search_post_link(),
            reputation_cell_selector: defaults::reputation_cell(),
            reputation_label: defaults::reputation_label(),
        }
    }
}

impl ProfileSelectors {
    /// Check that every configured selector parses and no label is blank.
    pub fn validate(&self) -> Result<()> {
        for selector in [
            self.user_name_selector.as_str(),
            self.stats_item_selector.as_str(),
            self.bio_selector.as_str(),
            self.message_list_selector.as_str(),
            self.message_row_selector.as_str(),
            self.message_author_selector.as_str(),
            self.message_body_selector.as_str(),
            self.search_post_link_selector.as_str(),
            self.reputation_cell_selector.as_str(),
        ] {
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }

        for label in [
            &self.join_date_label,
            &self.total_posts_label,
            &self.reputation_label,
        ] {
            if label.trim().is_empty() {
                return Err(AppError::validation("selector labels must not be empty"));
            }
        }
        Ok(())
    }
}

mod defaults {
    pub fn user_name() -> String {
        "#username_box h1".into()
    }
    pub fn stats_item() -> String {
        "#collapseobj_stats li".into()
    }
    pub fn join_date_label() -> String {
        "Join Date: ".into()
    }
    pub fn total_posts_label() -> String {
        "Total Posts: ".into()
    }
    pub fn bio() -> String {
        "#collapseobj_aboutme dl dd".into()
    }
    pub fn message_list() -> String {
        "#message_list".into()
    }
    pub fn message_row() -> String {
        "#message_list > li".into()
    }
    pub fn message_author() -> String {
        "div.message_head a.username".into()
    }
    pub fn message_body() -> String {
        "div.message_text".into()
    }
    pub fn search_post_link() -> String {
        "td.alt1 div.alt2 div em a".into()
    }
    pub fn reputation_cell() -> String {
        "td.alt2 div".into()
    }
    pub fn reputation_label() -> String {
        "Reputation: ".into()
    }
}
