//! Member profile data structures.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A profile field that can fail to extract independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    JoinDate,
    TotalPosts,
    Reputation,
    Bio,
    VisitorMessages,
}

impl ProfileField {
    /// Human-readable field name for logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::JoinDate => "join date",
            ProfileField::TotalPosts => "total posts",
            ProfileField::Reputation => "reputation",
            ProfileField::Bio => "bio",
            ProfileField::VisitorMessages => "visitor messages",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recoverable, per-field extraction failure.
///
/// Soft failures are carried inside the profile rather than propagated;
/// callers inspect [`UserProfile::errors`] to know the result is degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    /// Which field failed
    pub field: ProfileField,

    /// What went wrong
    pub message: String,
}

impl FieldError {
    /// Create a soft failure for a field.
    pub fn new(field: ProfileField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A single visitor message left on a member's profile page.
///
/// Duplicates are permitted and preserved in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorMessage {
    /// Author of the message
    pub user_name: String,

    /// Message body text
    pub message: String,
}

/// Structured data extracted from one member profile page.
///
/// Every field except `user_name` is optional: a failed extraction leaves
/// the field at its zero value and records a [`FieldError`]. A page whose
/// username cannot be resolved is not a profile page at all and produces
/// no `UserProfile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserProfile {
    /// Display name of the profile owner
    pub user_name: String,

    /// Raw join date as shown on the page (e.g. "March 2009")
    pub join_date: String,

    /// Total number of forum posts
    pub total_posts: u32,

    /// Reputation score; negative for downvoted members
    pub reputation: i64,

    /// "About me" text
    pub bio_text: String,

    /// Visitor messages in page order (the source page caps them at ten)
    pub visitor_messages: Vec<VisitorMessage>,

    /// Soft failures accumulated during extraction, in field order
    pub errors: Vec<FieldError>,
}

impl UserProfile {
    /// Whether every optional field extracted cleanly.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether a specific field failed to extract.
    pub fn field_failed(&self, field: ProfileField) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// A fetched profile together with the time it was taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    /// ISO 8601 timestamp of the fetch
    pub fetched_at: DateTime<Utc>,

    /// The extracted profile
    pub profile: UserProfile,
}

impl ProfileSnapshot {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            fetched_at: Utc::now(),
            profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_display_names_the_field() {
        let error = FieldError::new(ProfileField::TotalPosts, "no entry labeled 'Total Posts: '");
        assert_eq!(
            error.to_string(),
            "total posts: no entry labeled 'Total Posts: '"
        );
    }

    #[test]
    fn profile_completeness_tracks_errors() {
        let mut profile = UserProfile {
            user_name: "Kalcor".to_string(),
            ..UserProfile::default()
        };
        assert!(profile.is_complete());

        profile
            .errors
            .push(FieldError::new(ProfileField::Bio, "no bio element"));
        assert!(!profile.is_complete());
        assert!(profile.field_failed(ProfileField::Bio));
        assert!(!profile.field_failed(ProfileField::JoinDate));
    }
}
