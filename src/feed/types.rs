// SPDX-License-Identifier: MPL-2.0

use crate::stream::{MediaAttachment, Reaction, Viewer};
use chrono::{DateTime, Utc};

/// One social activity rendered in the feed. Lives in memory for the
/// session; discarded on refresh or teardown, never persisted.
#[derive(Debug, Clone)]
pub struct Post {
    /// Stable id derived from the remote activity id.
    pub id: String,
    pub author_id: String,
    pub author_display_name: String,
    pub author_avatar: Option<String>,
    pub content: PostContent,
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub kind: PostKind,
    /// Initial counts as delivered with the activity; the live copy is
    /// owned by the feed operations layer after seeding.
    pub counts: ReactionCounts,
    /// Record id of the viewer's own like, when the payload included it.
    pub viewer_like_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    Plain,
    Prediction,
    Opinion,
    Wager,
}

impl PostKind {
    pub fn from_verb(verb: Option<&str>) -> Self {
        match verb {
            Some("prediction") => PostKind::Prediction,
            Some("opinion") => PostKind::Opinion,
            Some("wager") => PostKind::Wager,
            _ => PostKind::Plain,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostContent {
    pub text: String,
    pub media_url: Option<String>,
    /// Structured prediction/wager body, passed through untouched.
    pub prediction: Option<serde_json::Value>,
}

/// Mutable reaction summary for a post. Seeded from the activity payload,
/// mutated thereafter only by the feed operations layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionCounts {
    pub like_count: u32,
    pub comment_count: u32,
    pub share_count: u32,
    pub viewer_has_liked: bool,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub text: Option<String>,
    pub media: Option<MediaAttachment>,
    pub created_at: Option<DateTime<Utc>>,
    pub relative_time_label: String,
}

impl Comment {
    /// Build a comment from a stored reaction record.
    pub fn from_reaction(reaction: &Reaction) -> Self {
        let created_at = reaction
            .created_at
            .as_deref()
            .and_then(parse_timestamp);
        Self {
            id: reaction.id.clone(),
            author_id: reaction.user_id.clone(),
            author_name: reaction
                .user_name
                .clone()
                .unwrap_or_else(|| crate::config::FALLBACK_DISPLAY_NAME.to_string()),
            author_avatar: reaction.user_avatar.clone(),
            text: reaction.payload.text.clone(),
            media: reaction.payload.attachment.clone(),
            created_at,
            relative_time_label: relative_time(created_at),
        }
    }

    /// Build the optimistic local comment appended before the remote write
    /// confirms.
    pub fn local(id: String, viewer: Option<&Viewer>, text: &str, media: Option<MediaAttachment>) -> Self {
        let now = Utc::now();
        Self {
            id,
            author_id: viewer.map(|v| v.id.clone()).unwrap_or_default(),
            author_name: viewer
                .map(|v| v.display_name.clone())
                .unwrap_or_else(|| crate::config::FALLBACK_DISPLAY_NAME.to_string()),
            author_avatar: viewer.and_then(|v| v.avatar.clone()),
            text: Some(text.to_string()),
            media,
            created_at: Some(now),
            relative_time_label: relative_time(Some(now)),
        }
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Compact relative label: "now", minutes, hours, days, then a date.
pub fn relative_time(created_at: Option<DateTime<Utc>>) -> String {
    let Some(created_at) = created_at else {
        return String::new();
    };

    let duration = Utc::now().signed_duration_since(created_at);

    if duration.num_seconds() < 60 {
        "now".to_string()
    } else if duration.num_minutes() < 60 {
        format!("{}m", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d", duration.num_days())
    } else {
        created_at.format("%b %d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(relative_time(Some(now)), "now");
        assert_eq!(relative_time(Some(now - Duration::minutes(5))), "5m");
        assert_eq!(relative_time(Some(now - Duration::hours(3))), "3h");
        assert_eq!(relative_time(Some(now - Duration::days(2))), "2d");
        // Older than a week falls back to a date, e.g. "Jan 03".
        let old = relative_time(Some(now - Duration::days(30)));
        assert!(old.contains(' '));
    }

    #[test]
    fn test_relative_time_missing_timestamp() {
        assert_eq!(relative_time(None), "");
    }

    #[test]
    fn test_post_kind_from_verb() {
        assert_eq!(PostKind::from_verb(Some("prediction")), PostKind::Prediction);
        assert_eq!(PostKind::from_verb(Some("wager")), PostKind::Wager);
        assert_eq!(PostKind::from_verb(Some("post")), PostKind::Plain);
        assert_eq!(PostKind::from_verb(None), PostKind::Plain);
    }
}
