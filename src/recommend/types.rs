// SPDX-License-Identifier: MPL-2.0

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Match liveness as reported by the recommendation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Liveness {
    #[default]
    Prematch,
    Inplay,
    Finished,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchData {
    pub id: String,
    #[serde(default)]
    pub liveness: Liveness,
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub league_id: String,
    #[serde(default)]
    pub sport_id: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HighlightData {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub video_url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration_secs: Option<u32>,
    /// Match this highlight was cut from, when known.
    #[serde(default)]
    pub match_id: Option<String>,
}

/// A ranked personalized entry. Produced by the recommendation source and
/// never mutated by the orchestrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PersonalizedItem {
    Match(MatchData),
    Highlight(HighlightData),
}

impl PersonalizedItem {
    pub fn id(&self) -> &str {
        match self {
            PersonalizedItem::Match(m) => &m.id,
            PersonalizedItem::Highlight(h) => &h.id,
        }
    }

    pub fn kind(&self) -> RecItemKind {
        match self {
            PersonalizedItem::Match(_) => RecItemKind::Match,
            PersonalizedItem::Highlight(_) => RecItemKind::Highlight,
        }
    }

    /// Live content is surfaced ahead of everything else in the feed.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            PersonalizedItem::Match(MatchData {
                liveness: Liveness::Inplay,
                ..
            })
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecItemKind {
    Match,
    Highlight,
}

impl RecItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecItemKind::Match => "match",
            RecItemKind::Highlight => "highlight",
        }
    }
}

/// Composite continuation token for the recommendation source. Derived
/// strictly from the last item of the previous page; never compared with
/// stream cursors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecCursor {
    pub rank: u32,
    pub item_type: RecItemKind,
    pub item_id: String,
}

/// One pre-ranked row as the backend query returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct RankedItem {
    pub rank: u32,
    #[serde(flatten)]
    pub item: PersonalizedItem,
}
