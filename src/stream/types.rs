// SPDX-License-Identifier: MPL-2.0

use serde::Deserialize;

/// Raw activity as the remote stream delivers it. Field shapes vary between
/// activity verbs, so everything beyond the id is optional and normalized
/// downstream; nothing in the crate branches on raw fields past the boundary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawActivity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub actor: Option<RawActor>,
    #[serde(default)]
    pub verb: Option<String>,
    /// Content payload: a bare string for plain posts, an object for
    /// media/prediction/wager posts.
    #[serde(default)]
    pub object: Option<serde_json::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// RFC 3339 creation timestamp.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub reaction_counts: Option<RawReactionCounts>,
    #[serde(default)]
    pub own_reactions: Option<RawOwnReactions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawActor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub data: Option<RawActorData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawActorData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReactionCounts {
    #[serde(default)]
    pub like: Option<u32>,
    #[serde(default)]
    pub comment: Option<u32>,
    #[serde(default)]
    pub share: Option<u32>,
}

/// The viewer's own reactions embedded in an activity payload, keyed by kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOwnReactions {
    #[serde(default)]
    pub like: Vec<RawOwnReaction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOwnReaction {
    #[serde(default)]
    pub id: String,
}

/// One page of raw activities plus the continuation state for the next.
#[derive(Debug, Clone, Default)]
pub struct ActivityPage {
    pub activities: Vec<RawActivity>,
    /// Id of the last-seen activity; opaque to callers.
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Decoupled from the remote store's representation so we own the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionKind {
    Like,
    Comment,
}

impl ReactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Comment => "comment",
        }
    }
}

/// Body of a reaction write. Likes carry nothing; comments carry text
/// and an optional media attachment.
#[derive(Debug, Clone, Default)]
pub struct ReactionPayload {
    pub text: Option<String>,
    pub attachment: Option<MediaAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub alt: Option<String>,
}

/// A stored reaction as returned by the remote reaction store.
#[derive(Debug, Clone)]
pub struct Reaction {
    pub id: String,
    pub kind: ReactionKind,
    pub activity_id: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub user_avatar: Option<String>,
    pub payload: ReactionPayload,
    /// RFC 3339 creation timestamp.
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReactionPage {
    pub reactions: Vec<Reaction>,
    pub next_cursor: Option<String>,
}

/// The authenticated viewer, as reported by the session lookup.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: String,
    pub display_name: String,
    pub avatar: Option<String>,
}
