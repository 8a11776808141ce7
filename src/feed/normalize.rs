// SPDX-License-Identifier: MPL-2.0

use crate::config::FALLBACK_DISPLAY_NAME;
use crate::feed::types::{parse_timestamp, Post, PostContent, PostKind, ReactionCounts};
use crate::stream::RawActivity;

/// Turn a raw activity into the canonical post shape. Total: unresolvable
/// fields degrade to placeholders instead of failing the page.
pub fn normalize(raw: &RawActivity) -> Post {
    let actor = raw.actor.as_ref();
    let actor_data = actor.and_then(|a| a.data.as_ref());

    // Fallback chain: explicit name, then username, then a placeholder.
    let author_display_name = actor_data
        .and_then(|d| d.name.clone())
        .filter(|n| !n.is_empty())
        .or_else(|| {
            actor_data
                .and_then(|d| d.username.clone())
                .filter(|n| !n.is_empty())
        })
        .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string());

    let counts = raw.reaction_counts.as_ref();
    let own_likes = raw.own_reactions.as_ref().map(|r| r.like.as_slice());
    let viewer_like_id = own_likes
        .and_then(|likes| likes.first())
        .filter(|like| !like.id.is_empty())
        .map(|like| like.id.clone());

    Post {
        id: raw.id.clone(),
        author_id: actor.map(|a| a.id.clone()).unwrap_or_default(),
        author_display_name,
        author_avatar: actor_data.and_then(|d| d.profile_image.clone()),
        content: extract_content(raw.object.as_ref()),
        tags: raw.tags.clone(),
        created_at: raw.time.as_deref().and_then(parse_timestamp),
        kind: PostKind::from_verb(raw.verb.as_deref()),
        counts: ReactionCounts {
            like_count: counts.and_then(|c| c.like).unwrap_or(0),
            comment_count: counts.and_then(|c| c.comment).unwrap_or(0),
            share_count: counts.and_then(|c| c.share).unwrap_or(0),
            viewer_has_liked: own_likes.is_some_and(|likes| !likes.is_empty()),
        },
        viewer_like_id,
    }
}

fn extract_content(object: Option<&serde_json::Value>) -> PostContent {
    let Some(object) = object else {
        return PostContent::default();
    };

    if let Some(text) = object.as_str() {
        return PostContent {
            text: text.to_string(),
            ..Default::default()
        };
    }

    let field = |key: &str| {
        object
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    PostContent {
        text: field("text").unwrap_or_default(),
        media_url: field("media_url").or_else(|| field("image")),
        prediction: object.get("prediction").cloned(),
    }
}
