// SPDX-License-Identifier: MPL-2.0

//! Hybrid feed orchestration core.
//!
//! Merges two independently paginated remote sources, a reverse-
//! chronological social activity stream and a pre-ranked personalized
//! stream (matches and highlights), into one deterministically ordered,
//! incrementally loadable feed. Also owns per-post reaction and comment
//! state with optimistic mutation and in-flight request de-duplication.
//!
//! The remote clients are injected as trait handles; this crate performs
//! no transport of its own and persists nothing across sessions.

pub mod config;
pub mod feed;
pub mod hybrid;
pub mod recommend;
pub mod runtime;
pub mod stream;

pub use feed::{Comment, Post, PostKind, ReactionCounts, ReactionHandlers, SocialFeedProvider};
pub use hybrid::{HybridFeed, HybridFeedItem, HybridFeedOptions};
pub use recommend::{PersonalizedItem, RecommendationClient, RecommendationSource};
pub use stream::{ActivityStreamClient, MediaAttachment, StreamError, Viewer};
