// SPDX-License-Identifier: MPL-2.0

mod client;
mod reactions;
mod source;
mod types;

pub use client::{ActivityStreamClient, StreamError};
pub use reactions::ReactionStore;
pub use source::ActivityStreamSource;
pub use types::{
    ActivityPage, MediaAttachment, RawActivity, RawActor, RawActorData, RawOwnReaction,
    RawOwnReactions, RawReactionCounts, Reaction, ReactionKind, ReactionPage, ReactionPayload,
    Viewer,
};
