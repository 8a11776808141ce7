// SPDX-License-Identifier: MPL-2.0

mod normalize;
mod ops;
mod provider;
mod types;

pub use normalize::normalize;
pub use ops::{FeedOps, MutationKind, ReactionHandlers};
pub use provider::SocialFeedProvider;
pub use types::{relative_time, Comment, Post, PostContent, PostKind, ReactionCounts};
