// SPDX-License-Identifier: MPL-2.0

mod feed;
mod interleave;

pub use feed::{HybridFeed, HybridFeedItem, HybridFeedOptions};
pub use interleave::{interleave, partition_live};
