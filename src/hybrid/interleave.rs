// SPDX-License-Identifier: MPL-2.0

//! Deterministic merge of the two feed sources.
//!
//! Pure functions over plain sequences: no I/O, no clocks, no source state.
//! The async orchestration above feeds in whatever each source currently
//! holds and renders the result.

use super::feed::HybridFeedItem;
use crate::feed::Post;
use crate::recommend::PersonalizedItem;

/// Split personalized items into live (in-play matches) and everything
/// else, preserving relative order within each half.
pub fn partition_live(
    items: &[PersonalizedItem],
) -> (Vec<PersonalizedItem>, Vec<PersonalizedItem>) {
    items.iter().cloned().partition(|item| item.is_live())
}

/// Merge the three ordered sequences into one feed.
///
/// Live items come first, unconditionally; time-sensitive content is never
/// buried by interleaving. Then stream posts are walked in order with one
/// non-live personalized item spliced in after every `ratio` posts;
/// leftovers of either sequence are appended in order.
pub fn interleave(
    live: &[PersonalizedItem],
    non_live: &[PersonalizedItem],
    stream: &[Post],
    ratio: usize,
) -> Vec<HybridFeedItem> {
    let mut out: Vec<HybridFeedItem> = live
        .iter()
        .cloned()
        .map(HybridFeedItem::Personalized)
        .collect();

    if stream.is_empty() {
        out.extend(non_live.iter().cloned().map(HybridFeedItem::Personalized));
        return out;
    }
    if non_live.is_empty() {
        out.extend(stream.iter().cloned().map(HybridFeedItem::Stream));
        return out;
    }

    let ratio = ratio.max(1);
    let mut next_personalized = 0;
    for (i, post) in stream.iter().enumerate() {
        out.push(HybridFeedItem::Stream(post.clone()));
        if (i + 1) % ratio == 0
            && let Some(item) = non_live.get(next_personalized)
        {
            out.push(HybridFeedItem::Personalized(item.clone()));
            next_personalized += 1;
        }
    }

    out.extend(
        non_live[next_personalized..]
            .iter()
            .cloned()
            .map(HybridFeedItem::Personalized),
    );
    out
}
