// SPDX-License-Identifier: MPL-2.0

#![allow(dead_code)]

/// Default number of activities requested per stream page.
pub const DEFAULT_STREAM_LIMIT: usize = 25;

/// Hard cap on a single stream page; larger requests are clamped.
pub const MAX_STREAM_LIMIT: usize = 50;

/// Default number of ranked items requested per recommendation page.
pub const DEFAULT_RECOMMEND_LIMIT: usize = 10;

/// A personalized item is spliced in after every Nth stream post.
pub const DEFAULT_INTERLEAVE_RATIO: usize = 3;

/// Placeholder display name when an author cannot be resolved.
pub const FALLBACK_DISPLAY_NAME: &str = "User";
