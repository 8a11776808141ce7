// SPDX-License-Identifier: MPL-2.0

mod source;
mod types;

pub use source::{
    RecommendError, RecommendationClient, RecommendationPage, RecommendationSource,
};
pub use types::{
    HighlightData, Liveness, MatchData, PersonalizedItem, RankedItem, RecCursor, RecItemKind,
};
