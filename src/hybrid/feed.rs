// SPDX-License-Identifier: MPL-2.0

use crate::config::{DEFAULT_INTERLEAVE_RATIO, DEFAULT_RECOMMEND_LIMIT, DEFAULT_STREAM_LIMIT};
use crate::feed::{Comment, Post, ReactionCounts, ReactionHandlers, SocialFeedProvider};
use crate::hybrid::interleave::{interleave, partition_live};
use crate::recommend::{PersonalizedItem, RecommendationClient, RecommendationSource};
use crate::stream::{ActivityStreamClient, MediaAttachment};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One entry of the merged feed.
#[derive(Debug, Clone)]
pub enum HybridFeedItem {
    Stream(Post),
    Personalized(PersonalizedItem),
}

impl HybridFeedItem {
    /// Globally unique composite key, used for list-rendering identity and
    /// de-duplication across pages.
    pub fn key(&self) -> String {
        match self {
            HybridFeedItem::Stream(post) => format!("stream-{}", post.id),
            HybridFeedItem::Personalized(item) => {
                format!("{}-{}", item.kind().as_str(), item.id())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct HybridFeedOptions {
    pub interleave_ratio: usize,
    pub stream_limit: usize,
    pub recommend_limit: usize,
    pub prefer_highlights_first: bool,
}

impl Default for HybridFeedOptions {
    fn default() -> Self {
        Self {
            interleave_ratio: DEFAULT_INTERLEAVE_RATIO,
            stream_limit: DEFAULT_STREAM_LIMIT,
            recommend_limit: DEFAULT_RECOMMEND_LIMIT,
            prefer_highlights_first: false,
        }
    }
}

/// The merged, incrementally loadable feed: the social stream and the
/// personalized ranked stream, each paginated on its own cursor, composed
/// by the pure interleave step. Clients are injected handles; nothing here
/// reads process-global session state.
pub struct HybridFeed<C: ActivityStreamClient + 'static, R: RecommendationClient> {
    social: SocialFeedProvider<C>,
    recommendations: RecommendationSource<R>,
    ratio: usize,
    /// Set once the first page load has been issued; until then the feed
    /// reports itself loading so the UI shows a spinner, not an empty state.
    started: AtomicBool,
}

impl<C: ActivityStreamClient + 'static, R: RecommendationClient> HybridFeed<C, R> {
    pub fn new(stream_client: Arc<C>, recommend_client: Arc<R>, user_id: &str) -> Self {
        Self::with_options(
            stream_client,
            recommend_client,
            user_id,
            HybridFeedOptions::default(),
        )
    }

    pub fn with_options(
        stream_client: Arc<C>,
        recommend_client: Arc<R>,
        user_id: &str,
        options: HybridFeedOptions,
    ) -> Self {
        Self {
            social: SocialFeedProvider::with_limit(stream_client, user_id, options.stream_limit),
            recommendations: RecommendationSource::with_options(
                recommend_client,
                Some(user_id),
                options.recommend_limit,
                options.prefer_highlights_first,
            ),
            ratio: options.interleave_ratio,
            started: AtomicBool::new(false),
        }
    }

    /// The composed feed in render order: live items, then stream posts
    /// with non-live personalized items spliced in. Duplicate keys keep
    /// their first occurrence.
    pub fn feed(&self) -> Vec<HybridFeedItem> {
        let items = self.recommendations.items();
        let (live, non_live) = partition_live(&items);
        let stream = self.social.posts();
        let merged = interleave(&live, &non_live, &stream, self.ratio);

        let mut seen = HashSet::new();
        merged
            .into_iter()
            .filter(|item| seen.insert(item.key()))
            .collect()
    }

    /// Advance both sources, each only if it has more and is not already
    /// fetching. The two fetches are unordered and fail independently; a
    /// dead recommendation backend never blocks the social stream and vice
    /// versa.
    pub async fn fetch_next_page(&self) {
        self.started.store(true, Ordering::SeqCst);
        tokio::join!(
            self.social.fetch_next_page(),
            self.recommendations.fetch_next_page(),
        );
    }

    /// The feed is continuable while at least one source has more.
    pub fn has_next_page(&self) -> bool {
        self.social.has_next_page() || self.recommendations.has_next_page()
    }

    /// True while either source is still in flight.
    pub fn is_fetching_next_page(&self) -> bool {
        self.social.is_fetching_next_page() || self.recommendations.is_fetching_next_page()
    }

    /// True until the first content arrives from either source. Holds from
    /// construction on, before the first page load has even been issued.
    pub fn is_loading(&self) -> bool {
        self.social.posts().is_empty()
            && self.recommendations.items().is_empty()
            && (!self.started.load(Ordering::SeqCst) || self.is_fetching_next_page())
    }

    /// Pull-to-refresh: drop both sources' pages and cursors and load the
    /// first page again.
    pub async fn refresh(&self) {
        self.social.reset();
        self.recommendations.reset();
        self.fetch_next_page().await;
    }

    // Reaction/comment surface, re-exported from the social half.

    pub fn create_reaction_handlers(&self, post: &Post) -> ReactionHandlers<C> {
        self.social.create_reaction_handlers(post)
    }

    pub fn post_reactions(&self, post: &Post) -> ReactionCounts {
        self.social.ops().post_reactions(post)
    }

    pub fn post_comments(&self, post: &Post) -> Vec<Comment> {
        self.social.ops().post_comments(&post.id)
    }

    pub async fn load_post_comments(&self, post: &Post, force_reload: bool) {
        self.social.ops().load_comments(post, force_reload).await;
    }

    pub async fn add_post_comment(
        &self,
        post: &Post,
        text: &str,
        attachment: Option<MediaAttachment>,
    ) {
        self.social.ops().add_comment(post, text, attachment).await;
    }

    pub fn toggle_comments(&self, post_id: &str) {
        self.social.ops().toggle_comments(post_id);
    }

    pub fn comments_expanded(&self, post_id: &str) -> bool {
        self.social.ops().comments_expanded(post_id)
    }

    pub fn comments_loading(&self, post_id: &str) -> bool {
        self.social.ops().comments_loading(post_id)
    }
}
