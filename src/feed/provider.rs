// SPDX-License-Identifier: MPL-2.0

use crate::config::DEFAULT_STREAM_LIMIT;
use crate::feed::normalize::normalize;
use crate::feed::ops::{FeedOps, ReactionHandlers};
use crate::feed::types::Post;
use crate::stream::{ActivityStreamClient, ActivityStreamSource};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

#[derive(Debug)]
struct ProviderState {
    posts: Vec<Post>,
    cursor: Option<String>,
    has_more: bool,
    fetching: bool,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            cursor: None,
            has_more: true,
            fetching: false,
        }
    }
}

/// Paginated post list over the activity stream, with reaction and comment
/// state owned by [`FeedOps`].
pub struct SocialFeedProvider<C: ActivityStreamClient> {
    source: ActivityStreamSource<C>,
    ops: Arc<FeedOps<C>>,
    user_id: String,
    limit: usize,
    state: Mutex<ProviderState>,
}

impl<C: ActivityStreamClient + 'static> SocialFeedProvider<C> {
    pub fn new(client: Arc<C>, user_id: &str) -> Self {
        Self::with_limit(client, user_id, DEFAULT_STREAM_LIMIT)
    }

    pub fn with_limit(client: Arc<C>, user_id: &str, limit: usize) -> Self {
        Self {
            source: ActivityStreamSource::new(Arc::clone(&client)),
            ops: Arc::new(FeedOps::new(client)),
            user_id: user_id.to_string(),
            limit,
            state: Mutex::new(ProviderState::default()),
        }
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state.lock().unwrap().posts.clone()
    }

    pub fn has_next_page(&self) -> bool {
        self.state.lock().unwrap().has_more
    }

    pub fn is_fetching_next_page(&self) -> bool {
        self.state.lock().unwrap().fetching
    }

    pub fn ops(&self) -> &Arc<FeedOps<C>> {
        &self.ops
    }

    pub fn create_reaction_handlers(&self, post: &Post) -> ReactionHandlers<C> {
        ReactionHandlers::new(Arc::clone(&self.ops), post.clone())
    }

    /// Fetch and append the next page. No-op while a fetch for the current
    /// cursor is in flight or the stream is exhausted. A transport failure
    /// marks this source exhausted and is surfaced only as a warning.
    pub async fn fetch_next_page(&self) {
        let cursor = {
            let mut state = self.state.lock().unwrap();
            if state.fetching || !state.has_more {
                return;
            }
            state.fetching = true;
            state.cursor.clone()
        };

        self.ops.ensure_viewer().await;

        let result = self
            .source
            .fetch_activity_page(&self.user_id, cursor.as_deref(), self.limit)
            .await;

        let mut state = self.state.lock().unwrap();
        state.fetching = false;
        match result {
            Ok(page) => {
                for raw in &page.activities {
                    let post = normalize(raw);
                    self.ops.seed_post(&post);
                    state.posts.push(post);
                }
                state.has_more = page.has_more && page.next_cursor.is_some();
                state.cursor = page.next_cursor;
                debug!(
                    posts = state.posts.len(),
                    has_more = state.has_more,
                    "stream page applied"
                );
            }
            Err(e) => {
                warn!(error = %e, "stream page fetch failed; marking stream exhausted");
                state.has_more = false;
            }
        }
    }

    /// Drop all pages and state for a pull-to-refresh.
    pub fn reset(&self) {
        *self.state.lock().unwrap() = ProviderState::default();
        self.ops.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{
        ActivityPage, RawActivity, RawActor, Reaction, ReactionKind, ReactionPage,
        ReactionPayload, StreamError, Viewer,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct PagedClient {
        pages: Mutex<Vec<ActivityPage>>,
        calls: AtomicUsize,
        fail: bool,
        /// When true, fetches yield once before resolving so a second
        /// caller can observe the in-flight guard.
        slow: bool,
    }

    fn activity(id: &str) -> RawActivity {
        RawActivity {
            id: id.into(),
            actor: Some(RawActor {
                id: "u1".into(),
                data: None,
            }),
            object: Some(serde_json::json!("text")),
            ..Default::default()
        }
    }

    #[async_trait]
    impl ActivityStreamClient for PagedClient {
        async fn get_activities(
            &self,
            _user_id: &str,
            _cursor: Option<&str>,
            _limit: usize,
        ) -> Result<ActivityPage, StreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.slow {
                tokio::task::yield_now().await;
            }
            if self.fail {
                return Err(StreamError::Network("down".into()));
            }
            let mut pages = self.pages.lock().unwrap();
            if pages.is_empty() {
                Ok(ActivityPage::default())
            } else {
                Ok(pages.remove(0))
            }
        }

        async fn get_reactions(
            &self,
            _activity_id: &str,
            _kind: ReactionKind,
        ) -> Result<ReactionPage, StreamError> {
            Ok(ReactionPage::default())
        }

        async fn add_reaction(
            &self,
            _activity_id: &str,
            _kind: ReactionKind,
            _payload: ReactionPayload,
        ) -> Result<Reaction, StreamError> {
            Err(StreamError::Network("unused".into()))
        }

        async fn remove_reaction(&self, _reaction_id: &str) -> Result<(), StreamError> {
            Ok(())
        }

        async fn current_user(&self) -> Option<Viewer> {
            None
        }
    }

    #[tokio::test]
    async fn pages_append_in_cursor_order() {
        let client = Arc::new(PagedClient {
            pages: Mutex::new(vec![
                ActivityPage {
                    activities: vec![activity("a1"), activity("a2")],
                    next_cursor: Some("a2".into()),
                    has_more: true,
                },
                ActivityPage {
                    activities: vec![activity("a3")],
                    next_cursor: None,
                    has_more: false,
                },
            ]),
            ..Default::default()
        });
        let provider = SocialFeedProvider::new(Arc::clone(&client), "u1");

        provider.fetch_next_page().await;
        assert!(provider.has_next_page());
        provider.fetch_next_page().await;

        let ids: Vec<String> = provider.posts().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, ["a1", "a2", "a3"]);
        assert!(!provider.has_next_page());

        // Exhausted: no further network call happens.
        provider.fetch_next_page().await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_fetches_issue_one_request() {
        let client = Arc::new(PagedClient {
            pages: Mutex::new(vec![stream_page_one()]),
            slow: true,
            ..Default::default()
        });
        let provider = SocialFeedProvider::new(Arc::clone(&client), "u1");

        tokio::join!(provider.fetch_next_page(), provider.fetch_next_page());

        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.posts().len(), 1);
        assert!(!provider.is_fetching_next_page());
    }

    fn stream_page_one() -> ActivityPage {
        ActivityPage {
            activities: vec![activity("a1")],
            next_cursor: Some("a1".into()),
            has_more: true,
        }
    }

    #[tokio::test]
    async fn fetch_failure_marks_stream_exhausted() {
        let client = Arc::new(PagedClient {
            fail: true,
            ..Default::default()
        });
        let provider = SocialFeedProvider::new(client, "u1");

        provider.fetch_next_page().await;
        assert!(provider.posts().is_empty());
        assert!(!provider.has_next_page());
        assert!(!provider.is_fetching_next_page());
    }

    #[tokio::test]
    async fn reset_clears_posts_and_cursor() {
        let client = Arc::new(PagedClient {
            pages: Mutex::new(vec![ActivityPage {
                activities: vec![activity("a1")],
                next_cursor: None,
                has_more: false,
            }]),
            ..Default::default()
        });
        let provider = SocialFeedProvider::new(client, "u1");

        provider.fetch_next_page().await;
        assert_eq!(provider.posts().len(), 1);

        provider.reset();
        assert!(provider.posts().is_empty());
        assert!(provider.has_next_page());
    }
}
