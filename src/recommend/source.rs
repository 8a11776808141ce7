// SPDX-License-Identifier: MPL-2.0

use crate::config::DEFAULT_RECOMMEND_LIMIT;
use crate::recommend::types::{PersonalizedItem, RankedItem, RecCursor};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

#[derive(thiserror::Error, Debug)]
pub enum RecommendError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Remote recommendation query. Rows come back pre-ranked; ranking itself
/// is not this crate's concern.
#[async_trait]
pub trait RecommendationClient: Send + Sync {
    /// `user_id = None` requests a generic, non-personalized page so the
    /// feed is never empty for brand-new users.
    async fn query_personalized_feed(
        &self,
        user_id: Option<&str>,
        cursor: Option<&RecCursor>,
        limit: usize,
        highlight_first: bool,
    ) -> Result<Vec<RankedItem>, RecommendError>;
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationPage {
    pub items: Vec<PersonalizedItem>,
    pub next_cursor: Option<RecCursor>,
}

#[derive(Default)]
struct RecState {
    items: Vec<PersonalizedItem>,
    cursor: Option<RecCursor>,
    exhausted: bool,
    fetching: bool,
}

/// Paginated ranked-item list. Stateless page fetches plus the cursor
/// state the orchestrator advances.
pub struct RecommendationSource<R: RecommendationClient> {
    client: Arc<R>,
    user_id: Option<String>,
    limit: usize,
    prefer_highlights_first: bool,
    state: Mutex<RecState>,
}

impl<R: RecommendationClient> RecommendationSource<R> {
    pub fn new(client: Arc<R>, user_id: Option<&str>) -> Self {
        Self::with_options(client, user_id, DEFAULT_RECOMMEND_LIMIT, false)
    }

    pub fn with_options(
        client: Arc<R>,
        user_id: Option<&str>,
        limit: usize,
        prefer_highlights_first: bool,
    ) -> Self {
        Self {
            client,
            user_id: user_id.map(str::to_string),
            limit,
            prefer_highlights_first,
            state: Mutex::new(RecState::default()),
        }
    }

    /// One page of ranked items. The continuation cursor is derived
    /// strictly from the last returned row; an empty page yields no cursor
    /// and a short, non-empty page still continues.
    pub async fn fetch_recommendation_page(
        &self,
        cursor: Option<&RecCursor>,
    ) -> Result<RecommendationPage, RecommendError> {
        let rows = self
            .client
            .query_personalized_feed(
                self.user_id.as_deref(),
                cursor,
                self.limit,
                self.prefer_highlights_first,
            )
            .await?;

        let next_cursor = rows.last().map(|row| RecCursor {
            rank: row.rank,
            item_type: row.item.kind(),
            item_id: row.item.id().to_string(),
        });

        Ok(RecommendationPage {
            items: rows.into_iter().map(|row| row.item).collect(),
            next_cursor,
        })
    }

    pub fn items(&self) -> Vec<PersonalizedItem> {
        self.state.lock().unwrap().items.clone()
    }

    pub fn has_next_page(&self) -> bool {
        !self.state.lock().unwrap().exhausted
    }

    pub fn is_fetching_next_page(&self) -> bool {
        self.state.lock().unwrap().fetching
    }

    /// Fetch and append the next page. No-op while a fetch is in flight or
    /// the source is exhausted. A failed fetch exhausts this source only;
    /// the caller's other sources are unaffected.
    pub async fn fetch_next_page(&self) {
        let cursor = {
            let mut state = self.state.lock().unwrap();
            if state.fetching || state.exhausted {
                return;
            }
            state.fetching = true;
            state.cursor.clone()
        };

        let result = self.fetch_recommendation_page(cursor.as_ref()).await;

        let mut state = self.state.lock().unwrap();
        state.fetching = false;
        match result {
            Ok(page) => {
                state.items.extend(page.items);
                state.exhausted = page.next_cursor.is_none();
                state.cursor = page.next_cursor;
                debug!(
                    items = state.items.len(),
                    exhausted = state.exhausted,
                    "recommendation page applied"
                );
            }
            Err(e) => {
                warn!(error = %e, "recommendation fetch failed; marking source exhausted");
                state.exhausted = true;
            }
        }
    }

    /// Drop all items and cursor state for a pull-to-refresh.
    pub fn reset(&self) {
        *self.state.lock().unwrap() = RecState::default();
    }
}
