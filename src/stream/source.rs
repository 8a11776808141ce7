// SPDX-License-Identifier: MPL-2.0

use crate::config::MAX_STREAM_LIMIT;
use crate::stream::client::{ActivityStreamClient, StreamError};
use crate::stream::types::{ActivityPage, RawActivity};
use std::sync::Arc;
use tracing::warn;

/// Fetches timeline pages and drops structurally broken entries before they
/// reach normalization. Transport errors propagate to the caller unwrapped;
/// retry-vs-surface is the caller's decision.
pub struct ActivityStreamSource<C: ActivityStreamClient> {
    client: Arc<C>,
}

impl<C: ActivityStreamClient> ActivityStreamSource<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    pub async fn fetch_activity_page(
        &self,
        user_id: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<ActivityPage, StreamError> {
        let limit = limit.clamp(1, MAX_STREAM_LIMIT);
        let page = self.client.get_activities(user_id, cursor, limit).await?;

        let mut activities = Vec::with_capacity(page.activities.len());
        for activity in page.activities {
            if Self::is_well_formed(&activity) {
                activities.push(activity);
            } else {
                warn!(activity_id = %activity.id, "dropping malformed activity");
            }
        }

        Ok(ActivityPage {
            activities,
            next_cursor: page.next_cursor,
            has_more: page.has_more,
        })
    }

    /// An activity without an id, author, or content cannot be rendered.
    fn is_well_formed(activity: &RawActivity) -> bool {
        !activity.id.is_empty() && activity.actor.is_some() && activity.object.is_some()
    }
}
