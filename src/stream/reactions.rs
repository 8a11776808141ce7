// SPDX-License-Identifier: MPL-2.0

use crate::stream::client::{ActivityStreamClient, StreamError};
use crate::stream::types::{MediaAttachment, Reaction, ReactionKind, ReactionPage, ReactionPayload};
use std::sync::Arc;

/// Like/comment CRUD for a single activity, expressed over the injected
/// stream client. The feed layer goes through this adapter rather than
/// talking to the client directly.
pub struct ReactionStore<C: ActivityStreamClient> {
    client: Arc<C>,
}

impl<C: ActivityStreamClient> ReactionStore<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Create a like and return the stored record (its id is needed to
    /// delete the like later).
    pub async fn add_like(&self, activity_id: &str) -> Result<Reaction, StreamError> {
        self.client
            .add_reaction(activity_id, ReactionKind::Like, ReactionPayload::default())
            .await
    }

    pub async fn add_comment(
        &self,
        activity_id: &str,
        text: &str,
        attachment: Option<MediaAttachment>,
    ) -> Result<Reaction, StreamError> {
        let payload = ReactionPayload {
            text: Some(text.to_string()),
            attachment,
        };
        self.client
            .add_reaction(activity_id, ReactionKind::Comment, payload)
            .await
    }

    /// Delete any reaction by its record id.
    pub async fn remove(&self, reaction_id: &str) -> Result<(), StreamError> {
        self.client.remove_reaction(reaction_id).await
    }

    #[allow(dead_code)]
    pub async fn list_likes(&self, activity_id: &str) -> Result<ReactionPage, StreamError> {
        self.client
            .get_reactions(activity_id, ReactionKind::Like)
            .await
    }

    pub async fn list_comments(&self, activity_id: &str) -> Result<ReactionPage, StreamError> {
        self.client
            .get_reactions(activity_id, ReactionKind::Comment)
            .await
    }
}
