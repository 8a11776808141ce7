// SPDX-License-Identifier: MPL-2.0

use crate::stream::types::{ActivityPage, Reaction, ReactionKind, ReactionPage, ReactionPayload, Viewer};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("not authenticated")]
    NotAuthenticated,
}

/// Remote activity-stream client. The feed layer receives an implementation
/// as an injected handle; it never reaches for a process-wide session.
#[async_trait]
pub trait ActivityStreamClient: Send + Sync {
    /// Fetch a page of the user's timeline. `cursor` is the id of the last
    /// activity seen on the previous page, or `None` for the first page.
    async fn get_activities(
        &self,
        user_id: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<ActivityPage, StreamError>;

    /// List reactions of one kind attached to an activity.
    async fn get_reactions(
        &self,
        activity_id: &str,
        kind: ReactionKind,
    ) -> Result<ReactionPage, StreamError>;

    /// Create a reaction and return the stored record.
    async fn add_reaction(
        &self,
        activity_id: &str,
        kind: ReactionKind,
        payload: ReactionPayload,
    ) -> Result<Reaction, StreamError>;

    /// Delete a reaction by its record id.
    async fn remove_reaction(&self, reaction_id: &str) -> Result<(), StreamError>;

    /// The authenticated viewer, or `None` when the session is anonymous.
    async fn current_user(&self) -> Option<Viewer>;
}
