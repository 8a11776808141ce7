// SPDX-License-Identifier: MPL-2.0

//! Per-post reaction and comment state.
//!
//! All mutable feed state lives here: reaction counts, comment caches, and
//! the expanded/loading flags the UI renders from. Mutations apply
//! optimistically and finish their remote write afterwards; failures are
//! logged and local state is not reverted. In-flight guards are membership
//! sets owned by this struct, deliberately outside any reactive state, so a
//! late-resolving callback can never observe a stale snapshot of them.

use crate::feed::types::{Comment, Post, ReactionCounts};
use crate::runtime;
use crate::stream::{ActivityStreamClient, MediaAttachment, ReactionKind, ReactionStore, Viewer};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    LikeAdd,
    LikeRemove,
    CommentAdd,
}

/// An accepted like toggle: the optimistic flip has been applied and the
/// matching remote write still has to run.
#[derive(Debug)]
pub struct LikeToggle {
    post_id: String,
    kind: MutationKind,
    /// Record id to delete when this is an unlike.
    like_id: Option<String>,
}

/// An accepted comment add, pending its remote write.
#[derive(Debug)]
pub struct PendingComment {
    post_id: String,
    local_id: String,
    text: String,
    attachment: Option<MediaAttachment>,
}

#[derive(Default)]
struct ViewerSlot {
    fetched: bool,
    viewer: Option<Viewer>,
}

pub struct FeedOps<C: ActivityStreamClient> {
    client: Arc<C>,
    store: ReactionStore<C>,
    viewer: Mutex<ViewerSlot>,
    counts: Mutex<HashMap<String, ReactionCounts>>,
    comments: Mutex<HashMap<String, Vec<Comment>>>,
    /// Posts whose comment list has been fetched at least once.
    comments_loaded: Mutex<HashSet<String>>,
    /// Comment loads currently in flight.
    comments_loading: Mutex<HashSet<String>>,
    expanded: Mutex<HashSet<String>>,
    /// At most one mutation of a given kind per post may be in flight.
    pending: Mutex<HashSet<(String, MutationKind)>>,
    /// Record id of the viewer's like per post, needed for unlike.
    like_ids: Mutex<HashMap<String, String>>,
    /// Monotonic suffix for optimistic comment ids. A stale placeholder
    /// from a failed write keeps its id, so timestamps are not unique
    /// enough to address the right one.
    local_seq: AtomicU64,
}

impl<C: ActivityStreamClient> FeedOps<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            store: ReactionStore::new(Arc::clone(&client)),
            client,
            viewer: Mutex::new(ViewerSlot::default()),
            counts: Mutex::new(HashMap::new()),
            comments: Mutex::new(HashMap::new()),
            comments_loaded: Mutex::new(HashSet::new()),
            comments_loading: Mutex::new(HashSet::new()),
            expanded: Mutex::new(HashSet::new()),
            pending: Mutex::new(HashSet::new()),
            like_ids: Mutex::new(HashMap::new()),
            local_seq: AtomicU64::new(0),
        }
    }

    /// Fetch the viewer identity once; later calls are no-ops.
    pub async fn ensure_viewer(&self) {
        {
            let slot = self.viewer.lock().unwrap();
            if slot.fetched {
                return;
            }
        }
        let viewer = self.client.current_user().await;
        let mut slot = self.viewer.lock().unwrap();
        slot.fetched = true;
        slot.viewer = viewer;
    }

    /// Register a freshly fetched post. Counts are only seeded once; a
    /// re-delivered post never clobbers counts the viewer has mutated.
    pub fn seed_post(&self, post: &Post) {
        self.counts
            .lock()
            .unwrap()
            .entry(post.id.clone())
            .or_insert_with(|| post.counts.clone());
        if let Some(like_id) = &post.viewer_like_id {
            self.like_ids
                .lock()
                .unwrap()
                .entry(post.id.clone())
                .or_insert_with(|| like_id.clone());
        }
    }

    pub fn post_reactions(&self, post: &Post) -> ReactionCounts {
        self.counts
            .lock()
            .unwrap()
            .get(&post.id)
            .cloned()
            .unwrap_or_else(|| post.counts.clone())
    }

    pub fn post_comments(&self, post_id: &str) -> Vec<Comment> {
        self.comments
            .lock()
            .unwrap()
            .get(post_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn comments_expanded(&self, post_id: &str) -> bool {
        self.expanded.lock().unwrap().contains(post_id)
    }

    pub fn comments_loading(&self, post_id: &str) -> bool {
        self.comments_loading.lock().unwrap().contains(post_id)
    }

    /// Flip the expanded flag. No network effect by itself.
    pub fn toggle_comments(&self, post_id: &str) {
        let mut expanded = self.expanded.lock().unwrap();
        if !expanded.remove(post_id) {
            expanded.insert(post_id.to_string());
        }
    }

    /// Fetch the comment list for a post. No-op while a load for the same
    /// post is in flight, or when already loaded and `force_reload` is off.
    /// On success the cached list is replaced wholesale; on failure it is
    /// set to empty so the UI never spins forever, and the post stays
    /// unloaded so the next expand retries.
    pub async fn load_comments(&self, post: &Post, force_reload: bool) {
        {
            let mut loading = self.comments_loading.lock().unwrap();
            if loading.contains(&post.id) {
                return;
            }
            if !force_reload && self.comments_loaded.lock().unwrap().contains(&post.id) {
                return;
            }
            loading.insert(post.id.clone());
        }

        match self.store.list_comments(&post.id).await {
            Ok(page) => {
                let list: Vec<Comment> = page
                    .reactions
                    .iter()
                    .filter(|r| r.kind == ReactionKind::Comment)
                    .map(Comment::from_reaction)
                    .collect();
                self.comments.lock().unwrap().insert(post.id.clone(), list);
                self.comments_loaded
                    .lock()
                    .unwrap()
                    .insert(post.id.clone());
            }
            Err(e) => {
                warn!(post_id = %post.id, error = %e, "comment load failed");
                self.comments
                    .lock()
                    .unwrap()
                    .insert(post.id.clone(), Vec::new());
            }
        }

        self.comments_loading.lock().unwrap().remove(&post.id);
    }

    /// Accept a like toggle and apply it optimistically, or reject it when
    /// a like mutation for this post is still unresolved. The returned
    /// handle must be passed to [`finish_like_toggle`](Self::finish_like_toggle).
    pub fn begin_like_toggle(&self, post: &Post) -> Option<LikeToggle> {
        let mut pending = self.pending.lock().unwrap();
        let add_key = (post.id.clone(), MutationKind::LikeAdd);
        let remove_key = (post.id.clone(), MutationKind::LikeRemove);
        // A second toggle while the first is unresolved would double-count.
        if pending.contains(&add_key) || pending.contains(&remove_key) {
            return None;
        }

        let mut counts = self.counts.lock().unwrap();
        let entry = counts
            .entry(post.id.clone())
            .or_insert_with(|| post.counts.clone());

        let kind = if entry.viewer_has_liked {
            entry.viewer_has_liked = false;
            entry.like_count = entry.like_count.saturating_sub(1);
            MutationKind::LikeRemove
        } else {
            entry.viewer_has_liked = true;
            entry.like_count += 1;
            MutationKind::LikeAdd
        };
        pending.insert((post.id.clone(), kind));

        let like_id = match kind {
            MutationKind::LikeRemove => self.like_ids.lock().unwrap().remove(&post.id),
            _ => None,
        };

        Some(LikeToggle {
            post_id: post.id.clone(),
            kind,
            like_id,
        })
    }

    /// Run the remote write for an accepted toggle. Failures are logged;
    /// the optimistic state stands either way.
    pub async fn finish_like_toggle(&self, toggle: LikeToggle) {
        match toggle.kind {
            MutationKind::LikeAdd => match self.store.add_like(&toggle.post_id).await {
                Ok(reaction) => {
                    self.like_ids
                        .lock()
                        .unwrap()
                        .insert(toggle.post_id.clone(), reaction.id);
                }
                Err(e) => warn!(post_id = %toggle.post_id, error = %e, "like failed"),
            },
            MutationKind::LikeRemove => match toggle.like_id {
                Some(like_id) => {
                    if let Err(e) = self.store.remove(&like_id).await {
                        warn!(post_id = %toggle.post_id, error = %e, "unlike failed");
                    }
                }
                None => {
                    warn!(post_id = %toggle.post_id, "unlike skipped: no like record id")
                }
            },
            MutationKind::CommentAdd => unreachable!("comment adds use finish_add_comment"),
        }

        self.pending
            .lock()
            .unwrap()
            .remove(&(toggle.post_id, toggle.kind));
    }

    pub async fn toggle_like(&self, post: &Post) {
        if let Some(toggle) = self.begin_like_toggle(post) {
            self.finish_like_toggle(toggle).await;
        }
    }

    /// Append the comment locally and bump the cached count, or reject when
    /// a comment add for this post is still unresolved.
    pub fn begin_add_comment(
        &self,
        post: &Post,
        text: &str,
        attachment: Option<MediaAttachment>,
    ) -> Option<PendingComment> {
        let key = (post.id.clone(), MutationKind::CommentAdd);
        {
            let mut pending = self.pending.lock().unwrap();
            if pending.contains(&key) {
                return None;
            }
            pending.insert(key);
        }

        let local_id = format!(
            "local-{}-{}",
            post.id,
            self.local_seq.fetch_add(1, Ordering::Relaxed)
        );
        let viewer = self.viewer.lock().unwrap().viewer.clone();
        let comment = Comment::local(local_id.clone(), viewer.as_ref(), text, attachment.clone());

        self.comments
            .lock()
            .unwrap()
            .entry(post.id.clone())
            .or_default()
            .push(comment);
        self.counts
            .lock()
            .unwrap()
            .entry(post.id.clone())
            .or_insert_with(|| post.counts.clone())
            .comment_count += 1;

        Some(PendingComment {
            post_id: post.id.clone(),
            local_id,
            text: text.to_string(),
            attachment,
        })
    }

    /// Run the remote write for an accepted comment. On success the local
    /// placeholder is swapped for the stored record; on failure it stays
    /// (no rollback) and the failure is logged.
    pub async fn finish_add_comment(&self, pending: PendingComment) {
        match self
            .store
            .add_comment(&pending.post_id, &pending.text, pending.attachment.clone())
            .await
        {
            Ok(reaction) => {
                let mut comments = self.comments.lock().unwrap();
                if let Some(list) = comments.get_mut(&pending.post_id)
                    && let Some(slot) = list.iter_mut().find(|c| c.id == pending.local_id)
                {
                    *slot = Comment::from_reaction(&reaction);
                }
            }
            Err(e) => {
                warn!(post_id = %pending.post_id, error = %e, "comment write failed")
            }
        }

        self.pending
            .lock()
            .unwrap()
            .remove(&(pending.post_id, MutationKind::CommentAdd));
    }

    pub async fn add_comment(
        &self,
        post: &Post,
        text: &str,
        attachment: Option<MediaAttachment>,
    ) {
        if let Some(pending) = self.begin_add_comment(post, text, attachment) {
            self.finish_add_comment(pending).await;
        }
    }

    /// Count-only: no collaborator exposes a remote share endpoint.
    pub fn share(&self, post: &Post) {
        self.counts
            .lock()
            .unwrap()
            .entry(post.id.clone())
            .or_insert_with(|| post.counts.clone())
            .share_count += 1;
    }

    /// Discard all per-post state (pull-to-refresh or teardown).
    pub fn reset(&self) {
        self.counts.lock().unwrap().clear();
        self.comments.lock().unwrap().clear();
        self.comments_loaded.lock().unwrap().clear();
        self.comments_loading.lock().unwrap().clear();
        self.expanded.lock().unwrap().clear();
        self.pending.lock().unwrap().clear();
        self.like_ids.lock().unwrap().clear();
    }
}

/// Bound handler triple for one post, ready to hand to row widgets. The
/// synchronous methods apply the optimistic step inline and push the remote
/// write onto the background write executor.
pub struct ReactionHandlers<C: ActivityStreamClient + 'static> {
    ops: Arc<FeedOps<C>>,
    post: Post,
}

impl<C: ActivityStreamClient + 'static> ReactionHandlers<C> {
    pub fn new(ops: Arc<FeedOps<C>>, post: Post) -> Self {
        Self { ops, post }
    }

    pub fn like_toggle(&self) {
        if let Some(toggle) = self.ops.begin_like_toggle(&self.post) {
            let ops = Arc::clone(&self.ops);
            runtime::spawn(async move { ops.finish_like_toggle(toggle).await });
        }
    }

    pub fn comment_toggle(&self) {
        self.ops.toggle_comments(&self.post.id);
    }

    pub fn share(&self) {
        self.ops.share(&self.post);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{
        ActivityPage, Reaction, ReactionPage, ReactionPayload, StreamError, Viewer,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockClient {
        get_reaction_calls: AtomicUsize,
        add_reaction_calls: AtomicUsize,
        removed: Mutex<Vec<String>>,
        comments: Mutex<Vec<Reaction>>,
        fail_writes: AtomicBool,
        fail_reads: bool,
        /// When true, reads yield once before resolving so a second caller
        /// can observe the in-flight guard.
        slow_reads: bool,
    }

    fn comment_reaction(id: &str, text: &str) -> Reaction {
        Reaction {
            id: id.into(),
            kind: ReactionKind::Comment,
            activity_id: "p1".into(),
            user_id: "u2".into(),
            user_name: Some("Sam".into()),
            user_avatar: None,
            payload: ReactionPayload {
                text: Some(text.into()),
                attachment: None,
            },
            created_at: None,
        }
    }

    #[async_trait]
    impl ActivityStreamClient for MockClient {
        async fn get_activities(
            &self,
            _user_id: &str,
            _cursor: Option<&str>,
            _limit: usize,
        ) -> Result<ActivityPage, StreamError> {
            unimplemented!()
        }

        async fn get_reactions(
            &self,
            _activity_id: &str,
            _kind: ReactionKind,
        ) -> Result<ReactionPage, StreamError> {
            self.get_reaction_calls.fetch_add(1, Ordering::SeqCst);
            if self.slow_reads {
                tokio::task::yield_now().await;
            }
            if self.fail_reads {
                return Err(StreamError::Network("boom".into()));
            }
            Ok(ReactionPage {
                reactions: self.comments.lock().unwrap().clone(),
                next_cursor: None,
            })
        }

        async fn add_reaction(
            &self,
            activity_id: &str,
            kind: ReactionKind,
            payload: ReactionPayload,
        ) -> Result<Reaction, StreamError> {
            self.add_reaction_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StreamError::Network("boom".into()));
            }
            Ok(Reaction {
                id: format!("r-{}", self.add_reaction_calls.load(Ordering::SeqCst)),
                kind,
                activity_id: activity_id.into(),
                user_id: "viewer".into(),
                user_name: Some("Viewer".into()),
                user_avatar: None,
                payload,
                created_at: None,
            })
        }

        async fn remove_reaction(&self, reaction_id: &str) -> Result<(), StreamError> {
            self.removed.lock().unwrap().push(reaction_id.into());
            Ok(())
        }

        async fn current_user(&self) -> Option<Viewer> {
            Some(Viewer {
                id: "viewer".into(),
                display_name: "Viewer".into(),
                avatar: None,
            })
        }
    }

    fn post(id: &str) -> Post {
        Post {
            id: id.into(),
            author_id: "u1".into(),
            author_display_name: "Author".into(),
            author_avatar: None,
            content: Default::default(),
            tags: Vec::new(),
            created_at: None,
            kind: crate::feed::types::PostKind::Plain,
            counts: ReactionCounts {
                like_count: 3,
                comment_count: 1,
                share_count: 0,
                viewer_has_liked: false,
            },
            viewer_like_id: None,
        }
    }

    #[tokio::test]
    async fn rapid_double_like_toggle_counts_once() {
        let client = Arc::new(MockClient::default());
        let ops = FeedOps::new(Arc::clone(&client));
        let p = post("p1");
        ops.seed_post(&p);

        let first = ops.begin_like_toggle(&p);
        assert!(first.is_some());
        // Second toggle while the first is unresolved is rejected.
        assert!(ops.begin_like_toggle(&p).is_none());

        let counts = ops.post_reactions(&p);
        assert_eq!(counts.like_count, 4);
        assert!(counts.viewer_has_liked);

        ops.finish_like_toggle(first.unwrap()).await;
        assert_eq!(client.add_reaction_calls.load(Ordering::SeqCst), 1);

        // Once resolved, the opposite toggle goes through.
        assert!(ops.begin_like_toggle(&p).is_some());
        assert_eq!(ops.post_reactions(&p).like_count, 3);
    }

    #[tokio::test]
    async fn unlike_removes_the_recorded_like() {
        let client = Arc::new(MockClient::default());
        let ops = FeedOps::new(Arc::clone(&client));
        let mut p = post("p1");
        p.counts.viewer_has_liked = true;
        p.viewer_like_id = Some("like-9".into());
        ops.seed_post(&p);

        ops.toggle_like(&p).await;

        let counts = ops.post_reactions(&p);
        assert!(!counts.viewer_has_liked);
        assert_eq!(counts.like_count, 2);
        assert_eq!(client.removed.lock().unwrap().as_slice(), ["like-9"]);
    }

    #[tokio::test]
    async fn like_failure_keeps_optimistic_state() {
        let client = Arc::new(MockClient {
            fail_writes: AtomicBool::new(true),
            ..Default::default()
        });
        let ops = FeedOps::new(Arc::clone(&client));
        let p = post("p1");
        ops.seed_post(&p);

        ops.toggle_like(&p).await;

        // No rollback: the optimistic flip stands after the failed write.
        let counts = ops.post_reactions(&p);
        assert!(counts.viewer_has_liked);
        assert_eq!(counts.like_count, 4);
    }

    #[tokio::test]
    async fn concurrent_comment_loads_fetch_once() {
        let client = Arc::new(MockClient {
            slow_reads: true,
            ..Default::default()
        });
        client
            .comments
            .lock()
            .unwrap()
            .push(comment_reaction("c1", "nice"));
        let ops = FeedOps::new(Arc::clone(&client));
        let p = post("p1");

        tokio::join!(ops.load_comments(&p, false), ops.load_comments(&p, false));

        assert_eq!(client.get_reaction_calls.load(Ordering::SeqCst), 1);
        assert_eq!(ops.post_comments("p1").len(), 1);
        assert!(!ops.comments_loading("p1"));
    }

    #[tokio::test]
    async fn loaded_comments_are_cached_until_forced() {
        let client = Arc::new(MockClient::default());
        client
            .comments
            .lock()
            .unwrap()
            .push(comment_reaction("c1", "first"));
        let ops = FeedOps::new(Arc::clone(&client));
        let p = post("p1");

        ops.load_comments(&p, false).await;
        ops.load_comments(&p, false).await;
        assert_eq!(client.get_reaction_calls.load(Ordering::SeqCst), 1);

        ops.load_comments(&p, true).await;
        assert_eq!(client.get_reaction_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_comment_load_leaves_empty_list_not_stuck() {
        let client = Arc::new(MockClient {
            fail_reads: true,
            ..Default::default()
        });
        let ops = FeedOps::new(Arc::clone(&client));
        let p = post("p1");

        ops.load_comments(&p, false).await;

        assert!(ops.post_comments("p1").is_empty());
        assert!(!ops.comments_loading("p1"));
        // The failure did not mark the list loaded, so a retry refetches.
        ops.load_comments(&p, false).await;
        assert_eq!(client.get_reaction_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn add_comment_is_optimistic_and_bumps_count() {
        let client = Arc::new(MockClient::default());
        let ops = FeedOps::new(Arc::clone(&client));
        let p = post("p1");
        ops.seed_post(&p);
        ops.ensure_viewer().await;

        let pending = ops.begin_add_comment(&p, "let's go", None).unwrap();
        // Visible immediately, before the remote write resolves.
        let local = ops.post_comments("p1");
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].author_name, "Viewer");
        assert_eq!(ops.post_reactions(&p).comment_count, 2);

        ops.finish_add_comment(pending).await;
        // The placeholder was swapped for the stored record.
        let confirmed = ops.post_comments("p1");
        assert_eq!(confirmed.len(), 1);
        assert!(confirmed[0].id.starts_with("r-"));
    }

    #[tokio::test]
    async fn failed_comment_write_keeps_local_comment() {
        let client = Arc::new(MockClient {
            fail_writes: AtomicBool::new(true),
            ..Default::default()
        });
        let ops = FeedOps::new(Arc::clone(&client));
        let p = post("p1");

        ops.add_comment(&p, "hello", None).await;

        assert_eq!(ops.post_comments("p1").len(), 1);
        assert_eq!(ops.post_reactions(&p).comment_count, 2);
    }

    #[tokio::test]
    async fn stale_placeholder_never_steals_a_confirmed_swap() {
        // A failed write leaves its placeholder behind; the next comment
        // must get a distinct local id so confirmation targets it alone.
        let client = Arc::new(MockClient {
            fail_writes: AtomicBool::new(true),
            ..Default::default()
        });
        let ops = FeedOps::new(Arc::clone(&client));
        let p = post("p1");

        ops.add_comment(&p, "first", None).await;
        client.fail_writes.store(false, Ordering::SeqCst);
        ops.add_comment(&p, "second", None).await;

        let list = ops.post_comments("p1");
        assert_eq!(list.len(), 2);
        assert_ne!(list[0].id, list[1].id);
        // The failed first comment keeps its placeholder; only the second
        // was swapped for the stored record.
        assert!(list[0].id.starts_with("local-"));
        assert!(list[1].id.starts_with("r-"));
        assert_eq!(list[1].text.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn toggle_comments_flips_expanded_flag() {
        let client = Arc::new(MockClient::default());
        let ops = FeedOps::new(client);

        assert!(!ops.comments_expanded("p1"));
        ops.toggle_comments("p1");
        assert!(ops.comments_expanded("p1"));
        ops.toggle_comments("p1");
        assert!(!ops.comments_expanded("p1"));
    }

    #[tokio::test]
    async fn handlers_bind_one_post_and_apply_optimistically() {
        let client = Arc::new(MockClient::default());
        let ops = Arc::new(FeedOps::new(client));
        let p = post("p1");
        ops.seed_post(&p);

        let handlers = ReactionHandlers::new(Arc::clone(&ops), p.clone());

        handlers.comment_toggle();
        assert!(ops.comments_expanded("p1"));

        handlers.share();
        assert_eq!(ops.post_reactions(&p).share_count, 1);

        // The optimistic flip lands before the background write resolves.
        handlers.like_toggle();
        let counts = ops.post_reactions(&p);
        assert!(counts.viewer_has_liked);
        assert_eq!(counts.like_count, 4);
    }

    #[tokio::test]
    async fn share_bumps_count_locally() {
        let client = Arc::new(MockClient::default());
        let ops = FeedOps::new(client);
        let p = post("p1");

        ops.share(&p);
        ops.share(&p);
        assert_eq!(ops.post_reactions(&p).share_count, 2);
    }
}
