//! # Cascade Handler
//!
//! Ordered cleanup when a post or comment goes away. Posts hard-delete
//! and take their whole comment tree and image blobs with them; comments
//! soft-delete so replies keep a resolvable parent.
//!
//! The steps are sequential single-document writes with no rollback. A
//! failure mid-cascade leaves a documented partial state (e.g., the post
//! dropped from ownership lists but still persisted); re-running the same
//! cascade is safe because reference removal is idempotent and counts are
//! derived on read.

use uuid::Uuid;

use cb_core::error::{AppError, Result};

use crate::reference::{set_reference, RefMode};
use crate::{ensure_author, images, ForumService};

impl ForumService {
    /// Hard-deletes the actor's own post.
    ///
    /// Order: resolve topic (a dangling topic reference aborts the whole
    /// deletion rather than silently orphaning), drop the id from the
    /// author's and the topic's `posts` lists, delete the image blobs
    /// embedded in the post and in its comments, hard-delete the comment
    /// tree, then the post itself.
    ///
    /// Bookmark lists of other users are deliberately not swept; their
    /// SavedPost records remain resolvable-to-nothing, a known gap carried
    /// from the source system.
    pub async fn delete_post(&self, actor: Uuid, id: Uuid) -> Result<()> {
        let post = self
            .content()
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::not_found("post", id))?;
        ensure_author(post.author, actor, "post")?;

        let mut topic = self
            .content()
            .get_topic(post.topic)
            .await?
            .ok_or_else(|| AppError::not_found("topic", post.topic))?;
        let mut user = self.require_user(post.author).await?;

        set_reference(&mut user.posts, RefMode::Remove, post.id);
        self.content().save_user(&user).await?;

        set_reference(&mut topic.posts, RefMode::Remove, post.id);
        self.content().save_topic(&topic).await?;

        // Images are never shared across documents; delete unconditionally.
        images::delete_refs(self.images(), &post.content, |_| true).await?;

        // The comment tree goes with the post, so its blobs go first.
        for comment in self.content().list_comments_by_post(post.id).await? {
            images::delete_refs(self.images(), &comment.content, |_| true).await?;
        }

        let removed = self.content().delete_comments_by_post(post.id).await?;
        self.content().delete_post(post.id).await?;

        tracing::info!(post = %post.id, comments_removed = removed, "deleted post");
        Ok(())
    }

    /// Soft-deletes the actor's own comment: image blobs go, the document
    /// stays with cleared content and `deleted = true` so children keep a
    /// live `parent_comment` target. Already-deleted comments no-op.
    pub async fn delete_comment(&self, actor: Uuid, id: Uuid) -> Result<()> {
        let mut comment = self
            .content()
            .get_comment(id)
            .await?
            .ok_or_else(|| AppError::not_found("comment", id))?;
        ensure_author(comment.author, actor, "comment")?;

        if comment.deleted {
            return Ok(());
        }

        images::delete_refs(self.images(), &comment.content, |_| true).await?;

        comment.content.clear();
        comment.images.clear();
        comment.deleted = true;
        self.content().save_comment(&comment).await?;

        tracing::info!(comment = %comment.id, "soft-deleted comment");
        Ok(())
    }
}
