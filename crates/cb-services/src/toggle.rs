//! # Toggle Engine
//!
//! Idempotent like/bookmark toggling. The join record *is* the state:
//! absent → create turns it on, present → delete turns it off. The
//! at-most-one guarantee for a `(user, target, kind)` tuple is enforced by
//! the store's unique index, not by the existence check — under a
//! concurrent create race the loser receives a Conflict and must treat it
//! as "already toggled on", retrying as a delete instead of failing.
//!
//! Returns the created record on the "on" transition and `None` on the
//! "off" transition so callers can tell the direction without a re-read.

use chrono::Utc;
use uuid::Uuid;

use cb_core::error::{AppError, Result};
use cb_core::models::{LikedComment, SaveKind, SavedPost};

use crate::reference::{set_reference, RefMode};
use crate::ForumService;

impl ForumService {
    /// Toggles a like edge between a user and a post.
    pub async fn toggle_like_post(&self, user: Uuid, post: Uuid) -> Result<Option<SavedPost>> {
        self.toggle_saved_post(user, post, SaveKind::Like).await
    }

    /// Toggles a bookmark edge between a user and a post, keeping the
    /// user's `bookmarks` list in step with the join record.
    pub async fn toggle_bookmark(&self, user: Uuid, post: Uuid) -> Result<Option<SavedPost>> {
        let outcome = self.toggle_saved_post(user, post, SaveKind::Bookmark).await?;

        // Second half of the bidirectional relation: join record first,
        // then the owner's list. A failure here leaves the list one-sided
        // until the next toggle; readers resolve bookmarks via join
        // records, so nothing is lost.
        let mut doc = self.require_user(user).await?;
        let mode = if outcome.is_some() {
            RefMode::Add
        } else {
            RefMode::Remove
        };
        set_reference(&mut doc.bookmarks, mode, post);
        self.content().save_user(&doc).await?;

        Ok(outcome)
    }

    async fn toggle_saved_post(
        &self,
        user: Uuid,
        post: Uuid,
        kind: SaveKind,
    ) -> Result<Option<SavedPost>> {
        if self.content().get_post(post).await?.is_none() {
            return Err(AppError::not_found("post", post));
        }

        if let Some(existing) = self.engagement().find_saved_post(user, post, kind).await? {
            self.engagement().delete_saved_post(existing.id).await?;
            tracing::debug!(%user, %post, kind = kind.as_str(), "toggled off");
            return Ok(None);
        }

        let record = SavedPost {
            id: Uuid::now_v7(),
            user,
            post,
            kind,
            created_at: Utc::now(),
        };
        match self.engagement().create_saved_post(&record).await {
            Ok(()) => {
                tracing::debug!(%user, %post, kind = kind.as_str(), "toggled on");
                Ok(Some(record))
            }
            Err(err) if err.is_conflict() => {
                // Lost a concurrent create race: the edge is already on,
                // so this toggle lands as the off transition.
                if let Some(existing) =
                    self.engagement().find_saved_post(user, post, kind).await?
                {
                    self.engagement().delete_saved_post(existing.id).await?;
                }
                tracing::debug!(%user, %post, kind = kind.as_str(), "toggle lost create race");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Toggles a like edge between a user and a comment.
    pub async fn toggle_like_comment(
        &self,
        user: Uuid,
        comment: Uuid,
    ) -> Result<Option<LikedComment>> {
        if self.content().get_comment(comment).await?.is_none() {
            return Err(AppError::not_found("comment", comment));
        }

        if let Some(existing) = self.engagement().find_liked_comment(user, comment).await? {
            self.engagement().delete_liked_comment(existing.id).await?;
            return Ok(None);
        }

        let record = LikedComment {
            id: Uuid::now_v7(),
            user,
            comment,
            created_at: Utc::now(),
        };
        match self.engagement().create_liked_comment(&record).await {
            Ok(()) => Ok(Some(record)),
            Err(err) if err.is_conflict() => {
                if let Some(existing) =
                    self.engagement().find_liked_comment(user, comment).await?
                {
                    self.engagement().delete_liked_comment(existing.id).await?;
                }
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
