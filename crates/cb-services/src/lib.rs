//! # cb-services
//!
//! The reference-consistency engine behind Campus-Board: every mutation of
//! a Post, Comment, SavedPost, or LikedComment flows through here so that
//! forward references, ownership lists, derived counters, and embedded
//! image blobs stay mutually consistent.
//!
//! Writes are sequential single-document operations, not transactions.
//! The engine is built so that a retry after a partial failure converges:
//! reference add/remove is idempotent, counters are derived on read, and
//! join-record uniqueness lives in the store.

pub mod cascade;
pub mod counts;
pub mod images;
pub mod reference;
pub mod toggle;
pub mod validate;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use cb_core::error::{AppError, Result};
use cb_core::models::{Comment, Post, SaveKind, Topic, User, UserImage};
use cb_core::traits::{ContentRepo, EngagementRepo, ImageProcessor, ImageRepo};

use crate::images::Upload;
use crate::reference::{set_reference, RefMode};

/// Everything needed to create a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Topic display name; the post is filed under the topic it resolves to.
    pub topic: String,
    pub title: String,
    pub content: String,
    pub uploads: Vec<Upload>,
}

/// Everything needed to create a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub from_post: Uuid,
    pub parent_comment: Option<Uuid>,
    pub content: String,
    pub uploads: Vec<Upload>,
}

/// Field-whitelisted patch for a post. Absent fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub uploads: Vec<Upload>,
}

/// Field-whitelisted patch for a comment.
#[derive(Debug, Clone, Default)]
pub struct CommentPatch {
    pub content: Option<String>,
    pub uploads: Vec<Upload>,
}

/// The service owning all mutation and read paths. Plugins are injected
/// as trait objects, mirroring how the binary assembles them.
pub struct ForumService {
    content: Arc<dyn ContentRepo>,
    engagement: Arc<dyn EngagementRepo>,
    images: Arc<dyn ImageRepo>,
    processor: Arc<dyn ImageProcessor>,
}

impl ForumService {
    pub fn new(
        content: Arc<dyn ContentRepo>,
        engagement: Arc<dyn EngagementRepo>,
        images: Arc<dyn ImageRepo>,
        processor: Arc<dyn ImageProcessor>,
    ) -> Self {
        Self {
            content,
            engagement,
            images,
            processor,
        }
    }

    pub(crate) fn content(&self) -> &dyn ContentRepo {
        self.content.as_ref()
    }

    pub(crate) fn engagement(&self) -> &dyn EngagementRepo {
        self.engagement.as_ref()
    }

    pub(crate) fn images(&self) -> &dyn ImageRepo {
        self.images.as_ref()
    }

    // ── Creation ────────────────────────────────────────────────────────

    /// Creates a post under the named topic and wires both sides of the
    /// bidirectional relation: the new id is added to the author's `posts`
    /// list and the topic's `posts` list. Temp images in the content are
    /// re-homed before the post document is written.
    pub async fn create_post(&self, actor: Uuid, new_post: NewPost) -> Result<Post> {
        validate::post_title(&new_post.title)?;
        validate::post_content(&new_post.content)?;

        let mut topic = self
            .content
            .get_topic_by_name(&new_post.topic)
            .await?
            .ok_or_else(|| AppError::NotFound("topic".into(), new_post.topic.clone()))?;
        let mut user = self.require_user(actor).await?;

        let content = images::rehome_uploads(
            self.images.as_ref(),
            self.processor.as_ref(),
            &new_post.content,
            "",
            &new_post.uploads,
        )
        .await?;

        // Count against the rewritten content so markers that were already
        // permanent (uploaded standalone) count too, not just temp refs.
        let refs = images::permanent_refs(&content);
        validate::image_count(refs.len())?;

        let post = Post {
            id: Uuid::now_v7(),
            author: actor,
            topic: topic.id,
            title: new_post.title.trim().to_string(),
            images: refs,
            content,
            num_likes: 0,
            num_comments: 0,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.content.create_post(&post).await?;

        // Two single-document writes; if the second fails the relation is
        // one-sided until a retry, which converges because Add is idempotent.
        set_reference(&mut user.posts, RefMode::Add, post.id);
        self.content.save_user(&user).await?;

        set_reference(&mut topic.posts, RefMode::Add, post.id);
        self.content.save_topic(&topic).await?;

        tracing::info!(post = %post.id, author = %actor, topic = %topic.id, "created post");
        Ok(post)
    }

    /// Creates a comment under a post, optionally nested under a parent
    /// comment. A supplied parent that no longer exists is nulled and the
    /// comment lands top-level rather than failing.
    pub async fn create_comment(&self, actor: Uuid, new_comment: NewComment) -> Result<Comment> {
        validate::comment_content(&new_comment.content)?;

        if self.content.get_post(new_comment.from_post).await?.is_none() {
            return Err(AppError::not_found("post", new_comment.from_post));
        }

        let parent_comment = match new_comment.parent_comment {
            Some(parent) => match self.content.get_comment(parent).await? {
                Some(_) => Some(parent),
                None => {
                    tracing::warn!(parent = %parent, "parent comment vanished; creating top-level");
                    None
                }
            },
            None => None,
        };

        let mut user = self.require_user(actor).await?;

        let content = images::rehome_uploads(
            self.images.as_ref(),
            self.processor.as_ref(),
            &new_comment.content,
            "",
            &new_comment.uploads,
        )
        .await?;

        let refs = images::permanent_refs(&content);
        validate::image_count(refs.len())?;

        let comment = Comment {
            id: Uuid::now_v7(),
            author: actor,
            from_post: new_comment.from_post,
            parent_comment,
            images: refs,
            content,
            num_likes: 0,
            deleted: false,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.content.create_comment(&comment).await?;

        set_reference(&mut user.comments, RefMode::Add, comment.id);
        self.content.save_user(&user).await?;

        tracing::info!(comment = %comment.id, post = %comment.from_post, "created comment");
        Ok(comment)
    }

    /// Creates a topic with a unique name.
    pub async fn create_topic(&self, name: &str) -> Result<Topic> {
        validate::topic_name(name)?;

        let name = name.trim().to_string();
        if self.content.get_topic_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict(format!("topic already exists: {name}")));
        }

        let topic = Topic {
            id: Uuid::now_v7(),
            name,
            posts: vec![],
            icon: "icon-topic-default.webp".to_string(),
        };
        self.content.create_topic(&topic).await?;
        Ok(topic)
    }

    // ── Updates ─────────────────────────────────────────────────────────

    /// Applies a whitelisted patch to the author's own post. On a content
    /// change, newly referenced temp images are re-homed and blobs dropped
    /// from the new content are deleted.
    pub async fn update_post(&self, actor: Uuid, id: Uuid, patch: PostPatch) -> Result<Post> {
        let mut post = self
            .content
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::not_found("post", id))?;
        ensure_author(post.author, actor, "post")?;

        if let Some(title) = &patch.title {
            validate::post_title(title)?;
            post.title = title.trim().to_string();
        }

        let prior_content = post.content.clone();
        if let Some(content) = &patch.content {
            validate::post_content(content)?;
            let rewritten = images::rehome_uploads(
                self.images.as_ref(),
                self.processor.as_ref(),
                content,
                &prior_content,
                &patch.uploads,
            )
            .await?;
            let refs = images::permanent_refs(&rewritten);
            validate::image_count(refs.len())?;
            post.content = rewritten;
            post.images = refs;
        }

        post.updated_at = Some(Utc::now());
        self.content.save_post(&post).await?;

        if patch.content.is_some() {
            let kept: Vec<Uuid> = post.images.clone();
            images::delete_refs(self.images.as_ref(), &prior_content, |blob| {
                !kept.contains(blob)
            })
            .await?;
        }

        counts::hydrate_post(self.content.as_ref(), self.engagement.as_ref(), &mut post).await?;
        Ok(post)
    }

    /// Applies a whitelisted patch to the author's own comment.
    pub async fn update_comment(
        &self,
        actor: Uuid,
        id: Uuid,
        patch: CommentPatch,
    ) -> Result<Comment> {
        let mut comment = self
            .content
            .get_comment(id)
            .await?
            .ok_or_else(|| AppError::not_found("comment", id))?;
        ensure_author(comment.author, actor, "comment")?;

        if comment.deleted {
            return Err(AppError::Validation(
                "deleted comments cannot be edited".to_string(),
            ));
        }

        let prior_content = comment.content.clone();
        if let Some(content) = &patch.content {
            validate::comment_content(content)?;
            let rewritten = images::rehome_uploads(
                self.images.as_ref(),
                self.processor.as_ref(),
                content,
                &prior_content,
                &patch.uploads,
            )
            .await?;
            let refs = images::permanent_refs(&rewritten);
            validate::image_count(refs.len())?;
            comment.content = rewritten;
            comment.images = refs;
        }

        comment.updated_at = Some(Utc::now());
        self.content.save_comment(&comment).await?;

        if patch.content.is_some() {
            let kept: Vec<Uuid> = comment.images.clone();
            images::delete_refs(self.images.as_ref(), &prior_content, |blob| {
                !kept.contains(blob)
            })
            .await?;
        }

        counts::hydrate_comment(self.engagement.as_ref(), &mut comment).await?;
        Ok(comment)
    }

    // ── Reads (all hydrated through the counter recalculator) ───────────

    pub async fn get_post(&self, id: Uuid) -> Result<Post> {
        let mut post = self
            .content
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::not_found("post", id))?;
        counts::hydrate_post(self.content.as_ref(), self.engagement.as_ref(), &mut post).await?;
        Ok(post)
    }

    pub async fn list_posts_for_topic(&self, topic_name: &str) -> Result<Vec<Post>> {
        let topic = self
            .content
            .get_topic_by_name(topic_name)
            .await?
            .ok_or_else(|| AppError::NotFound("topic".into(), topic_name.to_string()))?;
        let mut posts = self.content.list_posts_by_topic(topic.id).await?;
        counts::hydrate_posts(self.content.as_ref(), self.engagement.as_ref(), &mut posts).await?;
        Ok(posts)
    }

    pub async fn list_comments_for_post(&self, post: Uuid) -> Result<Vec<Comment>> {
        if self.content.get_post(post).await?.is_none() {
            return Err(AppError::not_found("post", post));
        }
        let mut comments = self.content.list_comments_by_post(post).await?;
        counts::hydrate_comments(self.engagement.as_ref(), &mut comments).await?;
        Ok(comments)
    }

    pub async fn list_topics(&self) -> Result<Vec<Topic>> {
        self.content.list_topics().await
    }

    /// Posts the user saved with the given kind (bookmarks or likes),
    /// resolved through the join records, not the user's list field.
    pub async fn list_saved_posts(&self, user: Uuid, kind: SaveKind) -> Result<Vec<Post>> {
        let saved = self.engagement.list_saved_by_user(user, kind).await?;
        let ids: Vec<Uuid> = saved.iter().map(|s| s.post).collect();
        let mut posts = self.content.list_posts_by_ids(&ids).await?;
        counts::hydrate_posts(self.content.as_ref(), self.engagement.as_ref(), &mut posts).await?;
        Ok(posts)
    }

    // ── Images ──────────────────────────────────────────────────────────

    pub async fn get_image(&self, id: Uuid) -> Result<UserImage> {
        self.images
            .get_image(id)
            .await?
            .ok_or_else(|| AppError::not_found("image", id))
    }

    /// Normalizes and stores a standalone upload, returning the blob record.
    pub async fn store_image(&self, name: &str, data: bytes::Bytes) -> Result<UserImage> {
        let normalized = self.processor.normalize(data).await?;
        let blob = UserImage {
            id: Uuid::now_v7(),
            data: normalized.data.to_vec(),
            mime_type: normalized.mime.to_string(),
            name: name.to_string(),
        };
        self.images.create_image(&blob).await?;
        Ok(blob)
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    pub(crate) async fn require_user(&self, id: Uuid) -> Result<User> {
        self.content
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::not_found("user", id))
    }
}

/// Authorship guard: only the author may mutate a post or comment.
pub(crate) fn ensure_author(author: Uuid, actor: Uuid, what: &str) -> Result<()> {
    if author != actor {
        return Err(AppError::Unauthorized(format!(
            "only the author may modify this {what}"
        )));
    }
    Ok(())
}
