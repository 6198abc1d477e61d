//! # Core Traits (Ports)
//!
//! Any storage or media plugin must implement these traits to be used by
//! the services and the binary. Every write is atomic per document; the
//! consistency engine layers its ordered multi-document protocols on top.

use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Comment, LikedComment, Post, SaveKind, SavedPost, Topic, User, UserImage};

/// Data persistence contract for users, topics, posts, and comments.
///
/// `save_*` persists the entire document (single-document write); `create_*`
/// inserts a new one. Lookups return `Ok(None)` for missing ids — callers
/// decide whether absence is an error.
#[async_trait]
pub trait ContentRepo: Send + Sync {
    // User operations
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn create_user(&self, user: &User) -> Result<()>;
    async fn save_user(&self, user: &User) -> Result<()>;

    // Topic operations
    async fn get_topic(&self, id: Uuid) -> Result<Option<Topic>>;
    async fn get_topic_by_name(&self, name: &str) -> Result<Option<Topic>>;
    async fn list_topics(&self) -> Result<Vec<Topic>>;
    async fn create_topic(&self, topic: &Topic) -> Result<()>;
    async fn save_topic(&self, topic: &Topic) -> Result<()>;

    // Post operations
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>>;
    async fn list_posts_by_topic(&self, topic: Uuid) -> Result<Vec<Post>>;
    async fn list_posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>>;
    async fn create_post(&self, post: &Post) -> Result<()>;
    async fn save_post(&self, post: &Post) -> Result<()>;
    async fn delete_post(&self, id: Uuid) -> Result<()>;

    // Comment operations
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>>;
    async fn list_comments_by_post(&self, post: Uuid) -> Result<Vec<Comment>>;
    async fn create_comment(&self, comment: &Comment) -> Result<()>;
    async fn save_comment(&self, comment: &Comment) -> Result<()>;
    /// Hard-deletes every comment under a post. Returns the number removed.
    async fn delete_comments_by_post(&self, post: Uuid) -> Result<u64>;
    async fn count_comments_by_post(&self, post: Uuid) -> Result<i64>;
}

/// Persistence contract for the like/bookmark join collections.
///
/// `create_*` must fail with `AppError::Conflict` when a record for the
/// same tuple already exists — the uniqueness invariant lives in the
/// store, not in application logic, so concurrent duplicate creates lose
/// deterministically.
#[async_trait]
pub trait EngagementRepo: Send + Sync {
    // SavedPost operations
    async fn find_saved_post(&self, user: Uuid, post: Uuid, kind: SaveKind)
        -> Result<Option<SavedPost>>;
    async fn create_saved_post(&self, record: &SavedPost) -> Result<()>;
    async fn delete_saved_post(&self, id: Uuid) -> Result<()>;
    async fn list_saved_by_user(&self, user: Uuid, kind: SaveKind) -> Result<Vec<SavedPost>>;
    async fn count_saved(&self, post: Uuid, kind: SaveKind) -> Result<i64>;

    // LikedComment operations
    async fn find_liked_comment(&self, user: Uuid, comment: Uuid)
        -> Result<Option<LikedComment>>;
    async fn create_liked_comment(&self, record: &LikedComment) -> Result<()>;
    async fn delete_liked_comment(&self, id: Uuid) -> Result<()>;
    async fn count_comment_likes(&self, comment: Uuid) -> Result<i64>;
}

/// Blob persistence for uploaded images.
#[async_trait]
pub trait ImageRepo: Send + Sync {
    async fn get_image(&self, id: Uuid) -> Result<Option<UserImage>>;
    async fn create_image(&self, image: &UserImage) -> Result<()>;
    /// Deleting a missing blob is a no-op, not an error.
    async fn delete_image(&self, id: Uuid) -> Result<()>;
}

/// Result of normalizing a raw upload.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub data: Bytes,
    pub mime: Mime,
}

/// Image processing contract: accepts raw bytes, returns a normalized blob.
#[async_trait]
pub trait ImageProcessor: Send + Sync {
    async fn normalize(&self, data: Bytes) -> Result<NormalizedImage>;
}
