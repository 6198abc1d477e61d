//! # Domain Models
//!
//! These structs represent the core entities of Campus-Board.
//! We use UUID v7 for time-ordered, globally unique identification.
//!
//! `num_likes` / `num_comments` are *derived* counters: the store never
//! persists them, and readers must not trust any stored value. They are
//! recomputed from join records and child documents on every fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered forum member and the lists of entities they own.
///
/// Invariant: every id in `posts` references a Post whose `author` is this
/// user; every id in `comments` a Comment authored by this user. These lists
/// are mutated only through the reference maintainer, never directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub posts: Vec<Uuid>,
    pub comments: Vec<Uuid>,
    /// Posts this user bookmarked. Deleting a post does not sweep other
    /// users' bookmark lists; readers resolve bookmarks through SavedPost
    /// records instead.
    pub bookmarks: Vec<Uuid>,
}

/// A board category (e.g., "Computer Science").
///
/// Invariant: every id in `posts` references a Post whose `topic` is this
/// topic — the other half of the Post's bidirectional relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: Uuid,
    /// Unique display name, 1–20 characters.
    pub name: String,
    pub posts: Vec<Uuid>,
    pub icon: String,
}

/// A top-level submission under a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author: Uuid,
    pub topic: Uuid,
    pub title: String,
    /// Rich text; may embed up to 3 image references.
    pub content: String,
    /// Permanent blob ids referenced from `content`.
    pub images: Vec<Uuid>,
    /// Derived: SavedPost records of kind Like pointing at this post.
    #[serde(default)]
    pub num_likes: i64,
    /// Derived: comments whose `from_post` is this post.
    #[serde(default)]
    pub num_comments: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A comment on a post, optionally nested under another comment.
///
/// Comments form a forest rooted at posts: `from_post` scopes the whole
/// tree, `parent_comment` links a reply to its parent. Soft-deleted
/// comments keep their identity so children stay resolvable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author: Uuid,
    pub from_post: Uuid,
    pub parent_comment: Option<Uuid>,
    pub content: String,
    pub images: Vec<Uuid>,
    /// Derived: LikedComment records pointing at this comment.
    #[serde(default)]
    pub num_likes: i64,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Discriminates the two flavors of SavedPost edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveKind {
    Bookmark,
    Like,
}

impl SaveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SaveKind::Bookmark => "bookmark",
            SaveKind::Like => "like",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bookmark" => Some(SaveKind::Bookmark),
            "like" => Some(SaveKind::Like),
            _ => None,
        }
    }
}

/// Join record: one like-or-bookmark edge between a user and a post.
///
/// Existence of the record *is* the on state; there is no boolean flag.
/// Unique per `(user, post, kind)`, enforced by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPost {
    pub id: Uuid,
    pub user: Uuid,
    pub post: Uuid,
    pub kind: SaveKind,
    pub created_at: DateTime<Utc>,
}

/// Join record: one like edge between a user and a comment.
/// Unique per `(user, comment)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikedComment {
    pub id: Uuid,
    pub user: Uuid,
    pub comment: Uuid,
    pub created_at: DateTime<Utc>,
}

/// An uploaded image blob, addressed by id from rich-text content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserImage {
    pub id: Uuid,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub mime_type: String,
    pub name: String,
}
