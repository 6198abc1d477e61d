//! # cb-store-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational
//! model and the `cb-core` domain models. Documents map to rows; list
//! fields (User.posts, Topic.posts, ...) are stored as JSON text columns,
//! so each save remains a single atomic row write. Unique indexes on the
//! join tables back the toggle engine's at-most-one guarantee; a unique
//! violation surfaces as `AppError::Conflict`.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use cb_core::error::{AppError, Result};
use cb_core::models::{Comment, LikedComment, Post, SaveKind, SavedPost, Topic, User, UserImage};
use cb_core::traits::{ContentRepo, EngagementRepo, ImageRepo};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id        BLOB PRIMARY KEY,
    username  TEXT NOT NULL,
    posts     TEXT NOT NULL DEFAULT '[]',
    comments  TEXT NOT NULL DEFAULT '[]',
    bookmarks TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS topics (
    id    BLOB PRIMARY KEY,
    name  TEXT NOT NULL UNIQUE,
    posts TEXT NOT NULL DEFAULT '[]',
    icon  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    id         BLOB PRIMARY KEY,
    author     BLOB NOT NULL,
    topic      BLOB NOT NULL,
    title      TEXT NOT NULL,
    content    TEXT NOT NULL,
    images     TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT
);

CREATE TABLE IF NOT EXISTS comments (
    id             BLOB PRIMARY KEY,
    author         BLOB NOT NULL,
    from_post      BLOB NOT NULL,
    parent_comment BLOB,
    content        TEXT NOT NULL,
    images         TEXT NOT NULL DEFAULT '[]',
    deleted        INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL,
    updated_at     TEXT
);
CREATE INDEX IF NOT EXISTS idx_comments_from_post ON comments (from_post);

CREATE TABLE IF NOT EXISTS saved_posts (
    id         BLOB PRIMARY KEY,
    user       BLOB NOT NULL,
    post       BLOB NOT NULL,
    kind       TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (user, post, kind)
);

CREATE TABLE IF NOT EXISTS liked_comments (
    id         BLOB PRIMARY KEY,
    user       BLOB NOT NULL,
    comment    BLOB NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (user, comment)
);

CREATE TABLE IF NOT EXISTS user_images (
    id        BLOB PRIMARY KEY,
    data      BLOB NOT NULL,
    mime_type TEXT NOT NULL,
    name      TEXT NOT NULL
);
"#;

pub struct SqliteStore {
    pool: SqlitePool,
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

// JSON list columns
fn ids_to_json(ids: &[Uuid]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}

fn json_to_ids(json: &str) -> Vec<Uuid> {
    serde_json::from_str(json).unwrap_or_default()
}

/// Maps store failures into domain errors. Unique-constraint hits become
/// Conflict so the toggle engine can recognize a lost create race.
fn db_err(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return AppError::Conflict(db.message().to_string());
        }
    }
    AppError::Dependency(err.to_string())
}

fn map_user(row: &SqliteRow) -> User {
    User {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        username: row.get("username"),
        posts: json_to_ids(&row.get::<String, _>("posts")),
        comments: json_to_ids(&row.get::<String, _>("comments")),
        bookmarks: json_to_ids(&row.get::<String, _>("bookmarks")),
    }
}

fn map_topic(row: &SqliteRow) -> Topic {
    Topic {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        name: row.get("name"),
        posts: json_to_ids(&row.get::<String, _>("posts")),
        icon: row.get("icon"),
    }
}

// Derived counters are not columns; they start at zero and are filled by
// the counter recalculator after the fetch.
fn map_post(row: &SqliteRow) -> Post {
    Post {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        author: blob_to_uuid(row.get::<Vec<u8>, _>("author").as_slice()),
        topic: blob_to_uuid(row.get::<Vec<u8>, _>("topic").as_slice()),
        title: row.get("title"),
        content: row.get("content"),
        images: json_to_ids(&row.get::<String, _>("images")),
        num_likes: 0,
        num_comments: 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_comment(row: &SqliteRow) -> Comment {
    Comment {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        author: blob_to_uuid(row.get::<Vec<u8>, _>("author").as_slice()),
        from_post: blob_to_uuid(row.get::<Vec<u8>, _>("from_post").as_slice()),
        parent_comment: row
            .get::<Option<Vec<u8>>, _>("parent_comment")
            .map(|blob| blob_to_uuid(blob.as_slice())),
        content: row.get("content"),
        images: json_to_ids(&row.get::<String, _>("images")),
        num_likes: 0,
        deleted: row.get("deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_saved_post(row: &SqliteRow) -> SavedPost {
    SavedPost {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        user: blob_to_uuid(row.get::<Vec<u8>, _>("user").as_slice()),
        post: blob_to_uuid(row.get::<Vec<u8>, _>("post").as_slice()),
        kind: SaveKind::parse(&row.get::<String, _>("kind")).unwrap_or(SaveKind::Bookmark),
        created_at: row.get("created_at"),
    }
}

fn map_liked_comment(row: &SqliteRow) -> LikedComment {
    LikedComment {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        user: blob_to_uuid(row.get::<Vec<u8>, _>("user").as_slice()),
        comment: blob_to_uuid(row.get::<Vec<u8>, _>("comment").as_slice()),
        created_at: row.get("created_at"),
    }
}

impl SqliteStore {
    /// Connects and bootstraps the schema.
    ///
    /// A single connection keeps in-memory databases coherent across the
    /// pool and lets SQLite serialize writers itself.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(db_err)?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await.map_err(db_err)?;

        tracing::debug!(url, "sqlite store ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ContentRepo for SqliteStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(map_user))
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (id, username, posts, comments, bookmarks) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(user.id))
            .bind(&user.username)
            .bind(ids_to_json(&user.posts))
            .bind(ids_to_json(&user.comments))
            .bind(ids_to_json(&user.bookmarks))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        sqlx::query("UPDATE users SET username = ?, posts = ?, comments = ?, bookmarks = ? WHERE id = ?")
            .bind(&user.username)
            .bind(ids_to_json(&user.posts))
            .bind(ids_to_json(&user.comments))
            .bind(ids_to_json(&user.bookmarks))
            .bind(uuid_to_blob(user.id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get_topic(&self, id: Uuid) -> Result<Option<Topic>> {
        let row = sqlx::query("SELECT * FROM topics WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(map_topic))
    }

    async fn get_topic_by_name(&self, name: &str) -> Result<Option<Topic>> {
        let row = sqlx::query("SELECT * FROM topics WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(map_topic))
    }

    async fn list_topics(&self) -> Result<Vec<Topic>> {
        let rows = sqlx::query("SELECT * FROM topics ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(map_topic).collect())
    }

    async fn create_topic(&self, topic: &Topic) -> Result<()> {
        sqlx::query("INSERT INTO topics (id, name, posts, icon) VALUES (?, ?, ?, ?)")
            .bind(uuid_to_blob(topic.id))
            .bind(&topic.name)
            .bind(ids_to_json(&topic.posts))
            .bind(&topic.icon)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn save_topic(&self, topic: &Topic) -> Result<()> {
        sqlx::query("UPDATE topics SET name = ?, posts = ?, icon = ? WHERE id = ?")
            .bind(&topic.name)
            .bind(ids_to_json(&topic.posts))
            .bind(&topic.icon)
            .bind(uuid_to_blob(topic.id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(map_post))
    }

    async fn list_posts_by_topic(&self, topic: Uuid) -> Result<Vec<Post>> {
        let rows = sqlx::query("SELECT * FROM posts WHERE topic = ? ORDER BY created_at DESC")
            .bind(uuid_to_blob(topic))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(map_post).collect())
    }

    async fn list_posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>> {
        // Point lookups keep the query static; missing ids are skipped so
        // dangling references (e.g., stale bookmarks) resolve to nothing.
        let mut posts = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(post) = self.get_post(*id).await? {
                posts.push(post);
            }
        }
        Ok(posts)
    }

    async fn create_post(&self, post: &Post) -> Result<()> {
        sqlx::query("INSERT INTO posts (id, author, topic, title, content, images, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(post.id))
            .bind(uuid_to_blob(post.author))
            .bind(uuid_to_blob(post.topic))
            .bind(&post.title)
            .bind(&post.content)
            .bind(ids_to_json(&post.images))
            .bind(post.created_at)
            .bind(post.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn save_post(&self, post: &Post) -> Result<()> {
        sqlx::query("UPDATE posts SET title = ?, content = ?, images = ?, updated_at = ? WHERE id = ?")
            .bind(&post.title)
            .bind(&post.content)
            .bind(ids_to_json(&post.images))
            .bind(post.updated_at)
            .bind(uuid_to_blob(post.id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(map_comment))
    }

    async fn list_comments_by_post(&self, post: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query("SELECT * FROM comments WHERE from_post = ? ORDER BY created_at ASC")
            .bind(uuid_to_blob(post))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(map_comment).collect())
    }

    async fn create_comment(&self, comment: &Comment) -> Result<()> {
        sqlx::query("INSERT INTO comments (id, author, from_post, parent_comment, content, images, deleted, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(comment.id))
            .bind(uuid_to_blob(comment.author))
            .bind(uuid_to_blob(comment.from_post))
            .bind(comment.parent_comment.map(uuid_to_blob))
            .bind(&comment.content)
            .bind(ids_to_json(&comment.images))
            .bind(comment.deleted)
            .bind(comment.created_at)
            .bind(comment.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn save_comment(&self, comment: &Comment) -> Result<()> {
        sqlx::query("UPDATE comments SET content = ?, images = ?, deleted = ?, updated_at = ? WHERE id = ?")
            .bind(&comment.content)
            .bind(ids_to_json(&comment.images))
            .bind(comment.deleted)
            .bind(comment.updated_at)
            .bind(uuid_to_blob(comment.id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_comments_by_post(&self, post: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE from_post = ?")
            .bind(uuid_to_blob(post))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn count_comments_by_post(&self, post: Uuid) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM comments WHERE from_post = ?")
            .bind(uuid_to_blob(post))
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.get("n"))
    }
}

#[async_trait]
impl EngagementRepo for SqliteStore {
    async fn find_saved_post(
        &self,
        user: Uuid,
        post: Uuid,
        kind: SaveKind,
    ) -> Result<Option<SavedPost>> {
        let row = sqlx::query("SELECT * FROM saved_posts WHERE user = ? AND post = ? AND kind = ?")
            .bind(uuid_to_blob(user))
            .bind(uuid_to_blob(post))
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(map_saved_post))
    }

    async fn create_saved_post(&self, record: &SavedPost) -> Result<()> {
        sqlx::query("INSERT INTO saved_posts (id, user, post, kind, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(record.id))
            .bind(uuid_to_blob(record.user))
            .bind(uuid_to_blob(record.post))
            .bind(record.kind.as_str())
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_saved_post(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM saved_posts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list_saved_by_user(&self, user: Uuid, kind: SaveKind) -> Result<Vec<SavedPost>> {
        let rows = sqlx::query(
            "SELECT * FROM saved_posts WHERE user = ? AND kind = ? ORDER BY created_at DESC",
        )
        .bind(uuid_to_blob(user))
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.iter().map(map_saved_post).collect())
    }

    async fn count_saved(&self, post: Uuid, kind: SaveKind) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM saved_posts WHERE post = ? AND kind = ?")
            .bind(uuid_to_blob(post))
            .bind(kind.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.get("n"))
    }

    async fn find_liked_comment(&self, user: Uuid, comment: Uuid) -> Result<Option<LikedComment>> {
        let row = sqlx::query("SELECT * FROM liked_comments WHERE user = ? AND comment = ?")
            .bind(uuid_to_blob(user))
            .bind(uuid_to_blob(comment))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(map_liked_comment))
    }

    async fn create_liked_comment(&self, record: &LikedComment) -> Result<()> {
        sqlx::query("INSERT INTO liked_comments (id, user, comment, created_at) VALUES (?, ?, ?, ?)")
            .bind(uuid_to_blob(record.id))
            .bind(uuid_to_blob(record.user))
            .bind(uuid_to_blob(record.comment))
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_liked_comment(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM liked_comments WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn count_comment_likes(&self, comment: Uuid) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM liked_comments WHERE comment = ?")
            .bind(uuid_to_blob(comment))
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.get("n"))
    }
}

#[async_trait]
impl ImageRepo for SqliteStore {
    async fn get_image(&self, id: Uuid) -> Result<Option<UserImage>> {
        let row = sqlx::query("SELECT * FROM user_images WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(|row| UserImage {
            id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
            data: row.get("data"),
            mime_type: row.get("mime_type"),
            name: row.get("name"),
        }))
    }

    async fn create_image(&self, image: &UserImage) -> Result<()> {
        sqlx::query("INSERT INTO user_images (id, data, mime_type, name) VALUES (?, ?, ?, ?)")
            .bind(uuid_to_blob(image.id))
            .bind(&image.data)
            .bind(&image.mime_type)
            .bind(&image.name)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_image(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM user_images WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    fn sample_post(author: Uuid, topic: Uuid) -> Post {
        Post {
            id: Uuid::now_v7(),
            author,
            topic,
            title: "Hello".into(),
            content: "First post".into(),
            images: vec![Uuid::now_v7()],
            num_likes: 0,
            num_comments: 0,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_post_round_trip_with_image_list() {
        let store = store().await;
        let post = sample_post(Uuid::now_v7(), Uuid::now_v7());

        store.create_post(&post).await.unwrap();
        let fetched = store.get_post(post.id).await.unwrap().unwrap();

        assert_eq!(fetched.title, post.title);
        assert_eq!(fetched.images, post.images);
        assert!(fetched.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_user_list_fields_survive_save() {
        let store = store().await;
        let mut user = User {
            id: Uuid::now_v7(),
            username: "ada".into(),
            posts: vec![],
            comments: vec![],
            bookmarks: vec![],
        };
        store.create_user(&user).await.unwrap();

        user.posts.push(Uuid::now_v7());
        user.bookmarks.push(Uuid::now_v7());
        store.save_user(&user).await.unwrap();

        let fetched = store.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.posts, user.posts);
        assert_eq!(fetched.bookmarks, user.bookmarks);
    }

    #[tokio::test]
    async fn test_duplicate_saved_post_is_a_conflict() {
        let store = store().await;
        let (user, post) = (Uuid::now_v7(), Uuid::now_v7());

        let first = SavedPost {
            id: Uuid::now_v7(),
            user,
            post,
            kind: SaveKind::Like,
            created_at: Utc::now(),
        };
        store.create_saved_post(&first).await.unwrap();

        let second = SavedPost { id: Uuid::now_v7(), ..first.clone() };
        let err = store.create_saved_post(&second).await.unwrap_err();
        assert!(err.is_conflict());

        // A bookmark for the same pair is a different tuple and fine.
        let bookmark = SavedPost {
            id: Uuid::now_v7(),
            kind: SaveKind::Bookmark,
            ..first
        };
        store.create_saved_post(&bookmark).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_comments_by_post_scopes_to_that_post() {
        let store = store().await;
        let (post_a, post_b) = (Uuid::now_v7(), Uuid::now_v7());

        for post in [post_a, post_a, post_b] {
            let comment = Comment {
                id: Uuid::now_v7(),
                author: Uuid::now_v7(),
                from_post: post,
                parent_comment: None,
                content: "hey".into(),
                images: vec![],
                num_likes: 0,
                deleted: false,
                created_at: Utc::now(),
                updated_at: None,
            };
            store.create_comment(&comment).await.unwrap();
        }

        let removed = store.delete_comments_by_post(post_a).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.count_comments_by_post(post_b).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_topic_name_is_unique() {
        let store = store().await;
        let topic = Topic {
            id: Uuid::now_v7(),
            name: "rust".into(),
            posts: vec![],
            icon: "icon-topic-default.webp".into(),
        };
        store.create_topic(&topic).await.unwrap();

        let dup = Topic { id: Uuid::now_v7(), ..topic.clone() };
        assert!(store.create_topic(&dup).await.unwrap_err().is_conflict());

        let by_name = store.get_topic_by_name("rust").await.unwrap().unwrap();
        assert_eq!(by_name.id, topic.id);
    }
}
