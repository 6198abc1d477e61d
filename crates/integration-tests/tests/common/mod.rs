//! Shared fixtures: a real SQLite store behind every port, a pass-through
//! image processor, and seed helpers for users and topics.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use cb_core::models::{Topic, User};
use cb_core::traits::ContentRepo;
use cb_services::images::Upload;
use cb_services::testing::NoopProcessor;
use cb_services::ForumService;
use cb_store_sqlite::SqliteStore;

pub struct TestCtx {
    pub service: ForumService,
    pub store: Arc<SqliteStore>,
}

pub async fn ctx() -> TestCtx {
    let store = Arc::new(SqliteStore::connect("sqlite::memory:").await.unwrap());
    let service = ForumService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(NoopProcessor),
    );
    TestCtx { service, store }
}

pub async fn seed_user(store: &SqliteStore, username: &str) -> User {
    let user = User {
        id: Uuid::now_v7(),
        username: username.to_string(),
        posts: vec![],
        comments: vec![],
        bookmarks: vec![],
    };
    store.create_user(&user).await.unwrap();
    user
}

pub async fn seed_topic(store: &SqliteStore, name: &str) -> Topic {
    let topic = Topic {
        id: Uuid::now_v7(),
        name: name.to_string(),
        posts: vec![],
        icon: "icon-topic-default.webp".to_string(),
    };
    store.create_topic(&topic).await.unwrap();
    topic
}

/// A content body embedding one temp image, plus its matching upload.
pub fn content_with_temp_image(name: &str) -> (String, Vec<Upload>) {
    let content = format!(r#"<p>look at this</p><img src="/uploads/tmp/{name}">"#);
    let uploads = vec![Upload {
        name: name.to_string(),
        data: Bytes::from_static(b"raw image bytes"),
    }];
    (content, uploads)
}
