//! Image blobs live and die with the content referencing them: temp refs
//! are re-homed on create, dropped refs are deleted on update, and all
//! refs go when the document goes.

mod common;

use bytes::Bytes;
use uuid::Uuid;

use cb_core::traits::{ContentRepo, ImageRepo};
use cb_services::images::{self, Upload};
use cb_services::{CommentPatch, NewComment, NewPost, PostPatch};
use common::{content_with_temp_image, ctx, seed_topic, seed_user};

async fn blob_exists(store: &cb_store_sqlite::SqliteStore, id: Uuid) -> bool {
    store.get_image(id).await.unwrap().is_some()
}

#[tokio::test]
async fn create_post_rehomes_temp_images() {
    let t = ctx().await;
    let user = seed_user(&t.store, "ada").await;
    seed_topic(&t.store, "cs").await;
    let (content, uploads) = content_with_temp_image("img1.png");

    let post = t
        .service
        .create_post(
            user.id,
            NewPost {
                topic: "cs".to_string(),
                title: "Look at this".to_string(),
                content,
                uploads,
            },
        )
        .await
        .unwrap();

    assert!(!post.content.contains("/uploads/tmp/"));
    assert_eq!(post.images.len(), 1);
    assert_eq!(images::permanent_refs(&post.content), post.images);
    assert!(blob_exists(&t.store, post.images[0]).await);
}

#[tokio::test]
async fn image_bound_counts_markers_that_are_already_permanent() {
    let t = ctx().await;
    let user = seed_user(&t.store, "ada").await;
    seed_topic(&t.store, "cs").await;

    // Four markers pointing straight at permanent blob paths, no uploads.
    let markers: String = (0..4)
        .map(|_| format!(r#"<img src="/images/{}">"#, Uuid::now_v7()))
        .collect();

    let err = t
        .service
        .create_post(
            user.id,
            NewPost {
                topic: "cs".to_string(),
                title: "Look at this".to_string(),
                content: format!("<p>gallery</p>{markers}"),
                uploads: vec![],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, cb_core::AppError::Validation(_)));

    let post = t
        .service
        .create_post(
            user.id,
            NewPost {
                topic: "cs".to_string(),
                title: "Look at this".to_string(),
                content: "plain text body".to_string(),
                uploads: vec![],
            },
        )
        .await
        .unwrap();

    let err = t
        .service
        .create_comment(
            user.id,
            NewComment {
                from_post: post.id,
                parent_comment: None,
                content: markers,
                uploads: vec![],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, cb_core::AppError::Validation(_)));
}

#[tokio::test]
async fn deleting_a_post_deletes_its_blobs() {
    let t = ctx().await;
    let user = seed_user(&t.store, "ada").await;
    seed_topic(&t.store, "cs").await;
    let (content, uploads) = content_with_temp_image("img1.png");

    let post = t
        .service
        .create_post(
            user.id,
            NewPost {
                topic: "cs".to_string(),
                title: "Look at this".to_string(),
                content,
                uploads,
            },
        )
        .await
        .unwrap();
    let blob = post.images[0];

    t.service.delete_post(user.id, post.id).await.unwrap();
    assert!(!blob_exists(&t.store, blob).await);
}

#[tokio::test]
async fn deleting_a_post_deletes_blobs_embedded_in_its_comments() {
    let t = ctx().await;
    let user = seed_user(&t.store, "ada").await;
    seed_topic(&t.store, "cs").await;
    let post = t
        .service
        .create_post(
            user.id,
            NewPost {
                topic: "cs".to_string(),
                title: "Look at this".to_string(),
                content: "plain text body".to_string(),
                uploads: vec![],
            },
        )
        .await
        .unwrap();

    let (content, uploads) = content_with_temp_image("img1.png");
    let comment = t
        .service
        .create_comment(
            user.id,
            NewComment {
                from_post: post.id,
                parent_comment: None,
                content,
                uploads,
            },
        )
        .await
        .unwrap();
    let blob = comment.images[0];

    t.service.delete_post(user.id, post.id).await.unwrap();

    assert_eq!(t.store.count_comments_by_post(post.id).await.unwrap(), 0);
    assert!(!blob_exists(&t.store, blob).await);
}

#[tokio::test]
async fn update_deletes_dropped_blobs_and_keeps_retained_ones() {
    let t = ctx().await;
    let user = seed_user(&t.store, "ada").await;
    seed_topic(&t.store, "cs").await;
    let (content, uploads) = content_with_temp_image("img1.png");

    let post = t
        .service
        .create_post(
            user.id,
            NewPost {
                topic: "cs".to_string(),
                title: "Look at this".to_string(),
                content,
                uploads,
            },
        )
        .await
        .unwrap();
    let img1 = post.images[0];

    // New content drops img1 and brings in a fresh temp image.
    let new_content = r#"<p>swapped</p><img src="/uploads/tmp/img2.png">"#.to_string();
    let updated = t
        .service
        .update_post(
            user.id,
            post.id,
            PostPatch {
                title: None,
                content: Some(new_content),
                uploads: vec![Upload {
                    name: "img2.png".to_string(),
                    data: Bytes::from_static(b"second image"),
                }],
            },
        )
        .await
        .unwrap();

    let img2 = updated.images[0];
    assert_ne!(img1, img2);
    assert!(!blob_exists(&t.store, img1).await);
    assert!(blob_exists(&t.store, img2).await);
}

#[tokio::test]
async fn update_retains_blobs_still_referenced_by_the_new_content() {
    let t = ctx().await;
    let user = seed_user(&t.store, "ada").await;
    seed_topic(&t.store, "cs").await;
    let (content, uploads) = content_with_temp_image("img1.png");

    let post = t
        .service
        .create_post(
            user.id,
            NewPost {
                topic: "cs".to_string(),
                title: "Look at this".to_string(),
                content,
                uploads,
            },
        )
        .await
        .unwrap();
    let img1 = post.images[0];

    // Edit the text but keep the permanent marker.
    let new_content = format!(r#"<p>edited</p><img src="/images/{img1}">"#);
    let updated = t
        .service
        .update_post(
            user.id,
            post.id,
            PostPatch {
                title: None,
                content: Some(new_content),
                uploads: vec![],
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.images, vec![img1]);
    assert!(blob_exists(&t.store, img1).await);
}

#[tokio::test]
async fn comment_soft_delete_detaches_and_deletes_blobs() {
    let t = ctx().await;
    let user = seed_user(&t.store, "ada").await;
    seed_topic(&t.store, "cs").await;
    let post = t
        .service
        .create_post(
            user.id,
            NewPost {
                topic: "cs".to_string(),
                title: "Look at this".to_string(),
                content: "plain text body".to_string(),
                uploads: vec![],
            },
        )
        .await
        .unwrap();

    let (content, uploads) = content_with_temp_image("img1.png");
    let comment = t
        .service
        .create_comment(
            user.id,
            NewComment {
                from_post: post.id,
                parent_comment: None,
                content,
                uploads,
            },
        )
        .await
        .unwrap();
    let blob = comment.images[0];

    t.service.delete_comment(user.id, comment.id).await.unwrap();

    assert!(!blob_exists(&t.store, blob).await);
    let comment = t.store.get_comment(comment.id).await.unwrap().unwrap();
    assert!(comment.images.is_empty());
}

#[tokio::test]
async fn update_comment_swaps_blobs_like_posts_do() {
    let t = ctx().await;
    let user = seed_user(&t.store, "ada").await;
    seed_topic(&t.store, "cs").await;
    let post = t
        .service
        .create_post(
            user.id,
            NewPost {
                topic: "cs".to_string(),
                title: "Look at this".to_string(),
                content: "plain text body".to_string(),
                uploads: vec![],
            },
        )
        .await
        .unwrap();

    let (content, uploads) = content_with_temp_image("img1.png");
    let comment = t
        .service
        .create_comment(
            user.id,
            NewComment {
                from_post: post.id,
                parent_comment: None,
                content,
                uploads,
            },
        )
        .await
        .unwrap();
    let img1 = comment.images[0];

    let updated = t
        .service
        .update_comment(
            user.id,
            comment.id,
            CommentPatch {
                content: Some("no more pictures here".to_string()),
                uploads: vec![],
            },
        )
        .await
        .unwrap();

    assert!(updated.images.is_empty());
    assert!(!blob_exists(&t.store, img1).await);
}
