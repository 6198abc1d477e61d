//! # Image Reference Rewriter
//!
//! Rich-text content embeds images as `<img src="...">` markers. Clients
//! upload blobs under a temporary path (`/uploads/tmp/<name>`); on create
//! or update each newly referenced temp image is normalized, stored under
//! a permanent content-addressed id, and the in-content src rewritten to
//! `/images/<id>`. On delete (and on updates that drop images) the prior
//! content is parsed for permanent ids and each blob passing the caller's
//! `should_delete` predicate is removed. Images are never shared between
//! documents, so unconditional deletion on document delete is safe.

use std::collections::HashSet;

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use cb_core::error::{AppError, Result};
use cb_core::models::UserImage;
use cb_core::traits::{ImageProcessor, ImageRepo};

/// Where clients park uploads before the content referencing them is saved.
pub const TEMP_PREFIX: &str = "/uploads/tmp/";
/// Permanent serving path; the final segment is the blob id.
pub const PERMANENT_PREFIX: &str = "/images/";

static TEMP_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"src="/uploads/tmp/([^"]+)""#).expect("temp src pattern"));

static PERMANENT_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"src="[^"]*/images/([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})""#,
    )
    .expect("permanent src pattern")
});

/// A raw client upload, matched to content by its temporary name.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub data: Bytes,
}

/// Temporary upload names referenced by `content`, in order of appearance.
pub fn temp_refs(content: &str) -> Vec<String> {
    TEMP_SRC
        .captures_iter(content)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Permanent blob ids referenced by `content`, deduplicated, in order.
pub fn permanent_refs(content: &str) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    PERMANENT_SRC
        .captures_iter(content)
        .filter_map(|cap| Uuid::parse_str(&cap[1]).ok())
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Re-homes every temp image referenced by `content` but not by
/// `prior_content`: the matching upload is normalized, persisted as a
/// permanent blob, and the marker's src rewritten to the permanent path.
/// Returns the rewritten content.
///
/// A temp ref without a matching upload is a Validation error, caught
/// before any blob is written for that ref. Blobs stored before a later
/// failure are not rolled back; they become unreferenced and harmless.
pub async fn rehome_uploads(
    images: &dyn ImageRepo,
    processor: &dyn ImageProcessor,
    content: &str,
    prior_content: &str,
    uploads: &[Upload],
) -> Result<String> {
    let prior: HashSet<String> = temp_refs(prior_content).into_iter().collect();
    let mut rewritten = content.to_string();

    for name in temp_refs(content) {
        if prior.contains(&name) {
            continue;
        }

        let upload = uploads
            .iter()
            .find(|u| u.name == name)
            .ok_or_else(|| {
                AppError::Validation(format!("content references missing upload: {name}"))
            })?;

        let normalized = processor.normalize(upload.data.clone()).await?;
        let blob = UserImage {
            id: Uuid::now_v7(),
            data: normalized.data.to_vec(),
            mime_type: normalized.mime.to_string(),
            name: name.clone(),
        };
        images.create_image(&blob).await?;

        let temp_src = format!("src=\"{TEMP_PREFIX}{name}\"");
        let permanent_src = format!("src=\"{PERMANENT_PREFIX}{}\"", blob.id);
        rewritten = rewritten.replace(&temp_src, &permanent_src);

        tracing::debug!(blob = %blob.id, upload = %name, "re-homed temp image");
    }

    Ok(rewritten)
}

/// Deletes every blob referenced by `content` whose id passes
/// `should_delete`. Document deletion passes `|_| true`; updates pass a
/// predicate retaining ids still referenced by the new content. Returns
/// the number of blobs deleted.
pub async fn delete_refs<F>(
    images: &dyn ImageRepo,
    content: &str,
    should_delete: F,
) -> Result<u64>
where
    F: Fn(&Uuid) -> bool,
{
    let mut deleted = 0;
    for id in permanent_refs(content) {
        if should_delete(&id) {
            images.delete_image(id).await?;
            deleted += 1;
            tracing::debug!(blob = %id, "deleted image blob");
        }
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeImages, NoopProcessor};

    #[test]
    fn test_temp_refs_found_in_order() {
        let content = r#"<p>a</p><img src="/uploads/tmp/one.png"><img src="/uploads/tmp/two.png">"#;
        assert_eq!(temp_refs(content), vec!["one.png", "two.png"]);
    }

    #[test]
    fn test_permanent_refs_parse_and_dedupe() {
        let id = Uuid::now_v7();
        let content = format!(
            r#"<img src="/images/{id}"><img src="https://cdn.example/images/{id}">"#
        );
        assert_eq!(permanent_refs(&content), vec![id]);
    }

    #[test]
    fn test_permanent_refs_ignore_temp_and_foreign_srcs() {
        let content = r#"<img src="/uploads/tmp/a.png"><img src="https://x.example/pic.jpg">"#;
        assert!(permanent_refs(content).is_empty());
    }

    #[tokio::test]
    async fn test_rehome_rewrites_marker_and_stores_blob() {
        let images = FakeImages::default();
        let content = r#"<img src="/uploads/tmp/a.png">"#;
        let uploads = vec![Upload {
            name: "a.png".into(),
            data: Bytes::from_static(b"raw"),
        }];

        let rewritten = rehome_uploads(&images, &NoopProcessor, content, "", &uploads)
            .await
            .unwrap();

        let ids = permanent_refs(&rewritten);
        assert_eq!(ids.len(), 1);
        assert!(!rewritten.contains(TEMP_PREFIX));
        assert!(images.contains(ids[0]));
    }

    #[tokio::test]
    async fn test_rehome_without_matching_upload_is_a_validation_error() {
        let images = FakeImages::default();
        let err = rehome_uploads(&images, &NoopProcessor, r#"<img src="/uploads/tmp/a.png">"#, "", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, cb_core::AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_refs_respects_predicate() {
        let images = FakeImages::default();
        let keep = images.insert_blob("keep.webp");
        let drop = images.insert_blob("drop.webp");
        let content = format!(r#"<img src="/images/{keep}"><img src="/images/{drop}">"#);

        let deleted = delete_refs(&images, &content, |id| *id != keep).await.unwrap();

        assert_eq!(deleted, 1);
        assert!(images.contains(keep));
        assert!(!images.contains(drop));
    }
}
