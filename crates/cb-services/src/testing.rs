//! In-memory fakes for exercising the engine without a real store.
//! Compiled for unit tests, and for external test crates via the
//! `testing` feature.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use cb_core::error::Result;
use cb_core::models::UserImage;
use cb_core::traits::{ImageProcessor, ImageRepo, NormalizedImage};

/// Blob store backed by a HashMap.
#[derive(Default)]
pub struct FakeImages {
    blobs: Mutex<HashMap<Uuid, UserImage>>,
}

impl FakeImages {
    pub fn contains(&self, id: Uuid) -> bool {
        self.blobs.lock().unwrap().contains_key(&id)
    }

    /// Seeds a blob directly, bypassing the processor. Returns its id.
    pub fn insert_blob(&self, name: &str) -> Uuid {
        let id = Uuid::now_v7();
        self.blobs.lock().unwrap().insert(
            id,
            UserImage {
                id,
                data: vec![],
                mime_type: "image/webp".to_string(),
                name: name.to_string(),
            },
        );
        id
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageRepo for FakeImages {
    async fn get_image(&self, id: Uuid) -> Result<Option<UserImage>> {
        Ok(self.blobs.lock().unwrap().get(&id).cloned())
    }

    async fn create_image(&self, image: &UserImage) -> Result<()> {
        self.blobs.lock().unwrap().insert(image.id, image.clone());
        Ok(())
    }

    async fn delete_image(&self, id: Uuid) -> Result<()> {
        self.blobs.lock().unwrap().remove(&id);
        Ok(())
    }
}

/// Processor that passes bytes through untouched.
pub struct NoopProcessor;

#[async_trait]
impl ImageProcessor for NoopProcessor {
    async fn normalize(&self, data: Bytes) -> Result<NormalizedImage> {
        Ok(NormalizedImage {
            data,
            mime: mime::IMAGE_PNG,
        })
    }
}
