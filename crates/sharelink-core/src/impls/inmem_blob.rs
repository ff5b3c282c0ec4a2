//! InMemoryBlobBackend - テスト用の Blob ストレージ

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use crate::domain::BlobKey;
use crate::ports::{BlobBackend, BlobError};

#[derive(Debug, Default)]
pub struct InMemoryBlobBackend {
    blobs: Mutex<HashMap<BlobKey, Bytes>>,
}

impl InMemoryBlobBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &BlobKey) -> bool {
        self.blobs.lock().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BlobBackend for InMemoryBlobBackend {
    async fn store(&self, bytes: Bytes, suggested_name: &str) -> Result<BlobKey, BlobError> {
        let key = super::blob_key::issue_key(suggested_name);
        self.blobs.lock().await.insert(key.clone(), bytes);
        Ok(key)
    }

    async fn retrieve(&self, key: &BlobKey) -> Result<Bytes, BlobError> {
        self.blobs
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.clone()))
    }

    async fn remove(&self, key: &BlobKey) -> Result<(), BlobError> {
        self.blobs
            .lock()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| BlobError::NotFound(key.clone()))
    }
}
