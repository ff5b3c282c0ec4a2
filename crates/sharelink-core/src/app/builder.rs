//! ShareServiceBuilder - サービスの構築とワイヤリング
//!
//! # 方針
//! - ストレージはプロセス起動時に 1 回だけ組み立て、明示的に渡す（グローバル状態なし）
//! - 起動時検証（Fail-fast）: 設定の不備・ストレージ未指定は build() でエラー

use std::sync::Arc;

use super::link::LinkIssuer;
use super::service::{ShareService, UploadLimits};
use crate::config::{ConfigError, ShareConfig};
use crate::impls::{FsBlobBackend, InMemoryArtifactStore, InMemoryBlobBackend, JsonFileArtifactStore};
use crate::ports::{ArtifactStore, BlobBackend, Clock, IdGenerator, RandomIdGenerator, SystemClock};

/// ShareServiceBuilder は ShareService を構築
///
/// # 使用例
/// ```ignore
/// let service = ShareServiceBuilder::new(config)
///     .persistent()
///     .await?
///     .build()?;
/// ```
pub struct ShareServiceBuilder {
    config: ShareConfig,
    store: Option<Arc<dyn ArtifactStore>>,
    blobs: Option<Arc<dyn BlobBackend>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

/// BuildError はサービス構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no artifact store configured")]
    MissingStore,

    #[error("no blob backend configured")]
    MissingBlobBackend,

    #[error("failed to open storage: {0}")]
    Storage(String),
}

impl ShareServiceBuilder {
    pub fn new(config: ShareConfig) -> Self {
        Self {
            config,
            store: None,
            blobs: None,
            clock: Arc::new(SystemClock),
            ids: Arc::new(RandomIdGenerator),
        }
    }

    pub fn store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn blob_backend(mut self, blobs: Arc<dyn BlobBackend>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Use the in-memory store and blob backend.
    pub fn in_memory(self) -> Self {
        self.store(Arc::new(InMemoryArtifactStore::new()))
            .blob_backend(Arc::new(InMemoryBlobBackend::new()))
    }

    /// Open the JSON metadata store and filesystem blobs under `storage_root`.
    pub async fn persistent(self) -> Result<Self, BuildError> {
        let store = JsonFileArtifactStore::open(self.config.metadata_path())
            .await
            .map_err(|e| BuildError::Storage(e.to_string()))?;
        let blobs = FsBlobBackend::open(self.config.blobs_path())
            .await
            .map_err(|e| BuildError::Storage(e.to_string()))?;
        Ok(self.store(Arc::new(store)).blob_backend(Arc::new(blobs)))
    }

    pub fn build(self) -> Result<ShareService, BuildError> {
        self.config.validate()?;
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let blobs = self.blobs.ok_or(BuildError::MissingBlobBackend)?;
        let links = LinkIssuer::new(self.config.base_url.clone(), self.ids);
        let limits = UploadLimits {
            max_upload_bytes: self.config.max_upload_bytes,
            max_text_bytes: self.config.max_text_bytes,
        };
        Ok(ShareService::new(
            store,
            blobs,
            self.clock,
            links,
            limits,
            self.config.default_public,
        ))
    }
}
