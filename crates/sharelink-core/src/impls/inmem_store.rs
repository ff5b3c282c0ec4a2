//! InMemoryArtifactStore - テスト・単一プロセス用のメタデータストア
//!
//! # 実装詳細
//! - `tokio::sync::Mutex<StoreState>` で状態全体を排他制御
//! - `consume_access` はロックを 1 回取ったまま判定と increment を行う
//!   （同じ artifact の最後の 1 枠を 2 つのリクエストが同時に取ることはない）
//! - ロックを保持したまま他の await はしない

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::store_state::StoreState;
use crate::domain::{Admission, Artifact, ArtifactId};
use crate::ports::{ArtifactStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    state: Mutex<StoreState>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn put(&self, artifact: Artifact) -> Result<ArtifactId, StoreError> {
        self.state.lock().await.insert(artifact)
    }

    async fn get(&self, id: ArtifactId) -> Result<Artifact, StoreError> {
        self.state.lock().await.get(id).cloned()
    }

    async fn list(&self) -> Result<Vec<Artifact>, StoreError> {
        Ok(self.state.lock().await.ordered().cloned().collect())
    }

    async fn delete(&self, id: ArtifactId) -> Result<Artifact, StoreError> {
        self.state.lock().await.remove(id)
    }

    async fn increment_access(&self, id: ArtifactId) -> Result<u64, StoreError> {
        self.state.lock().await.increment(id)
    }

    async fn consume_access(
        &self,
        id: ArtifactId,
        now: DateTime<Utc>,
    ) -> Result<Admission, StoreError> {
        self.state.lock().await.consume(id, now)
    }

    async fn reclaimable(&self, now: DateTime<Utc>) -> Result<Vec<ArtifactId>, StoreError> {
        Ok(self.state.lock().await.reclaimable(now))
    }
}
