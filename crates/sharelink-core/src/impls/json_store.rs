//! JsonFileArtifactStore - JSON スナップショットで永続化するメタデータストア
//!
//! # 実装詳細
//! - メモリ上の StoreState が正本、変更のたびにファイル全体を書き直す
//! - 書き込みは一時ファイル + rename（途中で落ちても壊れたファイルを残さない）
//! - 変更はコピーに対して行い、永続化に成功してから差し替える
//!   （書き込み失敗時にメモリとディスクがずれない）
//! - 永続化もロックの内側で行うので `consume_access` の原子性は保たれる
//!
//! 単一プロセス専用です。複数プロセスから同じファイルを開かないでください。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::store_state::StoreState;
use crate::domain::{Admission, Artifact, ArtifactId, GateDecision};
use crate::ports::{ArtifactStore, StoreError};

#[derive(Debug)]
pub struct JsonFileArtifactStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileArtifactStore {
    /// Open (or lazily create) the store backed by `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records: Vec<Artifact> = match tokio::fs::read(&path).await {
            Ok(raw) if raw.is_empty() => Vec::new(),
            Ok(raw) => serde_json::from_slice(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let state = StoreState::from_records(records)?;
        tracing::debug!(path = %path.display(), records = state.len(), "opened metadata store");
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        let records: Vec<&Artifact> = state.ordered().collect();
        let json = serde_json::to_vec_pretty(&records)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Apply `op` to a copy of the state, persist it, then swap it in.
    async fn commit<T>(
        &self,
        op: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.state.lock().await;
        let mut next = guard.clone();
        let out = op(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }
}

#[async_trait]
impl ArtifactStore for JsonFileArtifactStore {
    async fn put(&self, artifact: Artifact) -> Result<ArtifactId, StoreError> {
        self.commit(|state| state.insert(artifact)).await
    }

    async fn get(&self, id: ArtifactId) -> Result<Artifact, StoreError> {
        self.state.lock().await.get(id).cloned()
    }

    async fn list(&self) -> Result<Vec<Artifact>, StoreError> {
        Ok(self.state.lock().await.ordered().cloned().collect())
    }

    async fn delete(&self, id: ArtifactId) -> Result<Artifact, StoreError> {
        self.commit(|state| state.remove(id)).await
    }

    async fn increment_access(&self, id: ArtifactId) -> Result<u64, StoreError> {
        self.commit(|state| state.increment(id)).await
    }

    async fn consume_access(
        &self,
        id: ArtifactId,
        now: DateTime<Utc>,
    ) -> Result<Admission, StoreError> {
        let mut guard = self.state.lock().await;
        let mut next = guard.clone();
        let admission = next.consume(id, now)?;
        // Denials change nothing, so there is nothing to write.
        if let GateDecision::Allowed(_) = admission.decision {
            self.persist(&next).await?;
            *guard = next;
        }
        Ok(admission)
    }

    async fn reclaimable(&self, now: DateTime<Utc>) -> Result<Vec<ArtifactId>, StoreError> {
        Ok(self.state.lock().await.reclaimable(now))
    }
}
