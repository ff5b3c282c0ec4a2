//! ArtifactStore port - メタデータの正本
//!
//! ArtifactStore は artifact id → メタデータの対応を保持します。
//!
//! # 実装
//! - **InMemoryArtifactStore**: テスト・単一プロセス用
//! - **JsonFileArtifactStore**: JSON スナップショットで永続化する単一プロセス用
//!
//! 複数インスタンス構成では `consume_access` を条件付き更新
//! （例: `UPDATE ... SET access_count = access_count + 1 WHERE ...`）で実装できる
//! ストアに差し替える必要があります。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{Admission, Artifact, ArtifactId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact not found: {0}")]
    NotFound(ArtifactId),

    #[error("artifact id already in use: {0}")]
    Duplicate(ArtifactId),

    #[error("invalid artifact: {0}")]
    Validation(String),

    #[error("metadata I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("metadata encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// ArtifactStore はメタデータの作成・参照・削除とアクセスカウントを管理
///
/// # 設計原則
/// - `access_count` を変更できるのは `increment_access` と `consume_access` だけ
/// - `consume_access` は判定と increment を 1 つの原子操作として行う
/// - `list` は挿入順（管理用、ゲートは通さない）
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store a new record. The id must already be issued; a reused id is rejected.
    async fn put(&self, artifact: Artifact) -> Result<ArtifactId, StoreError>;

    async fn get(&self, id: ArtifactId) -> Result<Artifact, StoreError>;

    async fn list(&self) -> Result<Vec<Artifact>, StoreError>;

    /// Remove the metadata and return the removed record.
    async fn delete(&self, id: ArtifactId) -> Result<Artifact, StoreError>;

    /// Unconditionally bump `access_count`, returning the new value.
    async fn increment_access(&self, id: ArtifactId) -> Result<u64, StoreError>;

    /// Atomic check-and-increment against the gate.
    async fn consume_access(
        &self,
        id: ArtifactId,
        now: DateTime<Utc>,
    ) -> Result<Admission, StoreError>;

    /// Ids whose gate would permanently deny access at `now`.
    async fn reclaimable(&self, now: DateTime<Utc>) -> Result<Vec<ArtifactId>, StoreError>;
}
