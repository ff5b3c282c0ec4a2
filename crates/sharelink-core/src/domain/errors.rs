//! Errors - サービス境界のエラー型
//!
//! # 分類
//! - Validation: 入力不備（状態変更の前に拒否）
//! - NotFound: 未知の id（一度も存在しなかった / 削除済み）
//! - Storage: Blob / メタデータの I/O 失敗（握りつぶさない）
//!
//! `Expired` と `LimitReached` はエラーではなく、[`super::AccessOutcome`] の値として返します。

use thiserror::Error;

use super::ids::ArtifactId;
use crate::ports::{BlobError, StoreError};

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("artifact not found: {0}")]
    NotFound(ArtifactId),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl ShareError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ShareError::NotFound(_))
    }
}

impl From<StoreError> for ShareError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ShareError::NotFound(id),
            StoreError::Validation(msg) => ShareError::Validation(msg),
            other => ShareError::Storage(other.to_string()),
        }
    }
}

impl From<BlobError> for ShareError {
    fn from(err: BlobError) -> Self {
        ShareError::Storage(err.to_string())
    }
}
