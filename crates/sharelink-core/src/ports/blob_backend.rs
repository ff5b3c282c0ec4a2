//! BlobBackend port - ファイル本体の保存先
//!
//! # 実装
//! - **InMemoryBlobBackend**: テスト用
//! - **FsBlobBackend**: ローカルファイルシステム（storage root 配下）
//!
//! バージョニング・重複排除・圧縮はしません。artifact ごとに
//! 1 回書いて、何度も読んで、1 回消すだけのオブジェクトです。

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::domain::BlobKey;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(BlobKey),

    #[error("invalid blob key: {0:?}")]
    InvalidKey(String),

    #[error("blob I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// BlobBackend は生のバイト列を content-neutral なキーで保存
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Persist `bytes` and return a freshly issued key.
    ///
    /// `suggested_name` only decorates the key; the key never depends on the content.
    async fn store(&self, bytes: Bytes, suggested_name: &str) -> Result<BlobKey, BlobError>;

    async fn retrieve(&self, key: &BlobKey) -> Result<Bytes, BlobError>;

    async fn remove(&self, key: &BlobKey) -> Result<(), BlobError>;
}
