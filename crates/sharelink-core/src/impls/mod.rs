//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryArtifactStore**: テスト・単一プロセス用のメタデータストア
//! - **JsonFileArtifactStore**: JSON スナップショットで永続化するメタデータストア
//! - **InMemoryBlobBackend**: テスト用の Blob ストレージ
//! - **FsBlobBackend**: ローカルファイルシステムの Blob ストレージ

mod blob_key;
mod store_state;

pub mod fs_blob;
pub mod inmem_blob;
pub mod inmem_store;
pub mod json_store;

// 主要な型を再エクスポート
pub use self::fs_blob::FsBlobBackend;
pub use self::inmem_blob::InMemoryBlobBackend;
pub use self::inmem_store::InMemoryArtifactStore;
pub use self::json_store::JsonFileArtifactStore;
