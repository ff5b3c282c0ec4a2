//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait はメタデータストア・Blob ストレージ・時刻・ID 生成への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - ArtifactStore がメタデータの正本（source of truth）
//! - BlobBackend はファイル本体のみ（テキストはメタデータ内に保持）
//! - すべての port は `Send + Sync`（`Arc<dyn ...>` で共有）

pub mod artifact_store;
pub mod blob_backend;
pub mod clock;
pub mod id_generator;

// 主要な trait を再エクスポート
pub use self::artifact_store::{ArtifactStore, StoreError};
pub use self::blob_backend::{BlobBackend, BlobError};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, RandomIdGenerator};
