//! sharelink-core
//!
//! 期限付きで共有できる artifact（ファイル / テキスト）の中核ライブラリ。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, artifact, gate, outcome, errors）
//! - **ports**: 抽象化レイヤー（ArtifactStore, BlobBackend, Clock, IdGenerator）
//! - **impls**: 実装（InMemory / JSON ファイル / ファイルシステム）
//! - **app**: アプリケーションロジック（builder, service, link, sweep_loop）
//! - **config**: 設定（TOML + デフォルト値）

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{ShareService, ShareServiceBuilder, SweepLoop};
pub use config::ShareConfig;
pub use domain::{AccessOutcome, Artifact, ArtifactId, ShareError};
