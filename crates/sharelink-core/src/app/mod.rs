//! App - アプリケーション層
//!
//! ports を組み合わせてサービスの操作を実装します。
//!
//! # 主要コンポーネント
//! - **ShareServiceBuilder**: サービスの構築とワイヤリング
//! - **ShareService**: API 層に公開する操作（create / describe / access / remove / sweep）
//! - **LinkIssuer**: id の発行と共有 URL の組み立て
//! - **SweepLoop**: アクセス不能になった artifact の定期回収

pub mod builder;
pub mod link;
pub mod service;
pub mod sweep_loop;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, ShareServiceBuilder};
pub use self::link::{LinkIssuer, build_share_url};
pub use self::service::ShareService;
pub use self::sweep_loop::{SweepHandle, SweepLoop};
