//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **RandomIdGenerator**: 128-bit すべて乱数（本番用）
//!
//! 共有リンクの id は推測されにくいことが重要なので、ULID の時刻部分は使わず
//! 128-bit を丸ごと `rand` で埋めます。衝突確率はサービスの寿命を通して無視できる水準です。

use crate::domain::ArtifactId;

/// IdGenerator は共有用の ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数タスクから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_artifact_id(&self) -> ArtifactId;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate_artifact_id(&self) -> ArtifactId {
        ArtifactId::from_u128(rand::random())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_generator_does_not_repeat() {
        let id_gen = RandomIdGenerator;
        let ids: HashSet<ArtifactId> = (0..10_000).map(|_| id_gen.generate_artifact_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn ids_render_as_26_chars() {
        let id = RandomIdGenerator.generate_artifact_id();
        assert_eq!(id.to_string().len(), 26);
    }
}
