//! Domain identifiers (strongly-typed IDs).
//!
//! # ArtifactId
//! 共有 URL に載る識別子です。128-bit すべてを乱数で埋め、
//! 表記には ULID と同じ Crockford base32（26 文字）を使います。
//!
//! ULID の時刻部分は使いません。共有 URL から作成時刻が推測できないようにするためです。
//!
//! # BlobKey
//! BlobBackend 内でのバイト列の置き場所。内容から導出しない不透明な文字列です。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Identifier of a shared artifact.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(Ulid);

impl ArtifactId {
    /// 128-bit の値から ArtifactId を作成
    pub fn from_u128(value: u128) -> Self {
        Self(Ulid::from(value))
    }

    /// 内部の ULID 表現を取得
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for ArtifactId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse error for [`ArtifactId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid artifact id: {0:?}")]
pub struct ParseArtifactIdError(pub String);

impl FromStr for ArtifactId {
    type Err = ParseArtifactIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s.trim())
            .map(Self)
            .map_err(|_| ParseArtifactIdError(s.to_string()))
    }
}

/// Storage key of a blob inside a [`crate::ports::BlobBackend`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobKey(String);

impl BlobKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_id_display_parse_roundtrip() {
        let id = ArtifactId::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        let text = id.to_string();
        assert_eq!(text.len(), 26);
        assert_eq!(text.parse::<ArtifactId>().unwrap(), id);
    }

    #[test]
    fn artifact_id_parse_rejects_garbage() {
        let err = "not-an-id".parse::<ArtifactId>().unwrap_err();
        assert_eq!(err, ParseArtifactIdError("not-an-id".to_string()));
    }

    #[test]
    fn artifact_id_serializes_as_plain_string() {
        let id = ArtifactId::from_u128(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn artifact_id_is_128_bits() {
        assert_eq!(std::mem::size_of::<ArtifactId>(), 16);
    }
}
