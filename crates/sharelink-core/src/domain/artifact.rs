//! Artifact record: shared access-control fields + kind-specific payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::gate::{self, Verdict};
use super::ids::{ArtifactId, BlobKey};

/// Metadata of an uploaded file. The bytes live in the BlobBackend under `blob_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub original_name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub blob_key: BlobKey,
}

/// Inline text payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBody {
    pub title: String,
    pub content: String,
}

/// Kind-specific part of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    File(FileMeta),
    Text(TextBody),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    File,
    Text,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::File => f.write_str("file"),
            ArtifactKind::Text => f.write_str("text"),
        }
    }
}

/// Derived lifecycle state at a given instant.
///
/// `Expired` と `Exhausted` はどちらも終端状態（時間は戻らず、カウントは減らない）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Active,
    Expired,
    Exhausted,
}

/// A shareable unit of content with its own access-control metadata.
///
/// Design:
/// - `access_count` は ArtifactStore の increment / consume 経由でのみ変化する
/// - それ以外のフィールドは作成後に変更しない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub created_at: DateTime<Utc>,
    /// `None` means the artifact never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// `None` means unlimited access.
    pub max_access: Option<u64>,
    pub access_count: u64,
    pub is_public: bool,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Artifact {
    pub fn new(id: ArtifactId, created_at: DateTime<Utc>, payload: Payload) -> Self {
        Self {
            id,
            created_at,
            expires_at: None,
            max_access: None,
            access_count: 0,
            is_public: true,
            payload,
        }
    }

    pub fn with_expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn with_max_access(mut self, max_access: Option<u64>) -> Self {
        self.max_access = max_access;
        self
    }

    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn kind(&self) -> ArtifactKind {
        match self.payload {
            Payload::File(_) => ArtifactKind::File,
            Payload::Text(_) => ArtifactKind::Text,
        }
    }

    /// Blob key of a file artifact, `None` for text.
    pub fn blob_key(&self) -> Option<&BlobKey> {
        match &self.payload {
            Payload::File(meta) => Some(&meta.blob_key),
            Payload::Text(_) => None,
        }
    }

    /// Remaining permitted accesses, `None` when unlimited.
    pub fn remaining_accesses(&self) -> Option<u64> {
        self.max_access
            .map(|max| max.saturating_sub(self.access_count))
    }

    pub fn status(&self, now: DateTime<Utc>) -> ArtifactStatus {
        match gate::evaluate(self, now) {
            Verdict::Allowed => ArtifactStatus::Active,
            Verdict::Expired => ArtifactStatus::Expired,
            Verdict::LimitReached => ArtifactStatus::Exhausted,
        }
    }

    /// Check that every field required for this kind is present.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_access == Some(0) {
            return Err("max_access must be at least 1".to_string());
        }
        if let Some(expires_at) = self.expires_at
            && expires_at <= self.created_at
        {
            return Err("expires_at must be after created_at".to_string());
        }
        match &self.payload {
            Payload::File(meta) => {
                if meta.original_name.trim().is_empty() {
                    return Err("file artifact requires original_name".to_string());
                }
                if meta.mime_type.trim().is_empty() {
                    return Err("file artifact requires mime_type".to_string());
                }
                if meta.blob_key.as_str().is_empty() {
                    return Err("file artifact requires blob_key".to_string());
                }
            }
            Payload::Text(body) => {
                if body.title.trim().is_empty() {
                    return Err("text artifact requires title".to_string());
                }
                if body.content.is_empty() {
                    return Err("text artifact requires content".to_string());
                }
            }
        }
        Ok(())
    }
}
