//! Inputs and results of the service operations.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::ids::ArtifactId;

/// Optional limits supplied at upload time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOptions {
    /// Lifetime in hours from creation; `None` means never expires.
    pub expires_in_hours: Option<u32>,
    /// Number of permitted accesses; `None` means unlimited.
    pub max_access: Option<u64>,
    /// Visibility label; falls back to the configured default.
    pub is_public: Option<bool>,
}

impl CreateOptions {
    pub fn expires_in_hours(mut self, hours: u32) -> Self {
        self.expires_in_hours = Some(hours);
        self
    }

    pub fn max_access(mut self, max: u64) -> Self {
        self.max_access = Some(max);
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = Some(is_public);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub id: ArtifactId,
    pub share_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessPayload {
    Text {
        title: String,
        content: String,
    },
    File {
        original_name: String,
        mime_type: String,
        #[serde(skip)]
        bytes: Bytes,
    },
}

/// Result of a gated access.
///
/// `Expired` / `LimitReached` は「存在したがもうアクセスできない」ことを表し、
/// `ShareError::NotFound`（存在しない）とは区別されます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AccessOutcome {
    Granted {
        payload: AccessPayload,
        access_count: u64,
    },
    Expired,
    LimitReached,
}

impl AccessOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessOutcome::Granted { .. })
    }

    pub fn access_count(&self) -> Option<u64> {
        match self {
            AccessOutcome::Granted { access_count, .. } => Some(*access_count),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    pub id: ArtifactId,
    /// The metadata referenced a blob that was already gone.
    pub blob_was_missing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub removed: Vec<ArtifactId>,
    pub failed: Vec<(ArtifactId, String)>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
