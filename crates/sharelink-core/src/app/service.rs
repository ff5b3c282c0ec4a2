//! ShareService - API 層に公開する操作
//!
//! # フロー
//! - create: 入力検証 →（ファイルなら）Blob 保存 → id 発行 → メタデータ保存
//! - access: ArtifactStore::consume_access（判定 + increment を原子的に）→ payload 取得
//! - remove: Blob 削除 → メタデータ削除（Blob 削除に失敗したらメタデータは残す）
//! - sweep: 恒久的にアクセス不能な artifact を remove
//!
//! 期限切れ・上限到達は遅延評価です（アクセス時に判定し、回収は sweep が行う）。

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use super::link::LinkIssuer;
use crate::domain::{
    AccessOutcome, AccessPayload, Admission, Artifact, ArtifactId, CreateOptions, Created,
    FileMeta, GateDecision, Payload, Removal, ShareError, SweepReport, TextBody,
};
use crate::ports::{ArtifactStore, BlobBackend, BlobError, Clock, StoreError};

/// Upper bound on id re-issues after a collision.
const MAX_ID_ATTEMPTS: usize = 3;

/// Size limits applied before any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_upload_bytes: u64,
    pub max_text_bytes: u64,
}

/// ShareService は artifact の作成・参照・アクセス・削除を提供
///
/// # 使用例
/// ```ignore
/// let service = ShareServiceBuilder::new(config).in_memory().build()?;
/// let created = service.create_text("Note", "Hello", CreateOptions::default().max_access(1)).await?;
/// let outcome = service.access(created.id).await?;
/// ```
pub struct ShareService {
    store: Arc<dyn ArtifactStore>,
    blobs: Arc<dyn BlobBackend>,
    clock: Arc<dyn Clock>,
    links: LinkIssuer,
    limits: UploadLimits,
    default_public: bool,
}

impl ShareService {
    pub(super) fn new(
        store: Arc<dyn ArtifactStore>,
        blobs: Arc<dyn BlobBackend>,
        clock: Arc<dyn Clock>,
        links: LinkIssuer,
        limits: UploadLimits,
        default_public: bool,
    ) -> Self {
        Self {
            store,
            blobs,
            clock,
            links,
            limits,
            default_public,
        }
    }

    pub async fn create_text(
        &self,
        title: &str,
        content: &str,
        options: CreateOptions,
    ) -> Result<Created, ShareError> {
        let now = self.clock.now();
        let expires_at = validate_options(&options, now)?;
        let title = title.trim();
        if title.is_empty() {
            return Err(ShareError::Validation("title is required".to_string()));
        }
        if content.is_empty() {
            return Err(ShareError::Validation("content is required".to_string()));
        }
        if content.len() as u64 > self.limits.max_text_bytes {
            return Err(ShareError::Validation(format!(
                "content is {} bytes, limit is {}",
                content.len(),
                self.limits.max_text_bytes
            )));
        }

        let payload = Payload::Text(TextBody {
            title: title.to_string(),
            content: content.to_string(),
        });
        let created = self.insert(payload, now, expires_at, &options).await?;
        info!(id = %created.id, kind = "text", "artifact created");
        Ok(created)
    }

    pub async fn create_file(
        &self,
        bytes: Bytes,
        original_name: &str,
        mime_type: &str,
        options: CreateOptions,
    ) -> Result<Created, ShareError> {
        let now = self.clock.now();
        let expires_at = validate_options(&options, now)?;
        let original_name = original_name.trim();
        let mime_type = mime_type.trim();
        if original_name.is_empty() {
            return Err(ShareError::Validation("original file name is required".to_string()));
        }
        if mime_type.is_empty() {
            return Err(ShareError::Validation("mime type is required".to_string()));
        }
        if bytes.is_empty() {
            return Err(ShareError::Validation("file is empty".to_string()));
        }
        let byte_size = bytes.len() as u64;
        if byte_size > self.limits.max_upload_bytes {
            return Err(ShareError::Validation(format!(
                "file is {byte_size} bytes, limit is {}",
                self.limits.max_upload_bytes
            )));
        }

        let blob_key = self.blobs.store(bytes, original_name).await?;
        let payload = Payload::File(FileMeta {
            original_name: original_name.to_string(),
            mime_type: mime_type.to_string(),
            byte_size,
            blob_key: blob_key.clone(),
        });

        match self.insert(payload, now, expires_at, &options).await {
            Ok(created) => {
                info!(id = %created.id, kind = "file", byte_size, "artifact created");
                Ok(created)
            }
            Err(err) => {
                // metadata never landed, so the blob must not stay behind
                if let Err(cleanup) = self.blobs.remove(&blob_key).await {
                    error!(key = %blob_key, error = %cleanup, "failed to discard orphaned blob");
                }
                Err(err)
            }
        }
    }

    async fn insert(
        &self,
        payload: Payload,
        now: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
        options: &CreateOptions,
    ) -> Result<Created, ShareError> {
        let is_public = options.is_public.unwrap_or(self.default_public);

        for _ in 0..MAX_ID_ATTEMPTS {
            let artifact = Artifact::new(self.links.issue_id(), now, payload.clone())
                .with_expires_at(expires_at)
                .with_max_access(options.max_access)
                .with_public(is_public);
            match self.store.put(artifact).await {
                Ok(id) => {
                    return Ok(Created {
                        id,
                        share_url: self.links.share_url(id),
                    });
                }
                Err(StoreError::Duplicate(id)) => {
                    warn!(%id, "artifact id collision, issuing another");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ShareError::Storage(
            "could not issue a unique artifact id".to_string(),
        ))
    }

    /// Metadata lookup. Does not consume an access.
    pub async fn describe(&self, id: ArtifactId) -> Result<Artifact, ShareError> {
        Ok(self.store.get(id).await?)
    }

    /// Administrative listing in insertion order. Not gated.
    pub async fn list(&self) -> Result<Vec<Artifact>, ShareError> {
        Ok(self.store.list().await?)
    }

    /// Gated access: consumes one access when allowed.
    pub async fn access(&self, id: ArtifactId) -> Result<AccessOutcome, ShareError> {
        let now = self.clock.now();
        let Admission { decision, artifact } = self.store.consume_access(id, now).await?;

        let access_count = match decision {
            GateDecision::Allowed(count) => count,
            GateDecision::Expired => {
                debug!(%id, "access denied: expired");
                return Ok(AccessOutcome::Expired);
            }
            GateDecision::LimitReached => {
                debug!(%id, "access denied: limit reached");
                return Ok(AccessOutcome::LimitReached);
            }
        };

        let payload = match artifact.payload {
            Payload::Text(TextBody { title, content }) => AccessPayload::Text { title, content },
            Payload::File(meta) => {
                let bytes = match self.blobs.retrieve(&meta.blob_key).await {
                    Ok(bytes) => bytes,
                    Err(BlobError::NotFound(key)) => {
                        // a concurrent remove takes the blob first, then the metadata
                        if let Err(StoreError::NotFound(_)) = self.store.get(id).await {
                            return Err(ShareError::NotFound(id));
                        }
                        error!(%id, %key, "metadata references a missing blob");
                        return Err(ShareError::Storage(format!(
                            "blob {key} of artifact {id} is missing"
                        )));
                    }
                    Err(e) => return Err(e.into()),
                };
                AccessPayload::File {
                    original_name: meta.original_name,
                    mime_type: meta.mime_type,
                    bytes,
                }
            }
        };

        debug!(%id, access_count, "access granted");
        Ok(AccessOutcome::Granted {
            payload,
            access_count,
        })
    }

    /// Delete metadata and, for files, the blob.
    ///
    /// The blob goes first. If that fails the metadata stays and the error is returned,
    /// so the artifact can be removed again later.
    pub async fn remove(&self, id: ArtifactId) -> Result<Removal, ShareError> {
        let artifact = self.store.get(id).await?;

        let mut blob_was_missing = false;
        if let Some(key) = artifact.blob_key() {
            match self.blobs.remove(key).await {
                Ok(()) => {}
                Err(BlobError::NotFound(key)) => {
                    warn!(%id, %key, "blob already missing, removing metadata anyway");
                    blob_was_missing = true;
                }
                Err(e) => {
                    error!(%id, error = %e, "blob removal failed, metadata kept");
                    return Err(e.into());
                }
            }
        }

        match self.store.delete(id).await {
            Ok(_) => {}
            Err(StoreError::NotFound(_)) => return Err(ShareError::NotFound(id)),
            Err(e) if artifact.blob_key().is_some() && !blob_was_missing => {
                error!(%id, error = %e, "blob removed but metadata delete failed");
                return Err(ShareError::Storage(format!(
                    "blob of artifact {id} was removed but its metadata could not be deleted: {e}"
                )));
            }
            Err(e) => return Err(e.into()),
        }

        info!(%id, kind = %artifact.kind(), "artifact removed");
        Ok(Removal {
            id,
            blob_was_missing,
        })
    }

    /// Remove every artifact the gate would permanently deny.
    pub async fn sweep(&self) -> Result<SweepReport, ShareError> {
        let now = self.clock.now();
        let candidates = self.store.reclaimable(now).await?;

        let mut report = SweepReport::default();
        for id in candidates {
            match self.remove(id).await {
                Ok(_) => report.removed.push(id),
                // already gone through an explicit remove
                Err(ShareError::NotFound(_)) => {}
                Err(e) => {
                    warn!(%id, error = %e, "sweep could not remove artifact");
                    report.failed.push((id, e.to_string()));
                }
            }
        }

        if !report.removed.is_empty() || !report.failed.is_empty() {
            info!(
                removed = report.removed.len(),
                failed = report.failed.len(),
                "sweep finished"
            );
        }
        Ok(report)
    }

    pub fn share_url(&self, id: ArtifactId) -> String {
        self.links.share_url(id)
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

/// Check the limits and resolve the expiry instant relative to `now`.
fn validate_options(
    options: &CreateOptions,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, ShareError> {
    if options.max_access == Some(0) {
        return Err(ShareError::Validation(
            "max_access must be at least 1".to_string(),
        ));
    }
    let Some(hours) = options.expires_in_hours else {
        return Ok(None);
    };
    if hours == 0 {
        return Err(ShareError::Validation(
            "expires_in must be at least 1 hour".to_string(),
        ));
    }
    Duration::try_hours(i64::from(hours))
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .map(Some)
        .ok_or_else(|| {
            ShareError::Validation(format!("expires_in of {hours} hours is out of range"))
        })
}
