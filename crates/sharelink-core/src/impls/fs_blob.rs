//! FsBlobBackend - ローカルファイルシステムの Blob ストレージ
//!
//! # レイアウト
//! `<root>/<ULID>-<sanitized name>` に 1 ファイル = 1 blob で保存します。
//!
//! # 実装詳細
//! - キーは乱数 + 元ファイル名の安全化した末尾（内容からは導出しない）
//! - 書き込みは `.<key>.part` に書いてから rename
//! - root の外を指すキー（`/`, `\`, `..`, 先頭 `.`）は拒否

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;

use super::blob_key::issue_key;
use crate::domain::BlobKey;
use crate::ports::{BlobBackend, BlobError};

#[derive(Debug, Clone)]
pub struct FsBlobBackend {
    root: PathBuf,
}

impl FsBlobBackend {
    /// Open the backend, creating `root` when missing.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, BlobError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &BlobKey) -> Result<PathBuf, BlobError> {
        let raw = key.as_str();
        let escapes = raw.is_empty()
            || raw.starts_with('.')
            || raw.contains('/')
            || raw.contains('\\')
            || raw.contains("..");
        if escapes {
            return Err(BlobError::InvalidKey(raw.to_string()));
        }
        Ok(self.root.join(raw))
    }
}

#[async_trait]
impl BlobBackend for FsBlobBackend {
    async fn store(&self, bytes: Bytes, suggested_name: &str) -> Result<BlobKey, BlobError> {
        let key = issue_key(suggested_name);
        let path = self.path_for(&key)?;
        let part = self.root.join(format!(".{}.part", key.as_str()));

        write_atomically(&part, &path, &bytes).await?;

        tracing::debug!(key = %key, bytes = bytes.len(), "stored blob");
        Ok(key)
    }

    async fn retrieve(&self, key: &BlobKey) -> Result<Bytes, BlobError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(raw) => Ok(Bytes::from(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(key.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, key: &BlobKey) -> Result<(), BlobError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(key.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `bytes` to `part`, flush to disk, then move it to `path`.
/// `part` never outlives a failure.
async fn write_atomically(part: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let written = async {
        let mut file = tokio::fs::File::create(part).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(part, path).await
    }
    .await;
    if written.is_err() {
        let _ = tokio::fs::remove_file(part).await;
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn store_retrieve_remove_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = FsBlobBackend::open(dir.path().join("blobs")).await.unwrap();

        let key = blobs
            .store(Bytes::from_static(b"\x89PNG"), "a.png")
            .await
            .unwrap();
        assert!(blobs.root().join(key.as_str()).exists());
        assert_eq!(
            blobs.retrieve(&key).await.unwrap(),
            Bytes::from_static(b"\x89PNG")
        );

        blobs.remove(&key).await.unwrap();
        assert!(matches!(blobs.retrieve(&key).await, Err(BlobError::NotFound(_))));
        assert!(matches!(blobs.remove(&key).await, Err(BlobError::NotFound(_))));

        let leftovers: Vec<_> = std::fs::read_dir(blobs.root()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn failed_rename_leaves_no_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = FsBlobBackend::open(dir.path()).await.unwrap();
        let key = issue_key("a.txt");
        let path = blobs.path_for(&key).unwrap();
        let part = blobs.root().join(format!(".{}.part", key.as_str()));

        // a non-empty directory cannot be replaced by a file
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), b"x").unwrap();

        assert!(write_atomically(&part, &path, b"abc").await.is_err());
        assert!(!part.exists());
        assert!(path.join("occupied").exists());
    }

    #[rstest]
    #[case::parent("../secret")]
    #[case::nested("a/b")]
    #[case::hidden(".part")]
    #[case::empty("")]
    #[tokio::test]
    async fn keys_outside_root_are_rejected(#[case] raw: &str) {
        let dir = tempfile::tempdir().unwrap();
        let blobs = FsBlobBackend::open(dir.path()).await.unwrap();
        let key = BlobKey::new(raw);
        assert!(matches!(blobs.retrieve(&key).await, Err(BlobError::InvalidKey(_))));
        assert!(matches!(blobs.remove(&key).await, Err(BlobError::InvalidKey(_))));
    }
}
