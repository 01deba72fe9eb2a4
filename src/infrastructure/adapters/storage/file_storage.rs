//! File Storage - 文件系统音频存储实现
//!
//! 实现 ArtifactStorePort trait，所有音频文件放在单一目录下，
//! 以文件名寻址

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{ArtifactStoreError, ArtifactStorePort, AudioLocation};
use crate::domain::audio::AudioFormat;

/// 文件系统音频存储
pub struct FsArtifactStore {
    /// 存储根目录
    base_dir: PathBuf,
    /// 单个文件大小上限（字节）
    max_bytes: u64,
}

impl FsArtifactStore {
    /// 创建新的文件存储
    pub async fn new(
        base_dir: impl AsRef<Path>,
        max_bytes: u64,
    ) -> Result<Self, ArtifactStoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| ArtifactStoreError::IoError(e.to_string()))?;

        Ok(Self { base_dir, max_bytes })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 音频文件的绝对路径
    pub fn resolve_path(&self, location: &AudioLocation) -> PathBuf {
        self.base_dir.join(&location.file_name)
    }
}

#[async_trait]
impl ArtifactStorePort for FsArtifactStore {
    async fn store(
        &self,
        data: &[u8],
        declared_type: &str,
        stem: &str,
    ) -> Result<(AudioLocation, AudioFormat), ArtifactStoreError> {
        // 所有校验都在写盘前完成
        let format = AudioFormat::from_mime(declared_type).ok_or_else(|| {
            ArtifactStoreError::InvalidFormat(format!(
                "Unsupported type {:?}, accepted: mp3, wav, m4a, ogg, webm",
                declared_type
            ))
        })?;

        let size = data.len() as u64;
        if size > self.max_bytes {
            return Err(ArtifactStoreError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        if !format.matches_signature(data) {
            return Err(ArtifactStoreError::InvalidFormat(format!(
                "Content does not look like {}",
                format
            )));
        }

        let location = AudioLocation::new(format!("{}.{}", stem, format.extension()));
        let path = self.resolve_path(&location);

        fs::write(&path, data)
            .await
            .map_err(|e| ArtifactStoreError::IoError(e.to_string()))?;

        tracing::debug!(
            file_name = %location.file_name,
            size_bytes = size,
            "Audio artifact stored"
        );

        Ok((location, format))
    }

    async fn retrieve(&self, location: &AudioLocation) -> Result<Vec<u8>, ArtifactStoreError> {
        let path = self.resolve_path(location);

        if !path.exists() {
            return Err(ArtifactStoreError::NotFound(location.file_name.clone()));
        }

        fs::read(&path)
            .await
            .map_err(|e| ArtifactStoreError::IoError(e.to_string()))
    }

    async fn delete(&self, location: &AudioLocation) -> Result<bool, ArtifactStoreError> {
        let path = self.resolve_path(location);

        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| ArtifactStoreError::IoError(e.to_string()))?;

        tracing::debug!(file_name = %location.file_name, "Audio artifact deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const WAV_BYTES: &[u8] = b"RIFF\x24\x00\x00\x00WAVEfmt fake";

    async fn store(max_bytes: u64) -> (FsArtifactStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path(), max_bytes).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let (store, _dir) = store(1024).await;

        let (location, format) = store.store(WAV_BYTES, "audio/wav", "clip").await.unwrap();
        assert_eq!(location.file_name, "clip.wav");
        assert_eq!(format, AudioFormat::Wav);
        assert_eq!(location.public_url(), "/storage/audio/clip.wav");

        let data = store.retrieve(&location).await.unwrap();
        assert_eq!(data, WAV_BYTES);
    }

    #[tokio::test]
    async fn test_rejects_undeclared_type_without_writing() {
        let (store, dir) = store(1024).await;

        let err = store
            .store(b"some bytes", "text/plain", "clip")
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactStoreError::InvalidFormat(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_mismatched_signature() {
        let (store, dir) = store(1024).await;

        let err = store
            .store(b"OggS but declared wav", "audio/wav", "clip")
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactStoreError::InvalidFormat(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_oversized_before_write() {
        let (store, dir) = store(4).await;

        let err = store.store(WAV_BYTES, "audio/wav", "clip").await.unwrap_err();
        assert!(matches!(err, ArtifactStoreError::TooLarge { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (store, _dir) = store(1024).await;

        let (location, _) = store.store(WAV_BYTES, "audio/wav", "clip").await.unwrap();
        assert!(store.delete(&location).await.unwrap());
        // 第二次删除不是错误
        assert!(!store.delete(&location).await.unwrap());

        assert!(matches!(
            store.retrieve(&location).await,
            Err(ArtifactStoreError::NotFound(_))
        ));
    }
}
