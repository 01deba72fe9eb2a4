//! Artifact Store Port - 音频文件存储
//!
//! 定义音频字节的写入 / 读取 / 删除抽象接口，
//! 具体实现使用文件系统

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::AudioFormat;

/// 音频文件存储错误
#[derive(Debug, Error)]
pub enum ArtifactStoreError {
    #[error("Artifact not found: {0}")]
    NotFound(String),

    /// 声明类型不在接受集合内，或文件头与声明不符
    #[error("Invalid audio format: {0}")]
    InvalidFormat(String),

    #[error("Artifact too large: {size} bytes, limit {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("IO error: {0}")]
    IoError(String),
}

/// 音频文件的存储定位
///
/// 以文件名寻址；对外播放 URL 由此派生
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioLocation {
    pub file_name: String,
}

impl AudioLocation {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// 可播放的相对 URL
    pub fn public_url(&self) -> String {
        format!("/storage/audio/{}", self.file_name)
    }
}

/// Artifact Store Port
#[async_trait]
pub trait ArtifactStorePort: Send + Sync {
    /// 持久化音频字节
    ///
    /// `declared_type` 为 MIME 类型，不在接受集合
    /// {mp3, wav, m4a, ogg, webm} 内时返回 `InvalidFormat`；
    /// 超过大小上限返回 `TooLarge`。两种校验都在写盘前完成
    async fn store(
        &self,
        data: &[u8],
        declared_type: &str,
        stem: &str,
    ) -> Result<(AudioLocation, AudioFormat), ArtifactStoreError>;

    /// 读取音频字节
    async fn retrieve(&self, location: &AudioLocation) -> Result<Vec<u8>, ArtifactStoreError>;

    /// 删除音频文件
    ///
    /// 幂等：文件不存在返回 Ok(false)，不视为错误
    async fn delete(&self, location: &AudioLocation) -> Result<bool, ArtifactStoreError>;
}
