//! TTS Provider Port - 语音合成网关
//!
//! 外部 TTS 服务的无状态抽象接口，本身不做任何缓存，
//! 缓存由应用层编排

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::audio::AudioFormat;

/// 合成错误
///
/// `RateLimited` / `ProviderUnavailable` 可由调用方退避重试，
/// `InvalidVoice` / `QuotaExceeded` 不可自动重试
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Provider rate limit hit")]
    RateLimited,

    #[error("Unknown voice: {0}")]
    InvalidVoice(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Provider quota exceeded")]
    QuotaExceeded,
}

impl SynthesisError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SynthesisError::RateLimited | SynthesisError::ProviderUnavailable(_)
        )
    }
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    /// 请求携带的 voice settings；缺省字段由具体实现合并默认值
    pub voice_settings: Value,
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub data: Vec<u8>,
    pub format: AudioFormat,
}

/// 音色信息（目录查询）
#[derive(Debug, Clone)]
pub struct VoiceInfo {
    pub voice_id: String,
    pub name: String,
    pub category: Option<String>,
}

/// TTS Provider Port
#[async_trait]
pub trait TtsProviderPort: Send + Sync {
    /// 调用外部服务合成音频
    ///
    /// 请求须有有界超时；超时按 `ProviderUnavailable` 上报
    async fn synthesize(&self, request: SynthesisRequest)
        -> Result<SynthesizedAudio, SynthesisError>;

    /// 列出可用音色
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(SynthesisError::RateLimited.is_retryable());
        assert!(SynthesisError::ProviderUnavailable("down".into()).is_retryable());
        assert!(!SynthesisError::InvalidVoice("v".into()).is_retryable());
        assert!(!SynthesisError::QuotaExceeded.is_retryable());
    }
}
