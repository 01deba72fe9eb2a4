//! Fake TTS Client - 用于测试的合成客户端
//!
//! 始终返回固定的音频字节，不调用外部服务，
//! 并记录调用次数、可脚本化失败

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::application::ports::{
    SynthesisError, SynthesisRequest, SynthesizedAudio, TtsProviderPort, VoiceInfo,
};
use crate::domain::audio::AudioFormat;

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 固定返回的音频字节
    pub audio_data: Vec<u8>,
    pub format: AudioFormat,
    /// 模拟的推理延迟（毫秒）
    pub latency_ms: u64,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            // 带 ID3 头的占位字节，能通过 mp3 文件头校验
            audio_data: b"ID3\x04\x00fake-mp3-payload".to_vec(),
            format: AudioFormat::Mp3,
            latency_ms: 5,
        }
    }
}

/// 脚本化失败类型
#[derive(Debug, Clone, Copy)]
pub enum FakeFailure {
    RateLimited,
    InvalidVoice,
    ProviderUnavailable,
    QuotaExceeded,
}

impl FakeFailure {
    fn to_error(self, voice_id: &str) -> SynthesisError {
        match self {
            FakeFailure::RateLimited => SynthesisError::RateLimited,
            FakeFailure::InvalidVoice => SynthesisError::InvalidVoice(voice_id.to_string()),
            FakeFailure::ProviderUnavailable => {
                SynthesisError::ProviderUnavailable("fake outage".to_string())
            }
            FakeFailure::QuotaExceeded => SynthesisError::QuotaExceeded,
        }
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
    call_count: AtomicU32,
    failure: Mutex<Option<FakeFailure>>,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        Self {
            config,
            call_count: AtomicU32::new(0),
            failure: Mutex::new(None),
        }
    }

    /// 已发生的合成调用次数
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// 设置后续调用的失败类型（None 恢复正常）
    pub fn set_failure(&self, failure: Option<FakeFailure>) {
        *self.failure.lock().unwrap() = failure;
    }
}

#[async_trait]
impl TtsProviderPort for FakeTtsClient {
    async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesizedAudio, SynthesisError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if let Some(failure) = *self.failure.lock().unwrap() {
            return Err(failure.to_error(&request.voice_id));
        }

        tracing::debug!(
            text_len = request.text.len(),
            voice_id = %request.voice_id,
            "FakeTtsClient: returning fixed audio"
        );

        Ok(SynthesizedAudio {
            data: self.config.audio_data.clone(),
            format: self.config.format,
        })
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        Ok(vec![
            VoiceInfo {
                voice_id: "fake-voice-1".to_string(),
                name: "Fake One".to_string(),
                category: Some("premade".to_string()),
            },
            VoiceInfo {
                voice_id: "fake-voice-2".to_string(),
                name: "Fake Two".to_string(),
                category: None,
            },
        ])
    }
}
