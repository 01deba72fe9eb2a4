//! ElevenLabs Client - 调用外部 TTS HTTP 服务
//!
//! 实现 TtsProviderPort trait，通过 HTTP 调用 ElevenLabs 兼容 API
//!
//! 外部 API:
//! POST {base_url}/v1/text-to-speech/{voice_id}
//! Request: {"text": "...", "voice_settings": {...}}  (JSON, header xi-api-key)
//! Response: audio/mpeg binary
//! GET {base_url}/v1/voices -> {"voices": [...]}

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::application::ports::{
    SynthesisError, SynthesisRequest, SynthesizedAudio, TtsProviderPort, VoiceInfo,
};
use crate::domain::audio::AudioFormat;

/// ElevenLabs 客户端配置
#[derive(Debug, Clone)]
pub struct ElevenLabsClientConfig {
    /// API 基础 URL
    pub base_url: String,
    /// API 凭证
    pub api_key: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for ElevenLabsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".to_string(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

/// 错误响应体
/// {"detail": {"status": "quota_exceeded", "message": "..."}}
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    detail: Option<ProviderErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    status: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VoicesBody {
    voices: Vec<VoiceItem>,
}

#[derive(Debug, Deserialize)]
struct VoiceItem {
    voice_id: String,
    name: String,
    category: Option<String>,
}

/// ElevenLabs 客户端
pub struct ElevenLabsClient {
    client: Client,
    config: ElevenLabsClientConfig,
}

impl ElevenLabsClient {
    /// 创建新的客户端
    pub fn new(config: ElevenLabsClientConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::ProviderUnavailable(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn synthesize_url(&self, voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{}", self.config.base_url, voice_id)
    }

    fn voices_url(&self) -> String {
        format!("{}/v1/voices", self.config.base_url)
    }

    fn map_transport_error(e: reqwest::Error) -> SynthesisError {
        if e.is_timeout() {
            // 超时按服务不可用上报，由调用方决定是否重试
            SynthesisError::ProviderUnavailable("Request timed out".to_string())
        } else if e.is_connect() {
            SynthesisError::ProviderUnavailable(format!("Cannot connect to provider: {}", e))
        } else {
            SynthesisError::ProviderUnavailable(e.to_string())
        }
    }

    fn map_error_response(status: StatusCode, body: &str, voice_id: &str) -> SynthesisError {
        let detail = serde_json::from_str::<ProviderErrorBody>(body)
            .ok()
            .and_then(|b| b.detail);
        let detail_status = detail.as_ref().and_then(|d| d.status.as_deref());
        let message = detail
            .as_ref()
            .and_then(|d| d.message.clone())
            .unwrap_or_else(|| body.chars().take(200).collect());

        classify_provider_error(status, detail_status, &message, voice_id)
    }
}

/// 将 provider 的 HTTP 状态与错误详情归入合成错误分类
fn classify_provider_error(
    status: StatusCode,
    detail_status: Option<&str>,
    message: &str,
    voice_id: &str,
) -> SynthesisError {
    match detail_status {
        Some("quota_exceeded") => return SynthesisError::QuotaExceeded,
        Some("voice_not_found") | Some("invalid_voice_id") => {
            return SynthesisError::InvalidVoice(voice_id.to_string())
        }
        _ => {}
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => SynthesisError::RateLimited,
        StatusCode::NOT_FOUND => SynthesisError::InvalidVoice(voice_id.to_string()),
        _ => SynthesisError::ProviderUnavailable(format!("HTTP {}: {}", status, message)),
    }
}

/// 合并默认 voice settings，请求值优先
///
/// 只影响发往 provider 的请求体，不影响缓存指纹
fn merged_voice_settings(requested: &Value) -> Value {
    let mut merged = json!({
        "stability": 0.75,
        "similarity_boost": 0.75,
        "style": 0.0,
        "use_speaker_boost": true,
    });
    if let (Some(target), Some(source)) = (merged.as_object_mut(), requested.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    merged
}

#[async_trait]
impl TtsProviderPort for ElevenLabsClient {
    async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesizedAudio, SynthesisError> {
        let body = json!({
            "text": request.text,
            "voice_settings": merged_voice_settings(&request.voice_settings),
        });

        tracing::debug!(
            voice_id = %request.voice_id,
            text_len = request.text.len(),
            "Sending synthesis request"
        );

        let response = self
            .client
            .post(self.synthesize_url(&request.voice_id))
            .header("xi-api-key", &self.config.api_key)
            .header("accept", AudioFormat::Mp3.content_type())
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::map_error_response(status, &error_text, &request.voice_id));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| {
                SynthesisError::ProviderUnavailable(format!("Failed to read audio: {}", e))
            })?
            .to_vec();

        tracing::info!(
            voice_id = %request.voice_id,
            audio_size = data.len(),
            "Synthesis completed"
        );

        Ok(SynthesizedAudio {
            data,
            format: AudioFormat::Mp3,
        })
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        let response = self
            .client
            .get(self.voices_url())
            .header("xi-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::map_error_response(status, &error_text, ""));
        }

        let body: VoicesBody = response.json().await.map_err(|e| {
            SynthesisError::ProviderUnavailable(format!("Invalid voices response: {}", e))
        })?;

        Ok(body
            .voices
            .into_iter()
            .map(|v| VoiceInfo {
                voice_id: v.voice_id,
                name: v.name,
                category: v.category,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ElevenLabsClientConfig::default();
        assert_eq!(config.base_url, "https://api.elevenlabs.io");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_merged_settings_request_wins() {
        let merged = merged_voice_settings(&json!({"stability": 0.3}));
        assert_eq!(merged["stability"], json!(0.3));
        assert_eq!(merged["similarity_boost"], json!(0.75));
        assert_eq!(merged["use_speaker_boost"], json!(true));
    }

    #[test]
    fn test_merged_settings_empty_request() {
        let merged = merged_voice_settings(&json!({}));
        assert_eq!(merged["stability"], json!(0.75));
        assert_eq!(merged["style"], json!(0.0));
    }

    #[test]
    fn test_error_classification() {
        assert!(matches!(
            classify_provider_error(StatusCode::TOO_MANY_REQUESTS, None, "", "v"),
            SynthesisError::RateLimited
        ));
        assert!(matches!(
            classify_provider_error(StatusCode::UNAUTHORIZED, Some("quota_exceeded"), "", "v"),
            SynthesisError::QuotaExceeded
        ));
        assert!(matches!(
            classify_provider_error(StatusCode::BAD_REQUEST, Some("voice_not_found"), "", "v"),
            SynthesisError::InvalidVoice(_)
        ));
        assert!(matches!(
            classify_provider_error(StatusCode::NOT_FOUND, None, "", "v"),
            SynthesisError::InvalidVoice(_)
        ));
        assert!(matches!(
            classify_provider_error(StatusCode::BAD_GATEWAY, None, "", "v"),
            SynthesisError::ProviderUnavailable(_)
        ));
    }
}
