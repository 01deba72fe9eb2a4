//! Data Transfer Objects

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::application::ports::{
    CacheEntryRecord, CacheStatistics, CustomAudioRecord, VoiceInfo,
};
use crate::domain::audio::AudioSource;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Speech DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    pub voice_id: Option<String>,
    pub voice_settings: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct TtsResponse {
    pub text_hash: String,
    pub audio_url: String,
    pub cached: bool,
    pub voice_id: String,
    pub file_size: u64,
    pub duration_secs: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CacheEntryResponse {
    pub text_hash: String,
    pub text: String,
    pub voice_id: String,
    pub voice_settings: Value,
    pub audio_url: String,
    pub file_name: String,
    pub file_size: u64,
    pub duration_secs: Option<f64>,
    pub source: AudioSource,
    pub created_at: String,
    pub last_used_at: String,
}

impl From<CacheEntryRecord> for CacheEntryResponse {
    fn from(entry: CacheEntryRecord) -> Self {
        Self {
            text_hash: entry.text_hash,
            text: entry.text,
            voice_id: entry.voice_id,
            voice_settings: entry.voice_settings,
            audio_url: entry.audio_url,
            file_name: entry.file_name,
            file_size: entry.file_size,
            duration_secs: entry.duration_secs,
            source: entry.source,
            created_at: entry.created_at.to_rfc3339(),
            last_used_at: entry.last_used_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub total_entries: u64,
    pub total_size_bytes: u64,
    pub avg_file_size: f64,
    pub oldest_created_at: Option<String>,
    pub newest_created_at: Option<String>,
    pub most_used_voice_id: Option<String>,
}

impl From<CacheStatistics> for CacheStatsResponse {
    fn from(stats: CacheStatistics) -> Self {
        Self {
            total_entries: stats.total_entries,
            total_size_bytes: stats.total_size_bytes,
            avg_file_size: stats.avg_file_size,
            oldest_created_at: stats.oldest_created_at.map(|dt| dt.to_rfc3339()),
            newest_created_at: stats.newest_created_at.map(|dt| dt.to_rfc3339()),
            most_used_voice_id: stats.most_used_voice_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CleanupParams {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub removed: u64,
}

#[derive(Debug, Serialize)]
pub struct VoiceResponse {
    pub voice_id: String,
    pub name: String,
    pub category: Option<String>,
}

impl From<VoiceInfo> for VoiceResponse {
    fn from(voice: VoiceInfo) -> Self {
        Self {
            voice_id: voice.voice_id,
            name: voice.name,
            category: voice.category,
        }
    }
}

// ============================================================================
// Custom Audio DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CustomAudioResponse {
    pub id: i64,
    pub note_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub audio_url: String,
    pub file_name: String,
    pub file_size: u64,
    pub duration_secs: Option<f64>,
    pub text_content: Option<String>,
    pub is_active: bool,
    pub uploaded_at: String,
}

impl From<CustomAudioRecord> for CustomAudioResponse {
    fn from(record: CustomAudioRecord) -> Self {
        Self {
            id: record.id,
            note_id: record.note_id,
            title: record.title,
            description: record.description,
            audio_url: record.audio_url,
            file_name: record.file_name,
            file_size: record.file_size,
            duration_secs: record.duration_secs,
            text_content: record.text_content,
            is_active: record.is_active,
            uploaded_at: record.uploaded_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListCustomAudioParams {
    pub note_id: Option<i64>,
    pub active_only: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchCustomAudioRequest {
    pub query: String,
    /// title | description | content | all
    pub search_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCustomAudioRequest {
    pub title: Option<String>,
    /// 显式传 null 表示清空字段，缺省表示不改
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub text_content: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// 区分「字段缺省」与「字段为 null」
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_null_from_missing() {
        let set_null: UpdateCustomAudioRequest =
            serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(set_null.description, Some(None));
        assert_eq!(set_null.text_content, None);

        let set_value: UpdateCustomAudioRequest =
            serde_json::from_str(r#"{"description": "new"}"#).unwrap();
        assert_eq!(set_value.description, Some(Some("new".to_string())));
    }
}
