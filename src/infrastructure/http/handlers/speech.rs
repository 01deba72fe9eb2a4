//! Speech Handlers - TTS 缓存端点

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use std::io::Cursor;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::ports::AudioLocation;
use crate::application::{
    CleanupCache, GetCachedEntry, GetCacheStats, ListProviderVoices, SynthesizeSpeech,
};
use crate::domain::audio::AudioFormat;
use crate::infrastructure::http::dto::{
    ApiResponse, CacheEntryResponse, CacheStatsResponse, CleanupParams, CleanupResponse,
    TtsRequest, TtsResponse, VoiceResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::require_admin;
use crate::infrastructure::http::state::AppState;

/// 合成音频（命中缓存则直接返回）
pub async fn synthesize_tts(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TtsRequest>,
) -> Result<Json<ApiResponse<TtsResponse>>, ApiError> {
    let result = state
        .synthesize_handler
        .handle(SynthesizeSpeech {
            text: req.text,
            voice_id: req.voice_id,
            voice_settings: req.voice_settings,
        })
        .await?;

    Ok(Json(ApiResponse::success(TtsResponse {
        text_hash: result.entry.text_hash,
        audio_url: result.entry.audio_url,
        cached: result.cached,
        voice_id: result.entry.voice_id,
        file_size: result.entry.file_size,
        duration_secs: result.entry.duration_secs,
    })))
}

/// 按指纹查询缓存条目（不触发合成）
pub async fn get_cached_audio(
    State(state): State<Arc<AppState>>,
    Path(text_hash): Path<String>,
) -> Result<Json<ApiResponse<CacheEntryResponse>>, ApiError> {
    let entry = state
        .get_cached_entry_handler
        .handle(GetCachedEntry { text_hash })
        .await?;

    Ok(Json(ApiResponse::success(entry.into())))
}

/// 缓存统计（管理端点）
pub async fn cache_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<CacheStatsResponse>>, ApiError> {
    require_admin(state.admin_token.as_deref(), &headers)?;

    let stats = state.get_cache_stats_handler.handle(GetCacheStats).await?;
    Ok(Json(ApiResponse::success(stats.into())))
}

/// 清理过期缓存（管理端点）
pub async fn cleanup_cache(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<CleanupParams>,
) -> Result<Json<ApiResponse<CleanupResponse>>, ApiError> {
    require_admin(state.admin_token.as_deref(), &headers)?;

    let result = state
        .cleanup_handler
        .handle(CleanupCache {
            max_age_days: params.days,
        })
        .await?;

    Ok(Json(ApiResponse::success(CleanupResponse {
        removed: result.removed,
    })))
}

/// 音色目录
pub async fn list_voices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<VoiceResponse>>>, ApiError> {
    let voices = state.list_voices_handler.handle(ListProviderVoices).await?;

    Ok(Json(ApiResponse::success(
        voices.into_iter().map(VoiceResponse::from).collect(),
    )))
}

/// 下载音频文件（流式响应）
pub async fn download_audio(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    // 文件名寻址，拒绝路径穿越
    if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
        return Err(ApiError::BadRequest("Invalid file name".to_string()));
    }

    let location = AudioLocation::new(file_name.clone());
    let data = state
        .artifact_store
        .retrieve(&location)
        .await
        .map_err(|e| match e {
            crate::application::ports::ArtifactStoreError::NotFound(name) => {
                ApiError::NotFound(format!("Audio file not found: {}", name))
            }
            other => ApiError::Internal(other.to_string()),
        })?;

    let content_type = std::path::Path::new(&file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(AudioFormat::from_extension)
        .map(|format| format.content_type())
        .unwrap_or("application/octet-stream");

    let content_length = data.len();
    let stream = ReaderStream::new(Cursor::new(data));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content_length)
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
