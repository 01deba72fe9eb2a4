//! Custom Audio Handlers - 自定义音频端点

use axum::{
    extract::{Multipart, Path, Query, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;

use crate::application::ports::SearchField;
use crate::application::{
    DeleteCustomAudio, ListCustomAudio, SearchCustomAudio, UpdateCustomAudio, UploadCustomAudio,
};
use crate::domain::audio::AudioFormat;
use crate::infrastructure::http::dto::{
    ApiResponse, CustomAudioResponse, Empty, ListCustomAudioParams, SearchCustomAudioRequest,
    UpdateCustomAudioRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::require_admin;
use crate::infrastructure::http::state::AppState;

/// 上传自定义音频（管理端点，multipart）
pub async fn upload_custom_audio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<CustomAudioResponse>>, ApiError> {
    require_admin(state.admin_token.as_deref(), &headers)?;

    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut note_id: Option<i64> = None;
    let mut text_content: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "title" => {
                title = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read title: {}", e))
                })?);
            }
            "description" => {
                description = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read description: {}", e))
                })?);
            }
            "note_id" => {
                let raw = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read note_id: {}", e))
                })?;
                note_id = Some(raw.parse().map_err(|_| {
                    ApiError::BadRequest(format!("Invalid note_id: {:?}", raw))
                })?);
            }
            "text_content" => {
                text_content = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read text_content: {}", e))
                })?);
            }
            "file" => {
                // 声明类型优先取 part 的 Content-Type，缺省时按扩展名推断
                let declared = field.content_type().map(|s| s.to_string()).or_else(|| {
                    field
                        .file_name()
                        .and_then(|name| std::path::Path::new(name).extension())
                        .and_then(|ext| ext.to_str())
                        .and_then(AudioFormat::from_extension)
                        .map(|format| format.content_type().to_string())
                });
                content_type = declared;

                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let title = title.ok_or_else(|| ApiError::BadRequest("Title is required".to_string()))?;
    let data = data.ok_or_else(|| ApiError::BadRequest("Audio file is required".to_string()))?;
    let content_type = content_type
        .ok_or_else(|| ApiError::BadRequest("Audio content type is required".to_string()))?;

    let record = state
        .upload_custom_audio_handler
        .handle(UploadCustomAudio {
            title,
            description,
            note_id,
            text_content,
            content_type,
            data,
        })
        .await?;

    Ok(Json(ApiResponse::success(record.into())))
}

/// 自定义音频列表
pub async fn list_custom_audio(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListCustomAudioParams>,
) -> Result<Json<ApiResponse<Vec<CustomAudioResponse>>>, ApiError> {
    let records = state
        .list_custom_audio_handler
        .handle(ListCustomAudio {
            note_id: params.note_id,
            active_only: params.active_only.unwrap_or(true),
        })
        .await?;

    Ok(Json(ApiResponse::success(
        records.into_iter().map(CustomAudioResponse::from).collect(),
    )))
}

/// 自定义音频搜索
pub async fn search_custom_audio(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchCustomAudioRequest>,
) -> Result<Json<ApiResponse<Vec<CustomAudioResponse>>>, ApiError> {
    let field = match req.search_type.as_deref() {
        None => SearchField::All,
        Some(raw) => SearchField::from_str(raw).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Invalid search_type {:?}, expected title | description | content | all",
                raw
            ))
        })?,
    };

    let records = state
        .search_custom_audio_handler
        .handle(SearchCustomAudio {
            query: req.query,
            field,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        records.into_iter().map(CustomAudioResponse::from).collect(),
    )))
}

/// 更新自定义音频（管理端点）
pub async fn update_custom_audio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCustomAudioRequest>,
) -> Result<Json<ApiResponse<CustomAudioResponse>>, ApiError> {
    require_admin(state.admin_token.as_deref(), &headers)?;

    let record = state
        .update_custom_audio_handler
        .handle(UpdateCustomAudio {
            id,
            title: req.title,
            description: req.description,
            text_content: req.text_content,
            is_active: req.is_active,
        })
        .await?;

    Ok(Json(ApiResponse::success(record.into())))
}

/// 删除自定义音频（管理端点）
pub async fn delete_custom_audio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    require_admin(state.admin_token.as_deref(), &headers)?;

    state
        .delete_custom_audio_handler
        .handle(DeleteCustomAudio { id })
        .await?;

    Ok(Json(ApiResponse::ok()))
}
