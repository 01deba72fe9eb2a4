//! HTTP Routes
//!
//! API 路由定义
//!
//! API Endpoints:
//! - /api/ping                      GET    健康检查
//! - /api/audio/cache               POST   合成音频（命中缓存直接返回）
//! - /api/audio/cache/stats         GET    缓存统计（管理）
//! - /api/audio/cache/cleanup      DELETE  清理过期缓存（管理，?days=N）
//! - /api/audio/cache/:text_hash    GET    按指纹查询缓存条目
//! - /api/audio/voices              GET    音色目录
//! - /api/audio/file/:file_name     GET    下载音频文件
//! - /api/audio/custom              POST   上传自定义音频（管理，multipart）
//! - /api/audio/custom              GET    自定义音频列表
//! - /api/audio/custom/search       POST   自定义音频搜索
//! - /api/audio/custom/:id          PATCH  更新自定义音频（管理）
//! - /api/audio/custom/:id         DELETE  删除自定义音频（管理）
//! - /storage/audio/*               GET    音频文件静态托管

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/audio", audio_routes())
}

/// Audio 路由
fn audio_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cache", post(handlers::synthesize_tts))
        // 静态段（stats/cleanup）优先于 :text_hash 匹配
        .route("/cache/stats", get(handlers::cache_stats))
        .route("/cache/cleanup", delete(handlers::cleanup_cache))
        .route("/cache/:text_hash", get(handlers::get_cached_audio))
        .route("/voices", get(handlers::list_voices))
        .route("/file/:file_name", get(handlers::download_audio))
        .route(
            "/custom",
            post(handlers::upload_custom_audio).get(handlers::list_custom_audio),
        )
        .route("/custom/search", post(handlers::search_custom_audio))
        .route(
            "/custom/:id",
            axum::routing::patch(handlers::update_custom_audio)
                .delete(handlers::delete_custom_audio),
        )
}
