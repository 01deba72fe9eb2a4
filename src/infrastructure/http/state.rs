//! Application State
//!
//! 包含所有端口与 Command/Query Handlers 的应用状态

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::{
    // Command handlers
    CleanupCacheHandler, DeleteCustomAudioHandler, SynthesizeSpeechHandler,
    UpdateCustomAudioHandler, UploadCustomAudioHandler,
    // Query handlers
    GetCachedEntryHandler, GetCacheStatsHandler, ListCustomAudioHandler,
    ListProviderVoicesHandler, SearchCustomAudioHandler,
    // Ports
    ArtifactStorePort, AudioProbePort, CacheStorePort, CustomAudioRepositoryPort, TtsProviderPort,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub cache_store: Arc<dyn CacheStorePort>,
    pub artifact_store: Arc<dyn ArtifactStorePort>,
    pub tts_provider: Arc<dyn TtsProviderPort>,
    pub custom_audio_repo: Arc<dyn CustomAudioRepositoryPort>,
    pub audio_probe: Arc<dyn AudioProbePort>,

    // ========== 运行参数 ==========
    /// 管理端点的访问令牌；未配置时管理端点整体拒绝
    pub admin_token: Option<String>,
    /// 音频文件目录（静态托管用）
    pub audio_dir: PathBuf,

    // ========== Command Handlers ==========
    pub synthesize_handler: SynthesizeSpeechHandler,
    pub cleanup_handler: Arc<CleanupCacheHandler>,
    pub upload_custom_audio_handler: UploadCustomAudioHandler,
    pub update_custom_audio_handler: UpdateCustomAudioHandler,
    pub delete_custom_audio_handler: DeleteCustomAudioHandler,

    // ========== Query Handlers ==========
    pub get_cached_entry_handler: GetCachedEntryHandler,
    pub get_cache_stats_handler: GetCacheStatsHandler,
    pub list_voices_handler: ListProviderVoicesHandler,
    pub list_custom_audio_handler: ListCustomAudioHandler,
    pub search_custom_audio_handler: SearchCustomAudioHandler,
}

/// AppState 构造参数
pub struct AppStateConfig {
    pub default_voice_id: String,
    pub default_max_age_days: u32,
    pub admin_token: Option<String>,
    pub audio_dir: PathBuf,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        cache_store: Arc<dyn CacheStorePort>,
        artifact_store: Arc<dyn ArtifactStorePort>,
        tts_provider: Arc<dyn TtsProviderPort>,
        custom_audio_repo: Arc<dyn CustomAudioRepositoryPort>,
        audio_probe: Arc<dyn AudioProbePort>,
        config: AppStateConfig,
    ) -> Self {
        let cleanup_handler = Arc::new(CleanupCacheHandler::new(
            cache_store.clone(),
            artifact_store.clone(),
            config.default_max_age_days,
        ));

        Self {
            // Command handlers
            synthesize_handler: SynthesizeSpeechHandler::new(
                cache_store.clone(),
                artifact_store.clone(),
                tts_provider.clone(),
                audio_probe.clone(),
                config.default_voice_id,
            ),
            cleanup_handler: cleanup_handler.clone(),
            upload_custom_audio_handler: UploadCustomAudioHandler::new(
                custom_audio_repo.clone(),
                artifact_store.clone(),
                audio_probe.clone(),
            ),
            update_custom_audio_handler: UpdateCustomAudioHandler::new(custom_audio_repo.clone()),
            delete_custom_audio_handler: DeleteCustomAudioHandler::new(
                custom_audio_repo.clone(),
                artifact_store.clone(),
            ),

            // Query handlers
            get_cached_entry_handler: GetCachedEntryHandler::new(cache_store.clone()),
            get_cache_stats_handler: GetCacheStatsHandler::new(cache_store.clone()),
            list_voices_handler: ListProviderVoicesHandler::new(tts_provider.clone()),
            list_custom_audio_handler: ListCustomAudioHandler::new(custom_audio_repo.clone()),
            search_custom_audio_handler: SearchCustomAudioHandler::new(custom_audio_repo.clone()),

            // Ports
            cache_store,
            artifact_store,
            tts_provider,
            custom_audio_repo,
            audio_probe,

            // 运行参数
            admin_token: config.admin_token,
            audio_dir: config.audio_dir,
        }
    }
}
