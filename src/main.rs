//! Voxfolio - 个人主页后端（TTS 音频缓存核心）
//!
//! 组装各层并启动 HTTP 服务:
//! - Domain: audio（指纹 / 格式）
//! - Application: ports + commands + queries
//! - Infrastructure: http, persistence, adapters, worker

use std::sync::Arc;

use voxfolio::config::{load_config, print_config};
use voxfolio::infrastructure::adapters::{
    ElevenLabsClient, ElevenLabsClientConfig, FsArtifactStore, SymphoniaAudioProbe,
};
use voxfolio::infrastructure::http::{AppState, AppStateConfig, HttpServer, ServerConfig};
use voxfolio::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteCacheStore, SqliteCustomAudioRepository,
};
use voxfolio::infrastructure::worker::{CleanupWorker, CleanupWorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},voxfolio={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));
    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("Voxfolio - portfolio backend (TTS audio cache)");
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.storage.audio_dir).await?;
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建持久化适配器
    let cache_store = Arc::new(SqliteCacheStore::new(pool.clone()));
    let custom_audio_repo = Arc::new(SqliteCustomAudioRepository::new(pool.clone()));

    // 创建文件存储
    let artifact_store = Arc::new(
        FsArtifactStore::new(&config.storage.audio_dir, config.storage.max_upload_size).await?,
    );

    // 创建 TTS Provider 客户端
    let tts_provider = Arc::new(ElevenLabsClient::new(ElevenLabsClientConfig {
        base_url: config.tts.base_url.clone(),
        api_key: config.tts.api_key.clone(),
        timeout_secs: config.tts.timeout_secs,
    })?);

    // 时长探测
    let audio_probe = Arc::new(SymphoniaAudioProbe::new());

    // 创建应用状态
    let state = AppState::new(
        cache_store,
        artifact_store,
        tts_provider,
        custom_audio_repo,
        audio_probe,
        AppStateConfig {
            default_voice_id: config.tts.default_voice_id.clone(),
            default_max_age_days: config.cache.max_age_days,
            admin_token: config.server.admin_token.clone(),
            audio_dir: config.storage.audio_dir.clone(),
        },
    );

    // 启动定时清理
    if config.cache.cleanup_enabled {
        let worker = CleanupWorker::new(
            CleanupWorkerConfig {
                interval_secs: config.cache.cleanup_interval_secs,
                max_age_days: config.cache.max_age_days,
            },
            state.cleanup_handler.clone(),
        );
        tokio::spawn(worker.run());
    }

    // 创建 HTTP 服务器；请求体上限给上传留出 multipart 编码余量
    let max_body_bytes = (config.storage.max_upload_size as usize).saturating_add(1024 * 1024);
    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_bytes(max_body_bytes);
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
