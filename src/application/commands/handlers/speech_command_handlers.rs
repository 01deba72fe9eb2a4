//! Speech Command Handlers - 合成与清理编排
//!
//! 缓存编排的核心：命中直接返回，未命中走
//! 合成 -> 写文件 -> 写元数据，并发插入冲突时
//! 丢弃本次产物、重读并返回胜出条目。

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::application::commands::{CleanupCache, SynthesizeSpeech};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ArtifactStorePort, AudioProbePort, CacheEntryRecord, CacheStoreError, CacheStorePort,
    SynthesisRequest, TtsProviderPort,
};
use crate::domain::audio::{canonical_settings, AudioSource, Fingerprint};

/// 默认缓存保留天数
pub const DEFAULT_MAX_AGE_DAYS: u32 = 30;

/// 单次合成文本长度上限
pub const MAX_TTS_TEXT_LEN: usize = 5000;

// ============================================================================
// SynthesizeSpeech
// ============================================================================

/// 合成结果
#[derive(Debug, Clone)]
pub struct SynthesizeSpeechResponse {
    pub entry: CacheEntryRecord,
    /// 是否命中已有缓存（含冲突后采用胜出条目的情况）
    pub cached: bool,
}

/// SynthesizeSpeech Handler
pub struct SynthesizeSpeechHandler {
    cache_store: Arc<dyn CacheStorePort>,
    artifact_store: Arc<dyn ArtifactStorePort>,
    tts_provider: Arc<dyn TtsProviderPort>,
    audio_probe: Arc<dyn AudioProbePort>,
    default_voice_id: String,
}

impl SynthesizeSpeechHandler {
    pub fn new(
        cache_store: Arc<dyn CacheStorePort>,
        artifact_store: Arc<dyn ArtifactStorePort>,
        tts_provider: Arc<dyn TtsProviderPort>,
        audio_probe: Arc<dyn AudioProbePort>,
        default_voice_id: impl Into<String>,
    ) -> Self {
        Self {
            cache_store,
            artifact_store,
            tts_provider,
            audio_probe,
            default_voice_id: default_voice_id.into(),
        }
    }

    pub async fn handle(
        &self,
        command: SynthesizeSpeech,
    ) -> Result<SynthesizeSpeechResponse, ApplicationError> {
        let text = command.text;
        if text.is_empty() {
            return Err(ApplicationError::validation("Text is required"));
        }
        if text.chars().count() > MAX_TTS_TEXT_LEN {
            return Err(ApplicationError::validation(format!(
                "Text too long: limit {} chars",
                MAX_TTS_TEXT_LEN
            )));
        }

        let voice_id = command
            .voice_id
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.default_voice_id.clone());
        let voice_settings = canonical_settings(
            &command
                .voice_settings
                .unwrap_or_else(|| serde_json::json!({})),
        );

        let fingerprint = Fingerprint::compute(&text, &voice_id, &voice_settings);

        // 缓存命中
        if let Some(entry) = self.cache_store.lookup(fingerprint.as_str()).await? {
            self.touch_quietly(fingerprint.as_str()).await;
            tracing::debug!(text_hash = %fingerprint, voice_id = %entry.voice_id, "Cache hit");
            return Ok(SynthesizeSpeechResponse {
                entry,
                cached: true,
            });
        }

        // 未命中：合成新音频
        let synthesized = self
            .tts_provider
            .synthesize(SynthesisRequest {
                text: text.clone(),
                voice_id: voice_id.clone(),
                voice_settings: voice_settings.clone(),
            })
            .await?;

        let stem = format!("tts_{}", fingerprint);
        let (location, format) = self
            .artifact_store
            .store(&synthesized.data, synthesized.format.content_type(), &stem)
            .await?;
        let duration_secs = self.audio_probe.duration_secs(&synthesized.data, format);

        let now = Utc::now();
        let entry = CacheEntryRecord {
            text_hash: fingerprint.as_str().to_string(),
            text,
            voice_id,
            voice_settings,
            audio_url: location.public_url(),
            file_name: location.file_name.clone(),
            file_size: synthesized.data.len() as u64,
            duration_secs,
            source: AudioSource::Generated,
            created_at: now,
            last_used_at: now,
        };

        match self.cache_store.insert(&entry).await {
            Ok(()) => {
                tracing::info!(
                    text_hash = %fingerprint,
                    voice_id = %entry.voice_id,
                    file_size = entry.file_size,
                    "Audio synthesized and cached"
                );
                Ok(SynthesizeSpeechResponse {
                    entry,
                    cached: false,
                })
            }
            Err(CacheStoreError::Conflict(_)) => {
                // 并发 miss 抢先完成了插入：丢弃本次产物，采用胜出条目。
                // 生成路径按指纹寻址，胜出条目通常指向同一文件，
                // 此时本次写入只是幂等覆盖，不能删
                let winner = self.cache_store.lookup(fingerprint.as_str()).await?;
                match winner {
                    Some(winner) => {
                        if winner.file_name != location.file_name {
                            if let Err(e) = self.artifact_store.delete(&location).await {
                                tracing::warn!(
                                    file_name = %location.file_name,
                                    error = %e,
                                    "Failed to discard duplicate artifact"
                                );
                            }
                        }
                        self.touch_quietly(fingerprint.as_str()).await;
                        tracing::debug!(text_hash = %fingerprint, "Insert conflict resolved to existing entry");
                        Ok(SynthesizeSpeechResponse {
                            entry: winner,
                            cached: true,
                        })
                    }
                    None => {
                        // 胜出条目在冲突与重读之间被清理，这个窄竞争按内部错误上报
                        if let Err(e) = self.artifact_store.delete(&location).await {
                            tracing::warn!(
                                file_name = %location.file_name,
                                error = %e,
                                "Failed to discard duplicate artifact"
                            );
                        }
                        Err(ApplicationError::internal(format!(
                            "Cache entry missing after insert conflict: {}",
                            fingerprint
                        )))
                    }
                }
            }
            Err(other) => {
                // 元数据写入失败：清掉刚写的文件，避免孤儿字节
                if let Err(e) = self.artifact_store.delete(&location).await {
                    tracing::warn!(
                        file_name = %location.file_name,
                        error = %e,
                        "Failed to roll back artifact after insert failure"
                    );
                }
                Err(other.into())
            }
        }
    }

    /// touch 失败只记录日志，不影响命中返回
    async fn touch_quietly(&self, text_hash: &str) {
        if let Err(e) = self.cache_store.touch(text_hash).await {
            tracing::warn!(text_hash = %text_hash, error = %e, "Failed to touch cache entry");
        }
    }
}

// ============================================================================
// CleanupCache
// ============================================================================

/// 清理结果
#[derive(Debug, Clone)]
pub struct CleanupCacheResponse {
    pub removed: u64,
}

/// CleanupCache Handler
pub struct CleanupCacheHandler {
    cache_store: Arc<dyn CacheStorePort>,
    artifact_store: Arc<dyn ArtifactStorePort>,
    default_max_age_days: u32,
}

impl CleanupCacheHandler {
    pub fn new(
        cache_store: Arc<dyn CacheStorePort>,
        artifact_store: Arc<dyn ArtifactStorePort>,
        default_max_age_days: u32,
    ) -> Self {
        Self {
            cache_store,
            artifact_store,
            default_max_age_days,
        }
    }

    pub async fn handle(
        &self,
        command: CleanupCache,
    ) -> Result<CleanupCacheResponse, ApplicationError> {
        let days = command.max_age_days.unwrap_or(self.default_max_age_days);
        let cutoff = Utc::now() - Duration::days(i64::from(days));

        let evicted = self.cache_store.delete_older_than(cutoff).await?;

        for entry in &evicted {
            match self.artifact_store.delete(&entry.location).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(
                        text_hash = %entry.text_hash,
                        file_name = %entry.location.file_name,
                        "Evicted entry had no artifact on disk"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        text_hash = %entry.text_hash,
                        file_name = %entry.location.file_name,
                        error = %e,
                        "Failed to delete evicted artifact"
                    );
                }
            }
        }

        tracing::info!(
            removed = evicted.len(),
            max_age_days = days,
            "Cache cleanup completed"
        );

        Ok(CleanupCacheResponse {
            removed: evicted.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::join_all;
    use serde_json::json;
    use tempfile::tempdir;

    use crate::application::ports::{ArtifactStoreError, AudioLocation};
    use crate::infrastructure::adapters::probe::SymphoniaAudioProbe;
    use crate::infrastructure::adapters::storage::FsArtifactStore;
    use crate::infrastructure::adapters::tts::{FakeFailure, FakeTtsClient, FakeTtsClientConfig};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteCacheStore,
    };

    struct Fixture {
        handler: Arc<SynthesizeSpeechHandler>,
        cleanup: CleanupCacheHandler,
        cache_store: Arc<SqliteCacheStore>,
        artifact_store: Arc<FsArtifactStore>,
        tts: Arc<FakeTtsClient>,
        _dir: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let cache_store = Arc::new(SqliteCacheStore::new(pool));
        let artifact_store = Arc::new(
            FsArtifactStore::new(dir.path(), 10 * 1024 * 1024)
                .await
                .unwrap(),
        );
        let tts = Arc::new(FakeTtsClient::new(FakeTtsClientConfig::default()));
        let probe = Arc::new(SymphoniaAudioProbe::new());

        let handler = Arc::new(SynthesizeSpeechHandler::new(
            cache_store.clone(),
            artifact_store.clone(),
            tts.clone(),
            probe,
            "default-voice",
        ));
        let cleanup = CleanupCacheHandler::new(
            cache_store.clone(),
            artifact_store.clone(),
            DEFAULT_MAX_AGE_DAYS,
        );

        Fixture {
            handler,
            cleanup,
            cache_store,
            artifact_store,
            tts,
            _dir: dir,
        }
    }

    fn command(text: &str) -> SynthesizeSpeech {
        SynthesizeSpeech {
            text: text.to_string(),
            voice_id: Some("voice-a".to_string()),
            voice_settings: Some(json!({"stability": 0.5})),
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit_is_idempotent() {
        let fx = fixture().await;

        let first = fx.handler.handle(command("hello world")).await.unwrap();
        assert!(!first.cached);
        assert_eq!(fx.tts.call_count(), 1);

        let second = fx.handler.handle(command("hello world")).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.entry.text_hash, first.entry.text_hash);
        // 第二次调用不触发合成与写盘
        assert_eq!(fx.tts.call_count(), 1);

        let stats = fx.cache_store.statistics().await.unwrap();
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_hit_moves_last_used_forward() {
        let fx = fixture().await;

        let first = fx.handler.handle(command("touch me")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        fx.handler.handle(command("touch me")).await.unwrap();

        let entry = fx
            .cache_store
            .lookup(&first.entry.text_hash)
            .await
            .unwrap()
            .unwrap();
        assert!(entry.last_used_at > first.entry.last_used_at);
        assert_eq!(entry.created_at, first.entry.created_at);
        assert_eq!(entry.file_size, first.entry.file_size);
    }

    #[tokio::test]
    async fn test_default_voice_and_empty_settings() {
        let fx = fixture().await;

        let result = fx
            .handler
            .handle(SynthesizeSpeech {
                text: "no options".to_string(),
                voice_id: None,
                voice_settings: None,
            })
            .await
            .unwrap();
        assert_eq!(result.entry.voice_id, "default-voice");
        assert_eq!(result.entry.voice_settings, json!({}));
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_entry() {
        let fx = fixture().await;

        let calls = (0..8).map(|_| {
            let handler = fx.handler.clone();
            async move { handler.handle(command("race text")).await }
        });
        let results: Vec<_> = join_all(calls).await;

        let mut hashes = Vec::new();
        for result in results {
            hashes.push(result.unwrap().entry.text_hash);
        }
        hashes.dedup();
        assert_eq!(hashes.len(), 1);

        // 只有一条元数据、一个文件存活
        let stats = fx.cache_store.statistics().await.unwrap();
        assert_eq!(stats.total_entries, 1);

        let entry = fx.cache_store.lookup(&hashes[0]).await.unwrap().unwrap();
        let files: Vec<_> = std::fs::read_dir(fx._dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .collect();
        assert_eq!(files.len(), 1);
        assert_eq!(
            files[0].file_name().to_string_lossy(),
            entry.file_name.as_str()
        );
    }

    #[tokio::test]
    async fn test_synthesis_error_leaves_no_state() {
        let fx = fixture().await;
        fx.tts.set_failure(Some(FakeFailure::InvalidVoice));

        let err = fx.handler.handle(command("will fail")).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Synthesis(crate::application::ports::SynthesisError::InvalidVoice(_))
        ));

        let stats = fx.cache_store.statistics().await.unwrap();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(std::fs::read_dir(fx._dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let fx = fixture().await;
        let err = fx.handler.handle(command("")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
        assert_eq!(fx.tts.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_stale_entries() {
        let fx = fixture().await;

        // 直接种入一条 40 天未用和一条 5 天未用的条目
        let now = Utc::now();
        for (text, days_ago) in [("stale entry", 40i64), ("fresh entry", 5i64)] {
            let fingerprint = Fingerprint::compute(text, "voice-a", &json!({}));
            let (location, _) = fx
                .artifact_store
                .store(b"ID3fakebytes", "audio/mpeg", &format!("tts_{}", fingerprint))
                .await
                .unwrap();
            let stamp = now - Duration::days(days_ago);
            fx.cache_store
                .insert(&CacheEntryRecord {
                    text_hash: fingerprint.as_str().to_string(),
                    text: text.to_string(),
                    voice_id: "voice-a".to_string(),
                    voice_settings: json!({}),
                    audio_url: location.public_url(),
                    file_name: location.file_name.clone(),
                    file_size: 12,
                    duration_secs: None,
                    source: AudioSource::Generated,
                    created_at: stamp,
                    last_used_at: stamp,
                })
                .await
                .unwrap();
        }

        let result = fx
            .cleanup
            .handle(CleanupCache { max_age_days: None })
            .await
            .unwrap();
        assert_eq!(result.removed, 1);

        let stale_hash = Fingerprint::compute("stale entry", "voice-a", &json!({}));
        let fresh_hash = Fingerprint::compute("fresh entry", "voice-a", &json!({}));
        assert!(fx
            .cache_store
            .lookup(stale_hash.as_str())
            .await
            .unwrap()
            .is_none());
        assert!(fx
            .cache_store
            .lookup(fresh_hash.as_str())
            .await
            .unwrap()
            .is_some());

        // 被清理条目的物理文件一并删除
        let stale_location = AudioLocation::new(format!("tts_{}.mp3", stale_hash));
        assert!(matches!(
            fx.artifact_store.retrieve(&stale_location).await,
            Err(ArtifactStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_missing_artifact() {
        let fx = fixture().await;

        let now = Utc::now();
        let stamp = now - Duration::days(60);
        fx.cache_store
            .insert(&CacheEntryRecord {
                text_hash: "a".repeat(32),
                text: "orphan metadata".to_string(),
                voice_id: "voice-a".to_string(),
                voice_settings: json!({}),
                audio_url: "/storage/audio/gone.mp3".to_string(),
                file_name: "gone.mp3".to_string(),
                file_size: 1,
                duration_secs: None,
                source: AudioSource::Generated,
                created_at: stamp,
                last_used_at: stamp,
            })
            .await
            .unwrap();

        let result = fx
            .cleanup
            .handle(CleanupCache {
                max_age_days: Some(30),
            })
            .await
            .unwrap();
        assert_eq!(result.removed, 1);
    }
}
