//! Speech Query Handlers - 缓存查询

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    CacheEntryRecord, CacheStatistics, CacheStorePort, TtsProviderPort, VoiceInfo,
};
use crate::application::queries::{GetCachedEntry, GetCacheStats, ListProviderVoices};
use crate::domain::audio::Fingerprint;

/// GetCachedEntry Handler - 按指纹查询，不触发合成
pub struct GetCachedEntryHandler {
    cache_store: Arc<dyn CacheStorePort>,
}

impl GetCachedEntryHandler {
    pub fn new(cache_store: Arc<dyn CacheStorePort>) -> Self {
        Self { cache_store }
    }

    pub async fn handle(
        &self,
        query: GetCachedEntry,
    ) -> Result<CacheEntryRecord, ApplicationError> {
        let fingerprint = Fingerprint::parse(&query.text_hash)
            .map_err(|e| ApplicationError::validation(e.to_string()))?;

        let entry = self
            .cache_store
            .lookup(fingerprint.as_str())
            .await?
            .ok_or_else(|| {
                ApplicationError::not_found("Cached audio", fingerprint.as_str())
            })?;

        // 成功查到即视为一次命中
        if let Err(e) = self.cache_store.touch(fingerprint.as_str()).await {
            tracing::warn!(text_hash = %fingerprint, error = %e, "Failed to touch cache entry");
        }

        Ok(entry)
    }
}

/// GetCacheStats Handler - 只读统计
pub struct GetCacheStatsHandler {
    cache_store: Arc<dyn CacheStorePort>,
}

impl GetCacheStatsHandler {
    pub fn new(cache_store: Arc<dyn CacheStorePort>) -> Self {
        Self { cache_store }
    }

    pub async fn handle(&self, _query: GetCacheStats) -> Result<CacheStatistics, ApplicationError> {
        Ok(self.cache_store.statistics().await?)
    }
}

/// ListProviderVoices Handler - 音色目录透传
pub struct ListProviderVoicesHandler {
    tts_provider: Arc<dyn TtsProviderPort>,
}

impl ListProviderVoicesHandler {
    pub fn new(tts_provider: Arc<dyn TtsProviderPort>) -> Self {
        Self { tts_provider }
    }

    pub async fn handle(
        &self,
        _query: ListProviderVoices,
    ) -> Result<Vec<VoiceInfo>, ApplicationError> {
        Ok(self.tts_provider.list_voices().await?)
    }
}
