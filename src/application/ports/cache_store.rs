//! Cache Store Port - 缓存元数据存储
//!
//! 定义指纹 -> 缓存条目元数据的持久化抽象接口，
//! 具体实现使用 SQLite（text_hash 上的唯一索引提供
//! 原子的 insert-or-conflict 语义，作为并发控制手段）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::domain::audio::AudioSource;

use super::artifact_store::AudioLocation;

/// Cache Store 错误
#[derive(Debug, Error)]
pub enum CacheStoreError {
    /// 指纹已存在（并发 miss 竞争，调用方应重读）
    #[error("Cache entry already exists: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 缓存条目（元数据）
#[derive(Debug, Clone)]
pub struct CacheEntryRecord {
    /// 缓存指纹（唯一 key，32 位十六进制）
    pub text_hash: String,
    /// 原始文本（信息性字段，不参与查找）
    pub text: String,
    pub voice_id: String,
    /// 规范化后的 voice settings JSON
    pub voice_settings: Value,
    /// 可播放的相对 URL
    pub audio_url: String,
    pub file_name: String,
    pub file_size: u64,
    /// 音频时长（秒），探测失败时为空
    pub duration_secs: Option<f64>,
    pub source: AudioSource,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

/// 被清理条目的定位信息，供调用方删除物理文件
#[derive(Debug, Clone)]
pub struct EvictedEntry {
    pub text_hash: String,
    pub location: AudioLocation,
}

/// 缓存统计信息
#[derive(Debug, Clone, Default)]
pub struct CacheStatistics {
    pub total_entries: u64,
    pub total_size_bytes: u64,
    pub avg_file_size: f64,
    pub oldest_created_at: Option<DateTime<Utc>>,
    pub newest_created_at: Option<DateTime<Utc>>,
    /// 条目数最多的音色；并列时取字典序最小的 voice_id
    pub most_used_voice_id: Option<String>,
}

/// Cache Store Port
#[async_trait]
pub trait CacheStorePort: Send + Sync {
    /// 按指纹查找条目
    async fn lookup(&self, text_hash: &str) -> Result<Option<CacheEntryRecord>, CacheStoreError>;

    /// 插入新条目
    ///
    /// text_hash 已存在时返回 `Conflict`，插入是原子的
    async fn insert(&self, entry: &CacheEntryRecord) -> Result<(), CacheStoreError>;

    /// 更新 last_used_at 为当前时间
    async fn touch(&self, text_hash: &str) -> Result<(), CacheStoreError>;

    /// 删除 last_used_at 早于 cutoff 的条目
    ///
    /// 只删除元数据行，返回被删条目的文件定位信息，
    /// 物理文件由调用方（编排层）删除
    async fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<EvictedEntry>, CacheStoreError>;

    /// 聚合统计，只读
    async fn statistics(&self) -> Result<CacheStatistics, CacheStoreError>;
}
