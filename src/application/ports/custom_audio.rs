//! Custom Audio Repository Port - 自定义音频持久化
//!
//! 人工上传音频的 CRUD 抽象接口，无缓存语义

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 自定义音频实体
#[derive(Debug, Clone)]
pub struct CustomAudioRecord {
    pub id: i64,
    /// 关联笔记 ID（笔记系统在本服务之外，不做外键约束）
    pub note_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub audio_url: String,
    pub file_name: String,
    pub file_size: u64,
    pub duration_secs: Option<f64>,
    /// 该音频对应的文本内容（可选）
    pub text_content: Option<String>,
    pub is_active: bool,
    pub uploaded_at: DateTime<Utc>,
}

/// 新建自定义音频（id 由存储分配）
#[derive(Debug, Clone)]
pub struct NewCustomAudio {
    pub note_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub audio_url: String,
    pub file_name: String,
    pub file_size: u64,
    pub duration_secs: Option<f64>,
    pub text_content: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// 部分更新
#[derive(Debug, Clone, Default)]
pub struct CustomAudioPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub text_content: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// 搜索范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Description,
    Content,
    All,
}

impl SearchField {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "title" => Some(SearchField::Title),
            "description" => Some(SearchField::Description),
            "content" => Some(SearchField::Content),
            "all" => Some(SearchField::All),
            _ => None,
        }
    }
}

/// Custom Audio Repository Port
#[async_trait]
pub trait CustomAudioRepositoryPort: Send + Sync {
    /// 保存并返回带 id 的实体
    async fn create(&self, audio: &NewCustomAudio) -> Result<CustomAudioRecord, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<CustomAudioRecord>, RepositoryError>;

    /// 列表，按上传时间倒序
    async fn find_all(
        &self,
        note_id: Option<i64>,
        active_only: bool,
    ) -> Result<Vec<CustomAudioRecord>, RepositoryError>;

    /// 大小写不敏感的模糊搜索（只搜 active 条目）
    async fn search(
        &self,
        query: &str,
        field: SearchField,
    ) -> Result<Vec<CustomAudioRecord>, RepositoryError>;

    /// 部分更新，返回更新后的实体
    async fn update(
        &self,
        id: i64,
        patch: &CustomAudioPatch,
    ) -> Result<CustomAudioRecord, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;
}
