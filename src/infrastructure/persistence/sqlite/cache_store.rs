//! SQLite Cache Store - 音频缓存元数据存储
//!
//! text_hash 上的唯一索引提供原子 insert-or-conflict，
//! 并发 miss 的竞争在这里仲裁

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{
    AudioLocation, CacheEntryRecord, CacheStatistics, CacheStoreError, CacheStorePort,
    EvictedEntry,
};
use crate::domain::audio::AudioSource;

/// SQLite Cache Store
pub struct SqliteCacheStore {
    pool: DbPool,
}

impl SqliteCacheStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CacheRow {
    text_hash: String,
    text: String,
    voice_id: String,
    voice_settings: String,
    audio_url: String,
    file_name: String,
    file_size: i64,
    duration_secs: Option<f64>,
    source: String,
    created_at: String,
    last_used_at: String,
}

impl TryFrom<CacheRow> for CacheEntryRecord {
    type Error = CacheStoreError;

    fn try_from(row: CacheRow) -> Result<Self, Self::Error> {
        Ok(CacheEntryRecord {
            text_hash: row.text_hash,
            text: row.text,
            voice_id: row.voice_id,
            voice_settings: serde_json::from_str(&row.voice_settings)
                .map_err(|e| CacheStoreError::SerializationError(e.to_string()))?,
            audio_url: row.audio_url,
            file_name: row.file_name,
            file_size: row.file_size as u64,
            duration_secs: row.duration_secs,
            source: AudioSource::from_str(&row.source).ok_or_else(|| {
                CacheStoreError::SerializationError(format!("Unknown source: {}", row.source))
            })?,
            created_at: parse_timestamp(&row.created_at)?,
            last_used_at: parse_timestamp(&row.last_used_at)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, CacheStoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CacheStoreError::SerializationError(e.to_string()))
}

#[derive(FromRow)]
struct AggregateRow {
    cnt: i64,
    total_size: i64,
    avg_size: f64,
    oldest: Option<String>,
    newest: Option<String>,
}

#[async_trait]
impl CacheStorePort for SqliteCacheStore {
    async fn lookup(&self, text_hash: &str) -> Result<Option<CacheEntryRecord>, CacheStoreError> {
        let row: Option<CacheRow> = sqlx::query_as(
            r#"
            SELECT text_hash, text, voice_id, voice_settings, audio_url, file_name,
                   file_size, duration_secs, source, created_at, last_used_at
            FROM audio_cache WHERE text_hash = ?
            "#,
        )
        .bind(text_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CacheStoreError::DatabaseError(e.to_string()))?;

        row.map(CacheEntryRecord::try_from).transpose()
    }

    async fn insert(&self, entry: &CacheEntryRecord) -> Result<(), CacheStoreError> {
        let settings = serde_json::to_string(&entry.voice_settings)
            .map_err(|e| CacheStoreError::SerializationError(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO audio_cache
                (text_hash, text, voice_id, voice_settings, audio_url, file_name,
                 file_size, duration_secs, source, created_at, last_used_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.text_hash)
        .bind(&entry.text)
        .bind(&entry.voice_id)
        .bind(&settings)
        .bind(&entry.audio_url)
        .bind(&entry.file_name)
        .bind(entry.file_size as i64)
        .bind(entry.duration_secs)
        .bind(entry.source.as_str())
        .bind(entry.created_at.to_rfc3339())
        .bind(entry.last_used_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let is_unique_violation = e
                    .as_database_error()
                    .map(|db| db.is_unique_violation())
                    .unwrap_or(false);
                if is_unique_violation {
                    Err(CacheStoreError::Conflict(entry.text_hash.clone()))
                } else {
                    Err(CacheStoreError::DatabaseError(e.to_string()))
                }
            }
        }
    }

    async fn touch(&self, text_hash: &str) -> Result<(), CacheStoreError> {
        sqlx::query("UPDATE audio_cache SET last_used_at = ? WHERE text_hash = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(text_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| CacheStoreError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<EvictedEntry>, CacheStoreError> {
        let cutoff = cutoff.to_rfc3339();

        // 同一事务内先取定位信息再删除，保证两者看到同一快照
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CacheStoreError::DatabaseError(e.to_string()))?;

        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT text_hash, file_name FROM audio_cache WHERE last_used_at < ?",
        )
        .bind(&cutoff)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| CacheStoreError::DatabaseError(e.to_string()))?;

        sqlx::query("DELETE FROM audio_cache WHERE last_used_at < ?")
            .bind(&cutoff)
            .execute(&mut *tx)
            .await
            .map_err(|e| CacheStoreError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| CacheStoreError::DatabaseError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(text_hash, file_name)| EvictedEntry {
                text_hash,
                location: AudioLocation::new(file_name),
            })
            .collect())
    }

    async fn statistics(&self) -> Result<CacheStatistics, CacheStoreError> {
        let aggregate: AggregateRow = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS cnt,
                   COALESCE(SUM(file_size), 0) AS total_size,
                   COALESCE(AVG(file_size), 0.0) AS avg_size,
                   MIN(created_at) AS oldest,
                   MAX(created_at) AS newest
            FROM audio_cache
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CacheStoreError::DatabaseError(e.to_string()))?;

        // 并列时取字典序最小的 voice_id，保证结果确定
        let most_used: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT voice_id FROM audio_cache
            GROUP BY voice_id
            ORDER BY COUNT(*) DESC, voice_id ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CacheStoreError::DatabaseError(e.to_string()))?;

        Ok(CacheStatistics {
            total_entries: aggregate.cnt as u64,
            total_size_bytes: aggregate.total_size as u64,
            avg_file_size: aggregate.avg_size,
            oldest_created_at: aggregate.oldest.as_deref().map(parse_timestamp).transpose()?,
            newest_created_at: aggregate.newest.as_deref().map(parse_timestamp).transpose()?,
            most_used_voice_id: most_used.map(|(voice_id,)| voice_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn store() -> SqliteCacheStore {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteCacheStore::new(pool)
    }

    fn entry(hash: &str, voice_id: &str, file_size: u64) -> CacheEntryRecord {
        let now = Utc::now();
        CacheEntryRecord {
            text_hash: hash.to_string(),
            text: "some text".to_string(),
            voice_id: voice_id.to_string(),
            voice_settings: json!({"stability": 0.75}),
            audio_url: format!("/storage/audio/tts_{}.mp3", hash),
            file_name: format!("tts_{}.mp3", hash),
            file_size,
            duration_secs: Some(1.5),
            source: AudioSource::Generated,
            created_at: now,
            last_used_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_lookup_round_trip() {
        let store = store().await;
        let record = entry(&"a".repeat(32), "voice-1", 100);

        store.insert(&record).await.unwrap();
        let found = store.lookup(&record.text_hash).await.unwrap().unwrap();

        assert_eq!(found.text, record.text);
        assert_eq!(found.voice_id, record.voice_id);
        assert_eq!(found.voice_settings, record.voice_settings);
        assert_eq!(found.file_size, 100);
        assert_eq!(found.duration_secs, Some(1.5));
        assert_eq!(found.source, AudioSource::Generated);
    }

    #[tokio::test]
    async fn test_lookup_missing_returns_none() {
        let store = store().await;
        assert!(store.lookup(&"f".repeat(32)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_conflict() {
        let store = store().await;
        let record = entry(&"b".repeat(32), "voice-1", 100);

        store.insert(&record).await.unwrap();
        let err = store.insert(&record).await.unwrap_err();
        assert!(matches!(err, CacheStoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_touch_moves_last_used_forward_only() {
        let store = store().await;
        let mut record = entry(&"c".repeat(32), "voice-1", 100);
        let past = Utc::now() - Duration::hours(1);
        record.created_at = past;
        record.last_used_at = past;
        store.insert(&record).await.unwrap();

        store.touch(&record.text_hash).await.unwrap();
        let found = store.lookup(&record.text_hash).await.unwrap().unwrap();

        assert!(found.last_used_at > past);
        // touch 不改动其他字段
        assert_eq!(found.created_at, parse_timestamp(&past.to_rfc3339()).unwrap());
        assert_eq!(found.file_size, record.file_size);
        assert_eq!(found.text, record.text);
    }

    #[tokio::test]
    async fn test_delete_older_than_boundary() {
        let store = store().await;
        let now = Utc::now();

        let mut stale = entry(&"d".repeat(32), "voice-1", 100);
        stale.last_used_at = now - Duration::days(40);
        store.insert(&stale).await.unwrap();

        let mut fresh = entry(&"e".repeat(32), "voice-1", 100);
        fresh.last_used_at = now - Duration::days(5);
        store.insert(&fresh).await.unwrap();

        let evicted = store
            .delete_older_than(now - Duration::days(30))
            .await
            .unwrap();

        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].text_hash, stale.text_hash);
        assert_eq!(evicted[0].location.file_name, stale.file_name);
        assert!(store.lookup(&stale.text_hash).await.unwrap().is_none());
        assert!(store.lookup(&fresh.text_hash).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_statistics_aggregates() {
        let store = store().await;
        store.insert(&entry(&"1".repeat(32), "voice-a", 100)).await.unwrap();
        store.insert(&entry(&"2".repeat(32), "voice-a", 200)).await.unwrap();
        store.insert(&entry(&"3".repeat(32), "voice-b", 300)).await.unwrap();

        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.total_size_bytes, 600);
        assert!((stats.avg_file_size - 200.0).abs() < f64::EPSILON);
        assert!(stats.oldest_created_at.is_some());
        assert!(stats.newest_created_at.is_some());
        assert_eq!(stats.most_used_voice_id.as_deref(), Some("voice-a"));
    }

    #[tokio::test]
    async fn test_statistics_tie_break_is_deterministic() {
        let store = store().await;
        store.insert(&entry(&"4".repeat(32), "voice-z", 10)).await.unwrap();
        store.insert(&entry(&"5".repeat(32), "voice-a", 10)).await.unwrap();

        let stats = store.statistics().await.unwrap();
        // 并列时取字典序最小
        assert_eq!(stats.most_used_voice_id.as_deref(), Some("voice-a"));
    }

    #[tokio::test]
    async fn test_statistics_empty_cache() {
        let store = store().await;
        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.total_size_bytes, 0);
        assert_eq!(stats.avg_file_size, 0.0);
        assert!(stats.oldest_created_at.is_none());
        assert!(stats.most_used_voice_id.is_none());
    }
}
