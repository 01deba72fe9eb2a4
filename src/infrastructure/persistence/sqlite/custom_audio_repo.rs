//! SQLite Custom Audio Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{
    CustomAudioPatch, CustomAudioRecord, CustomAudioRepositoryPort, NewCustomAudio,
    RepositoryError, SearchField,
};

/// SQLite Custom Audio Repository
pub struct SqliteCustomAudioRepository {
    pool: DbPool,
}

impl SqliteCustomAudioRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CustomAudioRow {
    id: i64,
    note_id: Option<i64>,
    title: String,
    description: Option<String>,
    audio_url: String,
    file_name: String,
    file_size: i64,
    duration_secs: Option<f64>,
    text_content: Option<String>,
    is_active: i64,
    uploaded_at: String,
}

impl TryFrom<CustomAudioRow> for CustomAudioRecord {
    type Error = RepositoryError;

    fn try_from(row: CustomAudioRow) -> Result<Self, Self::Error> {
        Ok(CustomAudioRecord {
            id: row.id,
            note_id: row.note_id,
            title: row.title,
            description: row.description,
            audio_url: row.audio_url,
            file_name: row.file_name,
            file_size: row.file_size as u64,
            duration_secs: row.duration_secs,
            text_content: row.text_content,
            is_active: row.is_active != 0,
            uploaded_at: parse_timestamp(&row.uploaded_at)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, note_id, title, description, audio_url, file_name,
           file_size, duration_secs, text_content, is_active, uploaded_at
    FROM custom_audio
"#;

#[async_trait]
impl CustomAudioRepositoryPort for SqliteCustomAudioRepository {
    async fn create(&self, audio: &NewCustomAudio) -> Result<CustomAudioRecord, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO custom_audio
                (note_id, title, description, audio_url, file_name, file_size,
                 duration_secs, text_content, is_active, uploaded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(audio.note_id)
        .bind(&audio.title)
        .bind(&audio.description)
        .bind(&audio.audio_url)
        .bind(&audio.file_name)
        .bind(audio.file_size as i64)
        .bind(audio.duration_secs)
        .bind(&audio.text_content)
        .bind(audio.uploaded_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CustomAudioRecord>, RepositoryError> {
        let row: Option<CustomAudioRow> =
            sqlx::query_as(&format!("{} WHERE id = ?", SELECT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(CustomAudioRecord::try_from).transpose()
    }

    async fn find_all(
        &self,
        note_id: Option<i64>,
        active_only: bool,
    ) -> Result<Vec<CustomAudioRecord>, RepositoryError> {
        let mut sql = format!("{} WHERE 1 = 1", SELECT_COLUMNS);
        if note_id.is_some() {
            sql.push_str(" AND note_id = ?");
        }
        if active_only {
            sql.push_str(" AND is_active = 1");
        }
        sql.push_str(" ORDER BY uploaded_at DESC");

        let mut query = sqlx::query_as::<_, CustomAudioRow>(&sql);
        if let Some(note_id) = note_id {
            query = query.bind(note_id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(CustomAudioRecord::try_from).collect()
    }

    async fn search(
        &self,
        query: &str,
        field: SearchField,
    ) -> Result<Vec<CustomAudioRecord>, RepositoryError> {
        let pattern = format!("%{}%", query.to_lowercase());

        let clause = match field {
            SearchField::Title => "LOWER(title) LIKE ?",
            SearchField::Description => "LOWER(COALESCE(description, '')) LIKE ?",
            SearchField::Content => "LOWER(COALESCE(text_content, '')) LIKE ?",
            SearchField::All => {
                "(LOWER(title) LIKE ? OR LOWER(COALESCE(description, '')) LIKE ? \
                 OR LOWER(COALESCE(text_content, '')) LIKE ?)"
            }
        };
        let sql = format!(
            "{} WHERE is_active = 1 AND {} ORDER BY uploaded_at DESC",
            SELECT_COLUMNS, clause
        );

        let mut db_query = sqlx::query_as::<_, CustomAudioRow>(&sql).bind(pattern.clone());
        if field == SearchField::All {
            db_query = db_query.bind(pattern.clone()).bind(pattern);
        }

        let rows = db_query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(CustomAudioRecord::try_from).collect()
    }

    async fn update(
        &self,
        id: i64,
        patch: &CustomAudioPatch,
    ) -> Result<CustomAudioRecord, RepositoryError> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        let title = patch.title.clone().unwrap_or(existing.title);
        let description = patch
            .description
            .clone()
            .unwrap_or(existing.description);
        let text_content = patch
            .text_content
            .clone()
            .unwrap_or(existing.text_content);
        let is_active = patch.is_active.unwrap_or(existing.is_active);

        sqlx::query(
            r#"
            UPDATE custom_audio
            SET title = ?, description = ?, text_content = ?, is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(&title)
        .bind(&description)
        .bind(&text_content)
        .bind(is_active as i64)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM custom_audio WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
