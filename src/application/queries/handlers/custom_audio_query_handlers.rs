//! Custom Audio Query Handlers - 自定义音频读操作

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{CustomAudioRecord, CustomAudioRepositoryPort};
use crate::application::queries::{ListCustomAudio, SearchCustomAudio};

/// ListCustomAudio Handler
pub struct ListCustomAudioHandler {
    custom_audio_repo: Arc<dyn CustomAudioRepositoryPort>,
}

impl ListCustomAudioHandler {
    pub fn new(custom_audio_repo: Arc<dyn CustomAudioRepositoryPort>) -> Self {
        Self { custom_audio_repo }
    }

    pub async fn handle(
        &self,
        query: ListCustomAudio,
    ) -> Result<Vec<CustomAudioRecord>, ApplicationError> {
        Ok(self
            .custom_audio_repo
            .find_all(query.note_id, query.active_only)
            .await?)
    }
}

/// SearchCustomAudio Handler
pub struct SearchCustomAudioHandler {
    custom_audio_repo: Arc<dyn CustomAudioRepositoryPort>,
}

impl SearchCustomAudioHandler {
    pub fn new(custom_audio_repo: Arc<dyn CustomAudioRepositoryPort>) -> Self {
        Self { custom_audio_repo }
    }

    pub async fn handle(
        &self,
        query: SearchCustomAudio,
    ) -> Result<Vec<CustomAudioRecord>, ApplicationError> {
        if query.query.is_empty() {
            return Err(ApplicationError::validation("Search query is required"));
        }
        Ok(self
            .custom_audio_repo
            .search(&query.query, query.field)
            .await?)
    }
}
