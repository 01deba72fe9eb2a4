//! Custom Audio Command Handlers - 自定义音频写操作

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{DeleteCustomAudio, UpdateCustomAudio, UploadCustomAudio};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ArtifactStorePort, AudioLocation, AudioProbePort, CustomAudioPatch, CustomAudioRecord,
    CustomAudioRepositoryPort, NewCustomAudio,
};

// ============================================================================
// UploadCustomAudio
// ============================================================================

/// UploadCustomAudio Handler
pub struct UploadCustomAudioHandler {
    custom_audio_repo: Arc<dyn CustomAudioRepositoryPort>,
    artifact_store: Arc<dyn ArtifactStorePort>,
    audio_probe: Arc<dyn AudioProbePort>,
}

impl UploadCustomAudioHandler {
    pub fn new(
        custom_audio_repo: Arc<dyn CustomAudioRepositoryPort>,
        artifact_store: Arc<dyn ArtifactStorePort>,
        audio_probe: Arc<dyn AudioProbePort>,
    ) -> Self {
        Self {
            custom_audio_repo,
            artifact_store,
            audio_probe,
        }
    }

    pub async fn handle(
        &self,
        command: UploadCustomAudio,
    ) -> Result<CustomAudioRecord, ApplicationError> {
        if command.title.is_empty() {
            return Err(ApplicationError::validation("Title is required"));
        }
        if command.data.is_empty() {
            return Err(ApplicationError::validation("Audio file is required"));
        }

        // 格式与大小校验在写盘前由 artifact store 完成
        let stem = format!("custom_{}", Uuid::new_v4());
        let (location, format) = self
            .artifact_store
            .store(&command.data, &command.content_type, &stem)
            .await?;
        let duration_secs = self.audio_probe.duration_secs(&command.data, format);

        let record = self
            .custom_audio_repo
            .create(&NewCustomAudio {
                note_id: command.note_id,
                title: command.title,
                description: command.description,
                audio_url: location.public_url(),
                file_name: location.file_name.clone(),
                file_size: command.data.len() as u64,
                duration_secs,
                text_content: command.text_content,
                uploaded_at: Utc::now(),
            })
            .await;

        match record {
            Ok(record) => {
                tracing::info!(
                    id = record.id,
                    title = %record.title,
                    file_size = record.file_size,
                    "Custom audio uploaded"
                );
                Ok(record)
            }
            Err(e) => {
                // 元数据写入失败时回收文件
                if let Err(delete_err) = self.artifact_store.delete(&location).await {
                    tracing::warn!(
                        file_name = %location.file_name,
                        error = %delete_err,
                        "Failed to roll back uploaded artifact"
                    );
                }
                Err(e.into())
            }
        }
    }
}

// ============================================================================
// UpdateCustomAudio
// ============================================================================

/// UpdateCustomAudio Handler
pub struct UpdateCustomAudioHandler {
    custom_audio_repo: Arc<dyn CustomAudioRepositoryPort>,
}

impl UpdateCustomAudioHandler {
    pub fn new(custom_audio_repo: Arc<dyn CustomAudioRepositoryPort>) -> Self {
        Self { custom_audio_repo }
    }

    pub async fn handle(
        &self,
        command: UpdateCustomAudio,
    ) -> Result<CustomAudioRecord, ApplicationError> {
        if let Some(title) = &command.title {
            if title.is_empty() {
                return Err(ApplicationError::validation("Title cannot be empty"));
            }
        }

        let record = self
            .custom_audio_repo
            .update(
                command.id,
                &CustomAudioPatch {
                    title: command.title,
                    description: command.description,
                    text_content: command.text_content,
                    is_active: command.is_active,
                },
            )
            .await?;

        tracing::info!(id = record.id, "Custom audio updated");
        Ok(record)
    }
}

// ============================================================================
// DeleteCustomAudio
// ============================================================================

/// DeleteCustomAudio Handler
pub struct DeleteCustomAudioHandler {
    custom_audio_repo: Arc<dyn CustomAudioRepositoryPort>,
    artifact_store: Arc<dyn ArtifactStorePort>,
}

impl DeleteCustomAudioHandler {
    pub fn new(
        custom_audio_repo: Arc<dyn CustomAudioRepositoryPort>,
        artifact_store: Arc<dyn ArtifactStorePort>,
    ) -> Self {
        Self {
            custom_audio_repo,
            artifact_store,
        }
    }

    pub async fn handle(&self, command: DeleteCustomAudio) -> Result<(), ApplicationError> {
        let record = self
            .custom_audio_repo
            .find_by_id(command.id)
            .await?
            .ok_or_else(|| {
                ApplicationError::not_found("Custom audio", command.id.to_string())
            })?;

        self.custom_audio_repo.delete(command.id).await?;

        // 文件缺失不是致命错误，只记录
        let location = AudioLocation::new(record.file_name.clone());
        match self.artifact_store.delete(&location).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(file_name = %record.file_name, "Custom audio file already absent");
            }
            Err(e) => {
                tracing::warn!(file_name = %record.file_name, error = %e, "Failed to delete custom audio file");
            }
        }

        tracing::info!(id = command.id, title = %record.title, "Custom audio deleted");
        Ok(())
    }
}
