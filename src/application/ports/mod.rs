//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod artifact_store;
mod audio_probe;
mod cache_store;
mod custom_audio;
mod tts_provider;

pub use artifact_store::{ArtifactStoreError, ArtifactStorePort, AudioLocation};
pub use audio_probe::AudioProbePort;
pub use cache_store::{
    CacheEntryRecord, CacheStatistics, CacheStoreError, CacheStorePort, EvictedEntry,
};
pub use custom_audio::{
    CustomAudioPatch, CustomAudioRecord, CustomAudioRepositoryPort, NewCustomAudio,
    RepositoryError, SearchField,
};
pub use tts_provider::{
    SynthesisError, SynthesisRequest, SynthesizedAudio, TtsProviderPort, VoiceInfo,
};
