//! Application Layer - 应用层
//!
//! Ports + Commands + Queries

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

pub use commands::handlers::{
    CleanupCacheHandler, CleanupCacheResponse, DeleteCustomAudioHandler, SynthesizeSpeechHandler,
    SynthesizeSpeechResponse, UpdateCustomAudioHandler, UploadCustomAudioHandler,
    DEFAULT_MAX_AGE_DAYS, MAX_TTS_TEXT_LEN,
};
pub use commands::{CleanupCache, DeleteCustomAudio, SynthesizeSpeech, UpdateCustomAudio, UploadCustomAudio};
pub use error::ApplicationError;
pub use ports::*;
pub use queries::handlers::{
    GetCachedEntryHandler, GetCacheStatsHandler, ListCustomAudioHandler, ListProviderVoicesHandler,
    SearchCustomAudioHandler,
};
pub use queries::{GetCachedEntry, GetCacheStats, ListCustomAudio, ListProviderVoices, SearchCustomAudio};
