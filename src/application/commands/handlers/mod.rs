//! Command Handlers

mod custom_audio_handlers;
mod speech_command_handlers;

pub use custom_audio_handlers::{
    DeleteCustomAudioHandler, UpdateCustomAudioHandler, UploadCustomAudioHandler,
};
pub use speech_command_handlers::{
    CleanupCacheHandler, CleanupCacheResponse, SynthesizeSpeechHandler, SynthesizeSpeechResponse,
    DEFAULT_MAX_AGE_DAYS, MAX_TTS_TEXT_LEN,
};
