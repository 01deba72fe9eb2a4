//! Application Commands - 写操作

pub mod handlers;

mod custom_audio_commands;
mod speech_commands;

pub use custom_audio_commands::{DeleteCustomAudio, UpdateCustomAudio, UploadCustomAudio};
pub use speech_commands::{CleanupCache, SynthesizeSpeech};
