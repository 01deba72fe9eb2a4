//! TTS Adapters

mod elevenlabs_client;
mod fake_tts_client;

pub use elevenlabs_client::{ElevenLabsClient, ElevenLabsClientConfig};
pub use fake_tts_client::{FakeFailure, FakeTtsClient, FakeTtsClientConfig};
