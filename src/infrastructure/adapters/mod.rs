//! Infrastructure Adapters

pub mod probe;
pub mod storage;
pub mod tts;

pub use probe::SymphoniaAudioProbe;
pub use storage::FsArtifactStore;
pub use tts::{ElevenLabsClient, ElevenLabsClientConfig, FakeTtsClient, FakeTtsClientConfig};
