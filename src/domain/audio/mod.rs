//! Audio Context - 音频上下文
//!
//! 缓存指纹、音频格式、音频来源的领域定义

mod fingerprint;
mod format;
mod value_objects;

pub use fingerprint::{canonical_settings, canonical_settings_json, Fingerprint, FingerprintError};
pub use format::AudioFormat;
pub use value_objects::AudioSource;
