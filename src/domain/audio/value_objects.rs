//! Audio Value Objects - 音频值对象

use serde::{Deserialize, Serialize};

/// 音频来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSource {
    /// TTS 生成
    Generated,
    /// 人工上传
    Uploaded,
}

impl AudioSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioSource::Generated => "generated",
            AudioSource::Uploaded => "uploaded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "generated" => Some(AudioSource::Generated),
            "uploaded" => Some(AudioSource::Uploaded),
            _ => None,
        }
    }
}

impl Default for AudioSource {
    fn default() -> Self {
        AudioSource::Generated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_round_trip() {
        for source in [AudioSource::Generated, AudioSource::Uploaded] {
            assert_eq!(AudioSource::from_str(source.as_str()), Some(source));
        }
        assert_eq!(AudioSource::from_str("other"), None);
    }
}
