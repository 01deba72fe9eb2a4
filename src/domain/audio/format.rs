//! Audio Format - 音频格式
//!
//! 系统接受的音频容器格式，以及 MIME / 扩展名 / 文件头的映射

use serde::{Deserialize, Serialize};

/// 接受的音频格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
    M4a,
    Ogg,
    Webm,
}

impl AudioFormat {
    /// 从 MIME 类型解析
    pub fn from_mime(mime: &str) -> Option<Self> {
        // Content-Type 可能带参数（如 "; charset="），取分号前部分
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        match essence {
            "audio/mpeg" | "audio/mp3" => Some(AudioFormat::Mp3),
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(AudioFormat::Wav),
            "audio/m4a" | "audio/x-m4a" | "audio/mp4" => Some(AudioFormat::M4a),
            "audio/ogg" => Some(AudioFormat::Ogg),
            "audio/webm" => Some(AudioFormat::Webm),
            _ => None,
        }
    }

    /// 从文件扩展名解析
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "m4a" => Some(AudioFormat::M4a),
            "ogg" => Some(AudioFormat::Ogg),
            "webm" => Some(AudioFormat::Webm),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::M4a => "audio/mp4",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Webm => "audio/webm",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::M4a => "m4a",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Webm => "webm",
        }
    }

    /// 校验文件头是否与声明格式一致
    ///
    /// 只在能识别的文件头上做否定判断，识别不出时放行
    /// （部分编码器会省略可选头）
    pub fn matches_signature(&self, data: &[u8]) -> bool {
        match self {
            AudioFormat::Mp3 => {
                // ID3 tag 或 MPEG sync frame
                data.starts_with(b"ID3")
                    || (data.len() >= 2 && data[0] == 0xFF && data[1] & 0xE0 == 0xE0)
            }
            AudioFormat::Wav => {
                data.starts_with(b"RIFF") && data.len() >= 12 && &data[8..12] == b"WAVE"
            }
            AudioFormat::M4a => {
                // ftyp box 出现在前 20 字节内
                data.len() >= 12 && data[..20.min(data.len())].windows(4).any(|w| w == b"ftyp")
            }
            AudioFormat::Ogg => data.starts_with(b"OggS"),
            AudioFormat::Webm => data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]),
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mime() {
        assert_eq!(AudioFormat::from_mime("audio/mpeg"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_mime("audio/mp3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_mime("audio/wav"), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_mime("audio/ogg"), Some(AudioFormat::Ogg));
        assert_eq!(
            AudioFormat::from_mime("audio/webm; codecs=opus"),
            Some(AudioFormat::Webm)
        );
        assert_eq!(AudioFormat::from_mime("video/mp4"), None);
        assert_eq!(AudioFormat::from_mime("text/plain"), None);
    }

    #[test]
    fn test_from_extension_case_insensitive() {
        assert_eq!(AudioFormat::from_extension("MP3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_extension("flac"), None);
    }

    #[test]
    fn test_signatures() {
        assert!(AudioFormat::Mp3.matches_signature(b"ID3\x04rest"));
        assert!(AudioFormat::Mp3.matches_signature(&[0xFF, 0xFB, 0x90, 0x00]));
        assert!(!AudioFormat::Mp3.matches_signature(b"RIFF"));

        let wav = b"RIFF\x00\x00\x00\x00WAVEfmt ";
        assert!(AudioFormat::Wav.matches_signature(wav));
        assert!(!AudioFormat::Wav.matches_signature(b"OggS"));

        assert!(AudioFormat::Ogg.matches_signature(b"OggS\x00"));
        assert!(AudioFormat::Webm.matches_signature(&[0x1A, 0x45, 0xDF, 0xA3, 0x00]));
        assert!(AudioFormat::M4a.matches_signature(b"\x00\x00\x00\x20ftypM4A "));
    }
}
