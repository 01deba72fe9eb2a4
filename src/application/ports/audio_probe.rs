//! Audio Probe Port - 音频时长探测
//!
//! 从音频字节中测量时长；失败不是错误，
//! 时长字段允许为空直到可测量

use crate::domain::audio::AudioFormat;

/// Audio Probe Port
pub trait AudioProbePort: Send + Sync {
    /// 测量时长（秒）
    ///
    /// 无法解析时返回 None
    fn duration_secs(&self, data: &[u8], format: AudioFormat) -> Option<f64>;
}
