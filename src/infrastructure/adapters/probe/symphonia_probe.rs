//! Symphonia Audio Probe - 基于 symphonia 的时长探测
//!
//! 从容器元信息推算时长；探测失败返回 None，
//! 对应元数据中的可空 duration 字段

use std::io::Cursor;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::AudioProbePort;
use crate::domain::audio::AudioFormat;

/// Symphonia 时长探测器
#[derive(Debug, Default)]
pub struct SymphoniaAudioProbe;

impl SymphoniaAudioProbe {
    pub fn new() -> Self {
        Self
    }
}

impl AudioProbePort for SymphoniaAudioProbe {
    fn duration_secs(&self, data: &[u8], format: AudioFormat) -> Option<f64> {
        let stream =
            MediaSourceStream::new(Box::new(Cursor::new(data.to_vec())), Default::default());

        let mut hint = Hint::new();
        hint.with_extension(format.extension());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .ok()?;

        let track = probed.format.default_track()?;
        let params = &track.codec_params;

        let n_frames = params.n_frames?;
        let sample_rate = params.sample_rate?;
        if sample_rate == 0 {
            return None;
        }

        Some(n_frames as f64 / f64::from(sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造一个 1 秒、8kHz、16bit 单声道的最小 WAV
    fn tiny_wav(seconds: u32, sample_rate: u32) -> Vec<u8> {
        let num_samples = seconds * sample_rate;
        let data_len = num_samples * 2;
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&1u16.to_le_bytes()); // mono
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * 2).to_le_bytes()); // byte rate
        out.extend_from_slice(&2u16.to_le_bytes()); // block align
        out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        out.extend(std::iter::repeat(0u8).take(data_len as usize));
        out
    }

    #[test]
    fn test_probe_wav_duration() {
        let probe = SymphoniaAudioProbe::new();
        let wav = tiny_wav(1, 8000);

        let duration = probe.duration_secs(&wav, AudioFormat::Wav).unwrap();
        assert!((duration - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_probe_garbage_returns_none() {
        let probe = SymphoniaAudioProbe::new();
        assert!(probe
            .duration_secs(b"definitely not audio", AudioFormat::Mp3)
            .is_none());
    }
}
