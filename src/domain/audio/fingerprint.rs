//! Cache Fingerprint - 缓存指纹
//!
//! 指纹是 (text, voice_id, voice_settings) 的确定性映射，
//! 作为音频缓存的唯一 key。voice_settings 先做规范化序列化
//! （对象 key 递归排序），保证语义相同但 key 顺序不同的设置
//! 映射到同一条缓存。

use serde_json::{Map, Value};
use thiserror::Error;

/// 指纹错误
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("Invalid fingerprint: expected 32 lowercase hex chars, got {0:?}")]
    InvalidFormat(String),
}

/// 缓存指纹（MD5，32 位小写十六进制）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// 计算指纹
    ///
    /// 原像为 `text-voice_id-canonical(settings)`，任一输入变化
    /// 都会改变输出
    pub fn compute(text: &str, voice_id: &str, voice_settings: &Value) -> Self {
        let canonical = canonical_settings_json(voice_settings);
        let preimage = format!("{}-{}-{}", text, voice_id, canonical);
        let digest = md5::compute(preimage.as_bytes());
        Self(format!("{:x}", digest))
    }

    /// 解析外部传入的指纹字符串（如 URL 路径参数）
    pub fn parse(s: &str) -> Result<Self, FingerprintError> {
        if s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) {
            Ok(Self(s.to_string()))
        } else {
            Err(FingerprintError::InvalidFormat(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 规范化序列化 voice settings
///
/// 对象 key 递归排序后输出紧凑 JSON，数组顺序保持不变
pub fn canonical_settings_json(value: &Value) -> String {
    canonical_settings(value).to_string()
}

/// 规范化 voice settings（对象 key 递归排序）
pub fn canonical_settings(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            // serde_json::Map 的迭代顺序随 preserve_order feature 变化，这里显式排序
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonical_settings(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical_settings).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fingerprint_deterministic() {
        let settings = json!({"stability": 0.75, "style": 0.0});
        let a = Fingerprint::compute("hello", "voice-1", &settings);
        let b = Fingerprint::compute("hello", "voice-1", &settings);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn test_fingerprint_sensitive_to_each_input() {
        let settings = json!({"stability": 0.75});
        let base = Fingerprint::compute("hello", "voice-1", &settings);

        assert_ne!(base, Fingerprint::compute("hello!", "voice-1", &settings));
        assert_ne!(base, Fingerprint::compute("hello", "voice-2", &settings));
        assert_ne!(
            base,
            Fingerprint::compute("hello", "voice-1", &json!({"stability": 0.5}))
        );
    }

    #[test]
    fn test_fingerprint_sensitive_to_nested_settings_key() {
        let a = Fingerprint::compute("hi", "v", &json!({"opts": {"boost": true}}));
        let b = Fingerprint::compute("hi", "v", &json!({"opts": {"boost": false}}));
        assert_ne!(a, b);
    }

    #[test]
    fn test_canonicalization_ignores_key_order() {
        let a = json!({"b": 1, "a": {"y": 2, "x": 3}});
        let b = json!({"a": {"x": 3, "y": 2}, "b": 1});
        assert_eq!(canonical_settings_json(&a), canonical_settings_json(&b));

        let fa = Fingerprint::compute("t", "v", &a);
        let fb = Fingerprint::compute("t", "v", &b);
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_canonicalization_preserves_array_order() {
        let a = json!({"seq": [1, 2]});
        let b = json!({"seq": [2, 1]});
        assert_ne!(canonical_settings_json(&a), canonical_settings_json(&b));
    }

    #[test]
    fn test_parse_valid() {
        let fp = Fingerprint::compute("x", "y", &json!({}));
        let parsed = Fingerprint::parse(fp.as_str()).unwrap();
        assert_eq!(parsed, fp);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Fingerprint::parse("not-a-hash").is_err());
        assert!(Fingerprint::parse("ABCDEF0123456789ABCDEF0123456789").is_err());
        assert!(Fingerprint::parse("abc123").is_err());
    }
}
