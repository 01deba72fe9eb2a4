//! Speech Commands - 语音合成命令定义

use serde_json::Value;

/// 合成语音（命中缓存则直接返回）
#[derive(Debug, Clone)]
pub struct SynthesizeSpeech {
    pub text: String,
    /// 为空时使用配置的默认音色
    pub voice_id: Option<String>,
    /// 为空时按空对象参与指纹计算
    pub voice_settings: Option<Value>,
}

/// 清理过期缓存
#[derive(Debug, Clone)]
pub struct CleanupCache {
    /// 为空时使用默认保留天数
    pub max_age_days: Option<u32>,
}
