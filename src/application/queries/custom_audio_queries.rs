//! Custom Audio Queries - 自定义音频查询定义

use crate::application::ports::SearchField;

/// 自定义音频列表
#[derive(Debug, Clone)]
pub struct ListCustomAudio {
    pub note_id: Option<i64>,
    pub active_only: bool,
}

/// 自定义音频搜索
#[derive(Debug, Clone)]
pub struct SearchCustomAudio {
    pub query: String,
    pub field: SearchField,
}
