//! Custom Audio Commands - 自定义音频命令定义

/// 上传自定义音频
#[derive(Debug, Clone)]
pub struct UploadCustomAudio {
    pub title: String,
    pub description: Option<String>,
    pub note_id: Option<i64>,
    pub text_content: Option<String>,
    /// 上传方声明的 MIME 类型
    pub content_type: String,
    pub data: Vec<u8>,
}

/// 更新自定义音频（仅提供的字段生效）
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomAudio {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub text_content: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// 删除自定义音频（连同物理文件）
#[derive(Debug, Clone)]
pub struct DeleteCustomAudio {
    pub id: i64,
}
