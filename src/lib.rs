//! Voxfolio - 个人主页后端（TTS 音频缓存核心）
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Audio: 指纹计算、音频格式、来源枚举（纯函数，无 I/O）
//!
//! 应用层 (application/):
//! - Ports: 端口定义（CacheStore, ArtifactStore, TtsProvider, AudioProbe, CustomAudioRepository）
//! - Commands: 合成（含缓存编排）、清理、自定义音频写操作
//! - Queries: 缓存查询、统计、音色目录、自定义音频读操作
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Persistence: SQLite 元数据存储
//! - Adapters: ElevenLabs 客户端、文件存储、时长探测
//! - Worker: 定时清理任务

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
