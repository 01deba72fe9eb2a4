//! Cleanup Worker - 定时缓存清理
//!
//! 按固定间隔触发一次年龄清理，相当于运维侧的调度器。
//! HTTP 端点仍可随时手动触发。

use std::sync::Arc;

use crate::application::commands::CleanupCache;
use crate::application::CleanupCacheHandler;

/// Cleanup Worker 配置
#[derive(Debug, Clone)]
pub struct CleanupWorkerConfig {
    /// 清理间隔（秒）
    pub interval_secs: u64,
    /// 保留天数
    pub max_age_days: u32,
}

/// Cleanup Worker
pub struct CleanupWorker {
    config: CleanupWorkerConfig,
    handler: Arc<CleanupCacheHandler>,
}

impl CleanupWorker {
    pub fn new(config: CleanupWorkerConfig, handler: Arc<CleanupCacheHandler>) -> Self {
        Self { config, handler }
    }

    /// 运行清理循环（tokio::spawn 执行）
    pub async fn run(self) {
        let period = std::time::Duration::from_secs(self.config.interval_secs);
        let mut ticker = tokio::time::interval(period);
        // 第一个 tick 立即返回，跳过以避免启动时清理
        ticker.tick().await;

        tracing::info!(
            interval_secs = self.config.interval_secs,
            max_age_days = self.config.max_age_days,
            "Cleanup worker started"
        );

        loop {
            ticker.tick().await;

            match self
                .handler
                .handle(CleanupCache {
                    max_age_days: Some(self.config.max_age_days),
                })
                .await
            {
                Ok(result) => {
                    if result.removed > 0 {
                        tracing::info!(removed = result.removed, "Scheduled cache cleanup done");
                    } else {
                        tracing::debug!("Scheduled cache cleanup found nothing to remove");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Scheduled cache cleanup failed");
                }
            }
        }
    }
}
