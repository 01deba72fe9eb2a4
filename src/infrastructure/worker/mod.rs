//! Background Workers

mod cleanup_worker;

pub use cleanup_worker::{CleanupWorker, CleanupWorkerConfig};
