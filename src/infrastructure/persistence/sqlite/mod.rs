//! SQLite Persistence

mod cache_store;
mod custom_audio_repo;
mod database;

pub use cache_store::SqliteCacheStore;
pub use custom_audio_repo::SqliteCustomAudioRepository;
pub use database::{create_pool, run_migrations, DatabaseConfig, DbPool};
