//! Query Handlers

mod custom_audio_query_handlers;
mod speech_query_handlers;

pub use custom_audio_query_handlers::{ListCustomAudioHandler, SearchCustomAudioHandler};
pub use speech_query_handlers::{
    GetCachedEntryHandler, GetCacheStatsHandler, ListProviderVoicesHandler,
};
