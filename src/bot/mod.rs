//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `callbacks`: All callback query handling (organized into submodules)
//! - `command_handlers`: Slash commands (/start, /menu, /cart, ...)
//! - `message_handler`: Handles incoming text messages and dialogue input
//! - `ui_builder`: Creates keyboards and formats messages
//! - `dialogue_manager`: Manages dialogue state transitions and validation

pub mod callbacks;
pub mod command_handlers;
pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

use parking_lot::Mutex;
use sqlx::postgres::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{cache_user_language, cached_user_language, CacheManager};
use crate::config::AppConfig;
use crate::db::get_customer_cached;
use crate::localization::{detect_language, LocalizationManager};

/// Resolve the language to answer a user in
///
/// Checks the process-wide language cache first, then the stored customer
/// profile, and finally falls back to the Telegram client hint. Database
/// errors degrade to the hint; replies never fail on a language read.
pub async fn resolve_user_language(
    pool: &PgPool,
    cache: &Arc<Mutex<CacheManager>>,
    config: &AppConfig,
    localization: &Arc<LocalizationManager>,
    telegram_id: i64,
    client_hint: Option<&str>,
) -> String {
    if let Some(language) = cached_user_language(telegram_id) {
        return language;
    }

    let stored = get_customer_cached(pool, cache, telegram_id)
        .await
        .ok()
        .flatten()
        .map(|customer| customer.language);

    if let Some(language) = stored {
        cache_user_language(
            telegram_id,
            language.clone(),
            Duration::from_secs(config.cache.language_ttl_secs),
        );
        return language;
    }

    detect_language(localization, client_hint)
}

// Re-export main handler functions for use in main.rs
pub use callbacks::callback_handler::callback_handler;
pub use message_handler::message_handler;
