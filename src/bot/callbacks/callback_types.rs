//! Shared types for callback handlers

use parking_lot::Mutex;
use sqlx::postgres::PgPool;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::MessageId;

use crate::cache::CacheManager;
use crate::config::AppConfig;
use crate::localization::LocalizationManager;

/// Everything a callback branch needs once the query has been unpacked
///
/// `chat_id` and `message_id` identify the message carrying the inline
/// keyboard, so branches can edit it in place. `language_code` is the
/// resolved customer language, not the raw Telegram client hint.
pub struct CallbackContext<'a> {
    pub bot: &'a Bot,
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub telegram_id: i64,
    pub language_code: Option<&'a str>,
    pub pool: &'a PgPool,
    pub cache: &'a Arc<Mutex<CacheManager>>,
    pub config: &'a Arc<AppConfig>,
    pub localization: &'a Arc<LocalizationManager>,
}
