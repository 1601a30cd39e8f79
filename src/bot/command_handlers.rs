//! Command handlers module for processing bot commands

use anyhow::Result;
use parking_lot::Mutex;
use sqlx::postgres::PgPool;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::cache::CacheManager;
use crate::config::AppConfig;
use crate::db::{get_cart_by_telegram_id, get_cart_items, get_customer_cached, DeliveryMethod};
use crate::localization::{t_args_lang, t_lang, LocalizationManager};

use super::ui_builder::{
    create_cart_keyboard, create_language_keyboard, create_main_menu_keyboard, format_cart_message,
};

/// Handle the /start command
///
/// A registered customer is greeted by name and shown the menu; anyone else
/// gets the language picker, which is the first onboarding step.
pub async fn handle_start_command(
    bot: &Bot,
    msg: &Message,
    pool: &PgPool,
    cache: &Arc<Mutex<CacheManager>>,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Handling /start command");

    let customer = get_customer_cached(pool, cache, msg.chat.id.0).await?;

    match customer {
        Some(customer) => {
            let greeting = format!(
                "👋 {}\n\n{}",
                t_args_lang(
                    localization,
                    "welcome-back",
                    &[("name", customer.name.as_str())],
                    language_code,
                ),
                t_lang(localization, "menu-prompt", language_code)
            );
            bot.send_message(msg.chat.id, greeting)
                .reply_markup(create_main_menu_keyboard(language_code, localization))
                .await?;
        }
        None => {
            let welcome = format!(
                "🫓 {}\n\n{}",
                t_lang(localization, "welcome-new", language_code),
                t_lang(localization, "language-prompt", language_code)
            );
            bot.send_message(msg.chat.id, welcome)
                .reply_markup(create_language_keyboard())
                .await?;
        }
    }

    Ok(())
}

/// Handle the /menu command
pub async fn handle_menu_command(
    bot: &Bot,
    msg: &Message,
    pool: &PgPool,
    cache: &Arc<Mutex<CacheManager>>,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Handling /menu command");

    if get_customer_cached(pool, cache, msg.chat.id.0).await?.is_none() {
        let message = format!(
            "👋 {}",
            t_lang(localization, "registration-required", language_code)
        );
        bot.send_message(msg.chat.id, message)
            .reply_markup(create_language_keyboard())
            .await?;
        return Ok(());
    }

    let message = format!(
        "🍽️ **{}**\n\n{}",
        t_lang(localization, "menu-title", language_code),
        t_lang(localization, "menu-prompt", language_code)
    );
    bot.send_message(msg.chat.id, message)
        .reply_markup(create_main_menu_keyboard(language_code, localization))
        .await?;

    Ok(())
}

/// Handle the /cart command
pub async fn handle_cart_command(
    bot: &Bot,
    msg: &Message,
    pool: &PgPool,
    config: &Arc<AppConfig>,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Handling /cart command");

    let items = get_cart_items(pool, msg.chat.id.0).await?;

    if items.is_empty() {
        let message = format!(
            "🛒 {}\n\n{}",
            t_lang(localization, "cart-empty", language_code),
            t_lang(localization, "cart-empty-suggestion", language_code)
        );
        bot.send_message(msg.chat.id, message)
            .reply_markup(create_main_menu_keyboard(language_code, localization))
            .await?;
        return Ok(());
    }

    let delivery_method = get_cart_by_telegram_id(pool, msg.chat.id.0)
        .await?
        .map(|cart| cart.delivery_method)
        .unwrap_or_else(|| DeliveryMethod::Pickup.as_str().to_string());

    let message = format_cart_message(
        &items,
        &delivery_method,
        &config.business.currency,
        language_code,
        localization,
    );
    bot.send_message(msg.chat.id, message)
        .reply_markup(create_cart_keyboard(&items, language_code, localization))
        .await?;

    Ok(())
}

/// Handle the /language command
pub async fn handle_language_command(
    bot: &Bot,
    msg: &Message,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Handling /language command");

    let message = format!(
        "🌐 {}",
        t_lang(localization, "language-prompt", language_code)
    );
    bot.send_message(msg.chat.id, message)
        .reply_markup(create_language_keyboard())
        .await?;

    Ok(())
}

/// Handle the /help command
pub async fn handle_help_command(
    bot: &Bot,
    msg: &Message,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Handling /help command");

    let help_message = vec![
        t_lang(localization, "help-title", language_code),
        t_lang(localization, "help-description", language_code),
        t_lang(localization, "help-browse", language_code),
        t_lang(localization, "help-cart", language_code),
        t_lang(localization, "help-checkout", language_code),
        t_lang(localization, "help-commands", language_code),
        t_lang(localization, "help-command-start", language_code),
        t_lang(localization, "help-command-menu", language_code),
        t_lang(localization, "help-command-cart", language_code),
        t_lang(localization, "help-command-language", language_code),
        t_lang(localization, "help-cancel", language_code),
        t_lang(localization, "help-final", language_code),
    ]
    .join("\n\n");
    bot.send_message(msg.chat.id, help_message).await?;

    Ok(())
}

/// Handle a slash command the bot does not know
pub async fn handle_unknown_command(
    bot: &Bot,
    msg: &Message,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Received unknown command");

    bot.send_message(
        msg.chat.id,
        t_lang(localization, "unknown-command", language_code),
    )
    .await?;

    Ok(())
}
