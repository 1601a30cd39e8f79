//! Callback handler module for processing inline keyboard callback queries

use anyhow::Result;
use parking_lot::Mutex;
use sqlx::postgres::PgPool;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::MaybeInaccessibleMessage;
use tracing::debug;

use crate::cache::CacheManager;
use crate::catalog;
use crate::config::AppConfig;
use crate::dialogue::{OrderDialogue, OrderDialogueState};
use crate::localization::LocalizationManager;

use crate::bot::dialogue_manager::{self, OnboardingDeliveryParams};

use super::callback_types::CallbackContext;
use super::cart_callbacks;
use super::menu_callbacks;
use super::order_callbacks;

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: teloxide::types::CallbackQuery,
    pool: Arc<PgPool>,
    dialogue: OrderDialogue,
    localization: Arc<LocalizationManager>,
    cache: Arc<Mutex<CacheManager>>,
    config: Arc<AppConfig>,
) -> Result<()> {
    let dialogue_state = dialogue.get().await?;
    debug!(user_id = %q.from.id, dialogue_state = ?dialogue_state, "Retrieved dialogue state");

    let data = q.data.as_deref().unwrap_or("");

    // Buttons only live on accessible messages; anything else just gets the
    // spinner cleared
    let accessible = match &q.message {
        Some(MaybeInaccessibleMessage::Regular(msg)) => Some((msg.chat.id, msg.id)),
        _ => None,
    };
    let Some((chat_id, message_id)) = accessible else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    // The onboarding delivery step owns its buttons; checkout must not see
    // delivery_* data while it is active
    if let Some(OrderDialogueState::AwaitingDeliveryMethod {
        name,
        phone,
        language_code,
    }) = dialogue_state
    {
        dialogue_manager::handle_onboarding_delivery_method(
            &bot,
            chat_id,
            message_id,
            data,
            &dialogue,
            OnboardingDeliveryParams {
                pool: &pool,
                cache: &cache,
                config: &config,
                localization: &localization,
                name,
                phone,
                language_code,
            },
        )
        .await?;

        bot.answer_callback_query(q.id).await?;
        return Ok(());
    }

    let telegram_id = q.from.id.0 as i64;
    let language = crate::bot::resolve_user_language(
        &pool,
        &cache,
        &config,
        &localization,
        telegram_id,
        q.from.language_code.as_deref(),
    )
    .await;

    let ctx = CallbackContext {
        bot: &bot,
        chat_id,
        message_id,
        telegram_id,
        language_code: Some(language.as_str()),
        pool: &pool,
        cache: &cache,
        config: &config,
        localization: &localization,
    };

    if data.starts_with("language_") {
        menu_callbacks::handle_language_selection(&ctx, data, &dialogue).await?;
    } else if data == "menu_main" {
        menu_callbacks::handle_main_menu(&ctx).await?;
    } else if catalog::menu_target(data).is_some() {
        menu_callbacks::handle_menu_navigation(&ctx, data).await?;
    } else if catalog::product_selection(data).is_some() {
        menu_callbacks::handle_product_add(&ctx, data).await?;
    } else if data == "cart_view" {
        cart_callbacks::handle_cart_view(&ctx).await?;
    } else if data == "cart_clear_confirm" {
        cart_callbacks::handle_clear_confirm(&ctx).await?;
    } else if data == "cart_clear_yes" {
        cart_callbacks::handle_clear_cart(&ctx).await?;
    } else if data == "cart_checkout" {
        cart_callbacks::handle_checkout(&ctx).await?;
    } else if data.starts_with("cart_inc_")
        || data.starts_with("cart_dec_")
        || data.starts_with("cart_remove_")
    {
        cart_callbacks::handle_cart_adjustment(&ctx, data).await?;
    } else if data.starts_with("delivery_") {
        cart_callbacks::handle_delivery_choice(&ctx, data, &dialogue).await?;
    } else if data == "confirm_order" {
        order_callbacks::handle_confirm_order(&ctx).await?;
    } else if data.starts_with("order_confirm_") {
        order_callbacks::handle_admin_order_confirm(&ctx, data).await?;
    } else if data == "hilbeh_unavailable" || data == "noop" {
        // Informational buttons; answering below clears the spinner
    } else {
        debug!(user_id = %telegram_id, data = %data, "Unhandled callback data");
    }

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;

    Ok(())
}
