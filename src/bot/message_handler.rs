//! Message handler module for processing incoming Telegram messages

use anyhow::Result;
use parking_lot::Mutex;
use sqlx::postgres::PgPool;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::cache::CacheManager;
use crate::config::AppConfig;
use crate::dialogue::{OrderDialogue, OrderDialogueState};
use crate::localization::{t_lang, LocalizationManager};

use super::command_handlers::{
    handle_cart_command, handle_help_command, handle_language_command, handle_menu_command,
    handle_start_command, handle_unknown_command,
};
use super::dialogue_manager::{
    cancel_dialogue, handle_checkout_address_input, handle_name_input,
    handle_onboarding_address_input, handle_phone_input, is_cancellation_command,
    CheckoutAddressParams, DialogueContext, NameInputParams, OnboardingAddressParams,
    PhoneInputParams,
};
use super::ui_builder::{create_main_menu_keyboard, create_onboarding_delivery_keyboard};

/// Entry point for all incoming messages
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    pool: Arc<PgPool>,
    dialogue: OrderDialogue,
    localization: Arc<LocalizationManager>,
    cache: Arc<Mutex<CacheManager>>,
    config: Arc<AppConfig>,
) -> Result<()> {
    if msg.text().is_some() {
        handle_text_message(&bot, &msg, dialogue, pool, localization, cache, config).await
    } else {
        handle_unsupported_message(&bot, &msg, &pool, &cache, &config, &localization).await
    }
}

async fn handle_text_message(
    bot: &Bot,
    msg: &Message,
    dialogue: OrderDialogue,
    pool: Arc<PgPool>,
    localization: Arc<LocalizationManager>,
    cache: Arc<Mutex<CacheManager>>,
    config: Arc<AppConfig>,
) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    debug!(user_id = %msg.chat.id, message_length = text.len(), "Received text message from user");

    // Language hint straight from the client, used until a stored preference
    // exists
    let client_language = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_deref());

    // Dialogue states consume text before any command handling
    let dialogue_state = dialogue.get().await?;
    match dialogue_state {
        Some(OrderDialogueState::AwaitingName { language_code }) => {
            let language_code = effective_language(language_code, client_language);
            let ctx = DialogueContext {
                bot,
                msg,
                dialogue,
                localization: &localization,
            };
            if is_cancellation_command(text) {
                return cancel_dialogue(ctx, language_code.as_deref()).await;
            }
            return handle_name_input(
                ctx,
                NameInputParams {
                    name_input: text,
                    language_code,
                },
            )
            .await;
        }
        Some(OrderDialogueState::AwaitingPhone {
            name,
            language_code,
        }) => {
            let language_code = effective_language(language_code, client_language);
            let ctx = DialogueContext {
                bot,
                msg,
                dialogue,
                localization: &localization,
            };
            if is_cancellation_command(text) {
                return cancel_dialogue(ctx, language_code.as_deref()).await;
            }
            return handle_phone_input(
                ctx,
                PhoneInputParams {
                    phone_input: text,
                    name,
                    language_code,
                },
            )
            .await;
        }
        Some(OrderDialogueState::AwaitingDeliveryMethod { language_code, .. }) => {
            let language_code = effective_language(language_code, client_language);
            if is_cancellation_command(text) {
                let ctx = DialogueContext {
                    bot,
                    msg,
                    dialogue,
                    localization: &localization,
                };
                return cancel_dialogue(ctx, language_code.as_deref()).await;
            }
            // This step is button-driven; repeat the question instead of
            // guessing at typed input
            bot.send_message(
                msg.chat.id,
                format!(
                    "🚚 {}",
                    t_lang(
                        &localization,
                        "ask-delivery-method",
                        language_code.as_deref()
                    )
                ),
            )
            .reply_markup(create_onboarding_delivery_keyboard(
                language_code.as_deref(),
                &localization,
            ))
            .await?;
            return Ok(());
        }
        Some(OrderDialogueState::AwaitingDeliveryAddress {
            name,
            phone,
            language_code,
        }) => {
            let language_code = effective_language(language_code, client_language);
            let ctx = DialogueContext {
                bot,
                msg,
                dialogue,
                localization: &localization,
            };
            if is_cancellation_command(text) {
                return cancel_dialogue(ctx, language_code.as_deref()).await;
            }
            return handle_onboarding_address_input(
                ctx,
                OnboardingAddressParams {
                    pool: &pool,
                    cache: &cache,
                    config: &config,
                    address_input: text,
                    name,
                    phone,
                    language_code,
                },
            )
            .await;
        }
        Some(OrderDialogueState::AwaitingCheckoutAddress { language_code }) => {
            let language_code = effective_language(language_code, client_language);
            let ctx = DialogueContext {
                bot,
                msg,
                dialogue,
                localization: &localization,
            };
            if is_cancellation_command(text) {
                return cancel_dialogue(ctx, language_code.as_deref()).await;
            }
            return handle_checkout_address_input(
                ctx,
                CheckoutAddressParams {
                    pool: &pool,
                    cache: &cache,
                    config: &config,
                    address_input: text,
                    language_code,
                },
            )
            .await;
        }
        Some(OrderDialogueState::Start) | None => {
            // Continue with normal command handling
        }
    }

    let language = crate::bot::resolve_user_language(
        &pool,
        &cache,
        &config,
        &localization,
        msg.chat.id.0,
        client_language,
    )
    .await;
    let language_code = Some(language.as_str());

    if text == "/start" {
        handle_start_command(bot, msg, &pool, &cache, language_code, &localization).await?;
    } else if text == "/menu" {
        handle_menu_command(bot, msg, &pool, &cache, language_code, &localization).await?;
    } else if text == "/cart" {
        handle_cart_command(bot, msg, &pool, &config, language_code, &localization).await?;
    } else if text == "/language" {
        handle_language_command(bot, msg, language_code, &localization).await?;
    } else if text == "/help" {
        handle_help_command(bot, msg, language_code, &localization).await?;
    } else if text.starts_with('/') {
        handle_unknown_command(bot, msg, language_code, &localization).await?;
    } else {
        // Free text outside a dialogue; point back at the menu
        bot.send_message(
            msg.chat.id,
            t_lang(&localization, "fallback-text", language_code),
        )
        .reply_markup(create_main_menu_keyboard(language_code, &localization))
        .await?;
    }

    Ok(())
}

/// Prefer the language captured when the dialogue started over the client hint
fn effective_language(
    dialogue_language: Option<String>,
    client_language: Option<&str>,
) -> Option<String> {
    dialogue_language.or_else(|| client_language.map(str::to_string))
}

async fn handle_unsupported_message(
    bot: &Bot,
    msg: &Message,
    pool: &PgPool,
    cache: &Arc<Mutex<CacheManager>>,
    config: &Arc<AppConfig>,
    localization: &Arc<LocalizationManager>,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Received unsupported message type from user");

    let client_language = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_deref());
    let language = crate::bot::resolve_user_language(
        pool,
        cache,
        config,
        localization,
        msg.chat.id.0,
        client_language,
    )
    .await;

    bot.send_message(
        msg.chat.id,
        t_lang(localization, "fallback-unsupported", Some(language.as_str())),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_language_prefers_dialogue() {
        assert_eq!(
            effective_language(Some("he".to_string()), Some("en")),
            Some("he".to_string())
        );
        assert_eq!(
            effective_language(None, Some("en-US")),
            Some("en-US".to_string())
        );
        assert_eq!(effective_language(None, None), None);
    }
}
