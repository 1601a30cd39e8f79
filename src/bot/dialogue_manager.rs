//! Dialogue Manager module for handling dialogue state transitions

use anyhow::Result;
use parking_lot::Mutex;
use sqlx::postgres::PgPool;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::MessageId;
use tracing::{debug, info};

// Import error logging utilities
use crate::errors::error_logging;

// Import the language preference store
use crate::cache::{cache_user_language, CacheManager};

// Import configuration
use crate::config::AppConfig;

// Import dialogue types
use crate::dialogue::{OrderDialogue, OrderDialogueState};

// Import validation functions
use crate::validation::{
    validate_customer_name, validate_delivery_address, validate_phone_number,
};

// Import database operations
use crate::db::{self, DeliveryMethod};

// Import localization
use crate::localization::{t_args_lang, t_lang, LocalizationManager};

// Import UI builder functions
use super::ui_builder::{
    create_main_menu_keyboard, create_onboarding_delivery_keyboard, create_order_confirm_keyboard,
    format_order_summary,
};

/// Words that abort an in-progress dialogue when sent as plain text
const CANCELLATION_WORDS: [&str; 4] = ["/cancel", "cancel", "stop", "back"];

/// Check whether a text message asks to abort the current flow
pub fn is_cancellation_command(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    CANCELLATION_WORDS.iter().any(|word| *word == normalized)
}

/// Common context for dialogue handlers
pub struct DialogueContext<'a> {
    pub bot: &'a Bot,
    pub msg: &'a Message,
    pub dialogue: OrderDialogue,
    pub localization: &'a Arc<LocalizationManager>,
}

/// Parameters for customer name input handling
pub struct NameInputParams<'a> {
    pub name_input: &'a str,
    pub language_code: Option<String>,
}

/// Parameters for phone number input handling
pub struct PhoneInputParams<'a> {
    pub phone_input: &'a str,
    pub name: String,
    pub language_code: Option<String>,
}

/// Parameters for onboarding address input handling
pub struct OnboardingAddressParams<'a> {
    pub pool: &'a PgPool,
    pub cache: &'a Arc<Mutex<CacheManager>>,
    pub config: &'a Arc<AppConfig>,
    pub address_input: &'a str,
    pub name: String,
    pub phone: String,
    pub language_code: Option<String>,
}

/// Parameters for the onboarding pickup/delivery callback
pub struct OnboardingDeliveryParams<'a> {
    pub pool: &'a PgPool,
    pub cache: &'a Arc<Mutex<CacheManager>>,
    pub config: &'a Arc<AppConfig>,
    pub localization: &'a Arc<LocalizationManager>,
    pub name: String,
    pub phone: String,
    pub language_code: Option<String>,
}

/// Parameters for checkout address input handling
pub struct CheckoutAddressParams<'a> {
    pub pool: &'a PgPool,
    pub cache: &'a Arc<Mutex<CacheManager>>,
    pub config: &'a Arc<AppConfig>,
    pub address_input: &'a str,
    pub language_code: Option<String>,
}

struct RegistrationParams<'a> {
    pool: &'a PgPool,
    cache: &'a Arc<Mutex<CacheManager>>,
    config: &'a Arc<AppConfig>,
    localization: &'a Arc<LocalizationManager>,
    name: &'a str,
    phone: &'a str,
    language: &'a str,
    delivery_address: Option<&'a str>,
}

/// Ask for the customer's name and enter the onboarding dialogue
///
/// Called when a language is picked by someone without a customer record.
/// Edits the language keyboard message in place when its id is known.
pub async fn begin_onboarding(
    bot: &Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    dialogue: &OrderDialogue,
    language: &str,
    localization: &Arc<LocalizationManager>,
) -> Result<()> {
    debug!(user_id = %chat_id, language = %language, "Starting onboarding");

    let prompt = t_lang(localization, "ask-name", Some(language));
    match message_id {
        Some(message_id) => {
            bot.edit_message_text(chat_id, message_id, prompt).await?;
        }
        None => {
            bot.send_message(chat_id, prompt).await?;
        }
    }

    dialogue
        .update(OrderDialogueState::AwaitingName {
            language_code: Some(language.to_string()),
        })
        .await?;

    Ok(())
}

/// Handle customer name input during onboarding
pub async fn handle_name_input(
    ctx: DialogueContext<'_>,
    params: NameInputParams<'_>,
) -> Result<()> {
    let DialogueContext {
        bot,
        msg,
        dialogue,
        localization,
    } = ctx;
    let NameInputParams {
        name_input,
        language_code,
    } = params;
    let language = language_code.as_deref();

    match validate_customer_name(name_input) {
        Ok(validated_name) => {
            debug!(user_id = %msg.chat.id, "Customer name accepted");

            bot.send_message(msg.chat.id, t_lang(localization, "ask-phone", language))
                .await?;

            dialogue
                .update(OrderDialogueState::AwaitingPhone {
                    name: validated_name.to_string(),
                    language_code,
                })
                .await?;
        }
        Err(reason_key) => {
            // Keep dialogue active, user can try again
            bot.send_message(msg.chat.id, t_lang(localization, reason_key, language))
                .await?;
        }
    }

    Ok(())
}

/// Handle phone number input during onboarding
pub async fn handle_phone_input(
    ctx: DialogueContext<'_>,
    params: PhoneInputParams<'_>,
) -> Result<()> {
    let DialogueContext {
        bot,
        msg,
        dialogue,
        localization,
    } = ctx;
    let PhoneInputParams {
        phone_input,
        name,
        language_code,
    } = params;
    let language = language_code.as_deref();

    match validate_phone_number(phone_input) {
        Ok(normalized_phone) => {
            debug!(user_id = %msg.chat.id, "Phone number accepted");

            let keyboard = create_onboarding_delivery_keyboard(language, localization);
            bot.send_message(
                msg.chat.id,
                t_lang(localization, "ask-delivery-method", language),
            )
            .reply_markup(keyboard)
            .await?;

            dialogue
                .update(OrderDialogueState::AwaitingDeliveryMethod {
                    name,
                    phone: normalized_phone,
                    language_code,
                })
                .await?;
        }
        Err(reason_key) => {
            // Keep dialogue active, user can try again
            bot.send_message(msg.chat.id, t_lang(localization, reason_key, language))
                .await?;
        }
    }

    Ok(())
}

/// Handle the pickup/delivery choice during onboarding
///
/// Pickup completes registration immediately; delivery asks for an address
/// first.
pub async fn handle_onboarding_delivery_method(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    data: &str,
    dialogue: &OrderDialogue,
    params: OnboardingDeliveryParams<'_>,
) -> Result<()> {
    let OnboardingDeliveryParams {
        pool,
        cache,
        config,
        localization,
        name,
        phone,
        language_code,
    } = params;
    let language = language_code.as_deref();

    match data {
        "delivery_pickup" => {
            bot.edit_message_text(
                chat_id,
                message_id,
                format!("✅ {}", t_lang(localization, "pickup-label", language)),
            )
            .await?;

            complete_registration(
                bot,
                chat_id,
                dialogue,
                RegistrationParams {
                    pool,
                    cache,
                    config,
                    localization,
                    name: &name,
                    phone: &phone,
                    language: language.unwrap_or(crate::localization::DEFAULT_LANGUAGE),
                    delivery_address: None,
                },
            )
            .await?;
        }
        "delivery_delivery" => {
            bot.edit_message_text(
                chat_id,
                message_id,
                format!("✅ {}", t_lang(localization, "delivery-label", language)),
            )
            .await?;

            bot.send_message(chat_id, t_lang(localization, "ask-address", language))
                .await?;

            dialogue
                .update(OrderDialogueState::AwaitingDeliveryAddress {
                    name,
                    phone,
                    language_code,
                })
                .await?;
        }
        _ => {
            debug!(user_id = %chat_id, data = %data, "Ignoring unrelated callback during onboarding");
        }
    }

    Ok(())
}

/// Handle delivery address input during onboarding
pub async fn handle_onboarding_address_input(
    ctx: DialogueContext<'_>,
    params: OnboardingAddressParams<'_>,
) -> Result<()> {
    let DialogueContext {
        bot,
        msg,
        dialogue,
        localization,
    } = ctx;
    let OnboardingAddressParams {
        pool,
        cache,
        config,
        address_input,
        name,
        phone,
        language_code,
    } = params;
    let language = language_code.as_deref();

    match validate_delivery_address(address_input) {
        Ok(validated_address) => {
            debug!(user_id = %msg.chat.id, "Delivery address accepted");

            complete_registration(
                bot,
                msg.chat.id,
                &dialogue,
                RegistrationParams {
                    pool,
                    cache,
                    config,
                    localization,
                    name: &name,
                    phone: &phone,
                    language: language.unwrap_or(crate::localization::DEFAULT_LANGUAGE),
                    delivery_address: Some(validated_address),
                },
            )
            .await?;
        }
        Err(reason_key) => {
            // Keep dialogue active, user can try again
            bot.send_message(msg.chat.id, t_lang(localization, reason_key, language))
                .await?;
        }
    }

    Ok(())
}

/// Persist the customer and close the onboarding dialogue
async fn complete_registration(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &OrderDialogue,
    params: RegistrationParams<'_>,
) -> Result<()> {
    let RegistrationParams {
        pool,
        cache,
        config,
        localization,
        name,
        phone,
        language,
        delivery_address,
    } = params;
    let telegram_id = chat_id.0;

    let (customer, is_returning) =
        match db::get_or_create_customer(pool, telegram_id, name, phone, language).await {
            Ok(result) => result,
            Err(e) => {
                error_logging::log_database_error(&e, "get_or_create_customer", Some(telegram_id), None);
                bot.send_message(chat_id, t_lang(localization, "error-generic", Some(language)))
                    .await?;
                dialogue.exit().await?;
                return Ok(());
            }
        };

    if let Some(address) = delivery_address {
        if let Err(e) = db::update_customer_delivery_address(pool, telegram_id, address).await {
            error_logging::log_database_error(
                &e,
                "update_customer_delivery_address",
                Some(telegram_id),
                None,
            );
        }
    }

    // Remember the chosen language and drop any stale cached customer row
    cache_user_language(
        telegram_id,
        language.to_string(),
        Duration::from_secs(config.cache.language_ttl_secs),
    );
    cache.lock().invalidate_customer(telegram_id);

    info!(
        customer_id = %customer.id,
        is_returning = %is_returning,
        "Customer registration completed"
    );

    let greeting_key = if is_returning {
        "welcome-back"
    } else {
        "registration-complete"
    };
    let welcome_message = format!(
        "{}\n\n{}",
        t_args_lang(
            localization,
            greeting_key,
            &[("name", customer.name.as_str())],
            Some(language),
        ),
        t_lang(localization, "menu-prompt", Some(language)),
    );
    let keyboard = create_main_menu_keyboard(Some(language), localization);
    bot.send_message(chat_id, welcome_message)
        .reply_markup(keyboard)
        .await?;

    dialogue.exit().await?;
    Ok(())
}

/// Handle delivery address input during checkout
///
/// Saves the address on the customer for next time, records it on the cart,
/// and moves straight to the order summary.
pub async fn handle_checkout_address_input(
    ctx: DialogueContext<'_>,
    params: CheckoutAddressParams<'_>,
) -> Result<()> {
    let DialogueContext {
        bot,
        msg,
        dialogue,
        localization,
    } = ctx;
    let CheckoutAddressParams {
        pool,
        cache,
        config,
        address_input,
        language_code,
    } = params;
    let language = language_code.as_deref();
    let telegram_id = msg.chat.id.0;

    let validated_address = match validate_delivery_address(address_input) {
        Ok(address) => address,
        Err(reason_key) => {
            // Keep dialogue active, user can try again
            bot.send_message(msg.chat.id, t_lang(localization, reason_key, language))
                .await?;
            return Ok(());
        }
    };

    db::update_customer_delivery_address(pool, telegram_id, validated_address).await?;
    db::update_cart_delivery(
        pool,
        telegram_id,
        DeliveryMethod::Delivery,
        Some(validated_address),
    )
    .await?;
    cache.lock().invalidate_customer(telegram_id);

    let items = db::get_cart_items(pool, telegram_id).await?;
    if items.is_empty() {
        bot.send_message(msg.chat.id, t_lang(localization, "cart-empty", language))
            .reply_markup(create_main_menu_keyboard(language, localization))
            .await?;
        dialogue.exit().await?;
        return Ok(());
    }

    let subtotal: f64 = items.iter().map(|item| item.line_total()).sum();
    let summary = format_order_summary(
        &items,
        subtotal,
        config.business.delivery_charge,
        DeliveryMethod::Delivery,
        Some(validated_address),
        &config.business.currency,
        language,
        localization,
    );
    let keyboard = create_order_confirm_keyboard(language, localization);
    bot.send_message(msg.chat.id, summary)
        .reply_markup(keyboard)
        .await?;

    dialogue.exit().await?;
    Ok(())
}

/// Abort the current dialogue and return to the main menu
pub async fn cancel_dialogue(
    ctx: DialogueContext<'_>,
    language_code: Option<&str>,
) -> Result<()> {
    let DialogueContext {
        bot,
        msg,
        dialogue,
        localization,
    } = ctx;

    debug!(user_id = %msg.chat.id, "Dialogue cancelled by user");
    dialogue.exit().await?;

    let keyboard = create_main_menu_keyboard(language_code, localization);
    bot.send_message(
        msg.chat.id,
        t_lang(localization, "operation-cancelled", language_code),
    )
    .reply_markup(keyboard)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_words() {
        assert!(is_cancellation_command("/cancel"));
        assert!(is_cancellation_command("cancel"));
        assert!(is_cancellation_command("  STOP  "));
        assert!(is_cancellation_command("Back"));

        assert!(!is_cancellation_command("backwards"));
        assert!(!is_cancellation_command("my address is Cancel St 5"));
        assert!(!is_cancellation_command(""));
    }
}
