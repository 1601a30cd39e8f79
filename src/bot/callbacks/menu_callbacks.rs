//! Menu and product callback handlers
//!
//! Covers language selection, main menu rendering, product pages and the
//! add-to-cart buttons under them. Product pages are edited in place so the
//! customer navigates the menu inside a single message.

use anyhow::Result;
use std::time::Duration;
use tracing::debug;

use teloxide::prelude::*;

use super::callback_types::CallbackContext;

use crate::bot::ui_builder::{
    create_direct_add_keyboard, create_hilbeh_unavailable_keyboard, create_kubaneh_keyboard,
    create_language_keyboard, create_main_menu_keyboard, create_post_add_keyboard,
    create_red_bisbas_keyboard, create_samneh_keyboard, localized_product_label, product_emoji,
};
use crate::cache::cache_user_language;
use crate::catalog;
use crate::db::{add_to_cart, get_customer_cached, get_product_cached};
use crate::dialogue::OrderDialogue;
use crate::formatting::format_price;
use crate::localization::{t_args_lang, t_lang};

/// Handle a language selection button (`language_en` / `language_he`)
///
/// For a registered customer this switches their stored language and
/// re-renders the menu. For an unknown user it starts onboarding in the
/// chosen language.
pub async fn handle_language_selection(
    ctx: &CallbackContext<'_>,
    data: &str,
    dialogue: &OrderDialogue,
) -> Result<()> {
    let language = match data {
        "language_en" => "en",
        "language_he" => "he",
        _ => return Ok(()),
    };
    debug!(user_id = %ctx.telegram_id, language = %language, "Handling language selection");

    // Remember the choice process-wide so later updates resolve it without
    // touching the database
    cache_user_language(
        ctx.telegram_id,
        language.to_string(),
        Duration::from_secs(ctx.config.cache.language_ttl_secs),
    );

    let customer = get_customer_cached(ctx.pool, ctx.cache, ctx.telegram_id).await?;

    match customer {
        Some(_) => {
            crate::db::update_customer_language(ctx.pool, ctx.telegram_id, language).await?;
            ctx.cache.lock().invalidate_customer(ctx.telegram_id);

            let message = format!(
                "✅ {}\n\n{}",
                t_lang(ctx.localization, "language-updated", Some(language)),
                t_lang(ctx.localization, "menu-prompt", Some(language))
            );
            ctx.bot
                .edit_message_text(ctx.chat_id, ctx.message_id, message)
                .reply_markup(create_main_menu_keyboard(Some(language), ctx.localization))
                .await?;
        }
        None => {
            begin_onboarding_from_language(ctx, dialogue, language).await?;
        }
    }

    Ok(())
}

async fn begin_onboarding_from_language(
    ctx: &CallbackContext<'_>,
    dialogue: &OrderDialogue,
    language: &str,
) -> Result<()> {
    crate::bot::dialogue_manager::begin_onboarding(
        ctx.bot,
        ctx.chat_id,
        Some(ctx.message_id),
        dialogue,
        language,
        ctx.localization,
    )
    .await
}

/// Handle the back-to-menu button (`menu_main`)
pub async fn handle_main_menu(ctx: &CallbackContext<'_>) -> Result<()> {
    debug!(user_id = %ctx.telegram_id, "Rendering main menu");

    let message = format!(
        "🍽️ **{}**\n\n{}",
        t_lang(ctx.localization, "menu-title", ctx.language_code),
        t_lang(ctx.localization, "menu-prompt", ctx.language_code)
    );
    ctx.bot
        .edit_message_text(ctx.chat_id, ctx.message_id, message)
        .reply_markup(create_main_menu_keyboard(ctx.language_code, ctx.localization))
        .await?;

    Ok(())
}

/// Handle a product button on the main menu (`menu_kubaneh`, `menu_samneh`, ...)
///
/// Renders the product page: name, description, price and either the option
/// keyboard or a direct add button. Hilbeh gets an availability gate first.
pub async fn handle_menu_navigation(ctx: &CallbackContext<'_>, data: &str) -> Result<()> {
    let Some(product_id) = catalog::menu_target(data) else {
        return Ok(());
    };
    debug!(user_id = %ctx.telegram_id, product_id = %product_id, "Opening product page");

    let Some(product) = get_product_cached(ctx.pool, ctx.cache, product_id).await? else {
        let message = format!(
            "❌ {}",
            t_lang(ctx.localization, "error-generic", ctx.language_code)
        );
        ctx.bot
            .edit_message_text(ctx.chat_id, ctx.message_id, message)
            .reply_markup(create_main_menu_keyboard(ctx.language_code, ctx.localization))
            .await?;
        return Ok(());
    };

    let display_name = match catalog::product_display_key(product_id) {
        Some(key) => t_lang(ctx.localization, key, ctx.language_code),
        None => product.name.clone(),
    };

    // Hilbeh is prepared fresh only on its configured days
    if product_id == catalog::PRODUCT_HILBEH && !catalog::is_hilbeh_available(&ctx.config.business)
    {
        let message = format!(
            "{} **{}**\n\n{}",
            product_emoji(product_id),
            display_name,
            t_lang(ctx.localization, "hilbeh-unavailable", ctx.language_code)
        );
        ctx.bot
            .edit_message_text(ctx.chat_id, ctx.message_id, message)
            .reply_markup(create_hilbeh_unavailable_keyboard(
                ctx.language_code,
                ctx.localization,
            ))
            .await?;
        return Ok(());
    }

    let description = match catalog::product_description_key(product_id) {
        Some(key) => t_lang(ctx.localization, key, ctx.language_code),
        None => product.description.clone().unwrap_or_default(),
    };

    let message = format!(
        "{} **{}**\n\n{}\n\n{}: {}\n\n{}",
        product_emoji(product_id),
        display_name,
        description,
        t_lang(ctx.localization, "price-label", ctx.language_code),
        format_price(product.price, &ctx.config.business.currency),
        t_lang(
            ctx.localization,
            product_prompt_key(product_id),
            ctx.language_code
        )
    );

    let keyboard = match product_id {
        catalog::PRODUCT_KUBANEH => create_kubaneh_keyboard(ctx.language_code, ctx.localization),
        catalog::PRODUCT_SAMNEH => create_samneh_keyboard(ctx.language_code, ctx.localization),
        catalog::PRODUCT_RED_BISBAS => {
            create_red_bisbas_keyboard(ctx.language_code, ctx.localization)
        }
        catalog::PRODUCT_HAWAIJ_SOUP => {
            create_direct_add_keyboard("hawaij_soup_spice", ctx.language_code, ctx.localization)
        }
        catalog::PRODUCT_HAWAIJ_COFFEE => {
            create_direct_add_keyboard("hawaij_coffee_spice", ctx.language_code, ctx.localization)
        }
        catalog::PRODUCT_WHITE_COFFEE => {
            create_direct_add_keyboard("white_coffee", ctx.language_code, ctx.localization)
        }
        _ => create_direct_add_keyboard("add_hilbeh", ctx.language_code, ctx.localization),
    };

    ctx.bot
        .edit_message_text(ctx.chat_id, ctx.message_id, message)
        .reply_markup(keyboard)
        .await?;

    Ok(())
}

/// Prompt shown under a product page depending on whether it has variants
fn product_prompt_key(product_id: i64) -> &'static str {
    match product_id {
        catalog::PRODUCT_KUBANEH | catalog::PRODUCT_SAMNEH | catalog::PRODUCT_RED_BISBAS => {
            "choose-option"
        }
        _ => "add-prompt",
    }
}

/// Handle an add-to-cart button (`kubaneh_classic`, `white_coffee`, ...)
///
/// Unregistered users are sent to the language picker first; Hilbeh is
/// re-checked against its availability window in case the page went stale.
pub async fn handle_product_add(ctx: &CallbackContext<'_>, data: &str) -> Result<()> {
    let Some((product_id, options)) = catalog::product_selection(data) else {
        return Ok(());
    };
    debug!(user_id = %ctx.telegram_id, product_id = %product_id, "Handling add to cart");

    let customer = get_customer_cached(ctx.pool, ctx.cache, ctx.telegram_id).await?;
    if customer.is_none() {
        debug!(user_id = %ctx.telegram_id, "Unregistered user tried to add to cart");
        let message = format!(
            "👋 {}",
            t_lang(ctx.localization, "registration-required", ctx.language_code)
        );
        ctx.bot
            .edit_message_text(ctx.chat_id, ctx.message_id, message)
            .reply_markup(create_language_keyboard())
            .await?;
        return Ok(());
    }

    if product_id == catalog::PRODUCT_HILBEH && !catalog::is_hilbeh_available(&ctx.config.business)
    {
        let message = format!(
            "🚫 {}",
            t_lang(ctx.localization, "hilbeh-unavailable", ctx.language_code)
        );
        ctx.bot
            .edit_message_text(ctx.chat_id, ctx.message_id, message)
            .reply_markup(create_hilbeh_unavailable_keyboard(
                ctx.language_code,
                ctx.localization,
            ))
            .await?;
        return Ok(());
    }

    let Some(product) = get_product_cached(ctx.pool, ctx.cache, product_id).await? else {
        let message = format!(
            "❌ {}",
            t_lang(ctx.localization, "error-generic", ctx.language_code)
        );
        ctx.bot
            .edit_message_text(ctx.chat_id, ctx.message_id, message)
            .reply_markup(create_main_menu_keyboard(ctx.language_code, ctx.localization))
            .await?;
        return Ok(());
    };

    let added = add_to_cart(ctx.pool, ctx.telegram_id, product_id, 1, &options).await?;

    if added {
        let label = localized_product_label(
            product_id,
            &product.name,
            &options,
            ctx.language_code,
            ctx.localization,
        );
        let message = format!(
            "✅ {}",
            t_args_lang(
                ctx.localization,
                "added-to-cart",
                &[("product", label.as_str())],
                ctx.language_code,
            )
        );
        ctx.bot
            .edit_message_text(ctx.chat_id, ctx.message_id, message)
            .reply_markup(create_post_add_keyboard(ctx.language_code, ctx.localization))
            .await?;
    } else {
        let message = format!(
            "❌ {}",
            t_lang(ctx.localization, "error-generic", ctx.language_code)
        );
        ctx.bot
            .edit_message_text(ctx.chat_id, ctx.message_id, message)
            .reply_markup(create_main_menu_keyboard(ctx.language_code, ctx.localization))
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_prompt_keys() {
        assert_eq!(product_prompt_key(catalog::PRODUCT_KUBANEH), "choose-option");
        assert_eq!(product_prompt_key(catalog::PRODUCT_SAMNEH), "choose-option");
        assert_eq!(
            product_prompt_key(catalog::PRODUCT_RED_BISBAS),
            "choose-option"
        );
        assert_eq!(product_prompt_key(catalog::PRODUCT_HAWAIJ_SOUP), "add-prompt");
        assert_eq!(product_prompt_key(catalog::PRODUCT_HILBEH), "add-prompt");
    }
}
