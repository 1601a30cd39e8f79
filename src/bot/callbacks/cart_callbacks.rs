//! Cart callback handlers
//!
//! Covers the cart view, per-line quantity buttons, clearing the cart and
//! the checkout flow up to the order summary. Delivery address entry hands
//! off to the dialogue layer; everything else edits the cart message in
//! place.

use anyhow::Result;
use tracing::debug;

use teloxide::prelude::*;

use super::callback_types::CallbackContext;

use crate::bot::ui_builder::{
    create_address_choice_keyboard, create_cart_keyboard, create_clear_cart_confirm_keyboard,
    create_delivery_method_keyboard, create_main_menu_keyboard, create_order_confirm_keyboard,
    format_cart_message, format_order_summary,
};
use crate::db::{
    adjust_cart_item_quantity, clear_cart, get_cart_by_telegram_id, get_cart_items,
    get_customer_cached, remove_from_cart, update_cart_delivery, CartItemView, DeliveryMethod,
};
use crate::dialogue::{OrderDialogue, OrderDialogueState};
use crate::localization::t_lang;

/// Most of one product a single cart line will hold
const MAX_LINE_QUANTITY: i32 = 99;

/// Handle the cart view button (`cart_view`)
pub async fn handle_cart_view(ctx: &CallbackContext<'_>) -> Result<()> {
    debug!(user_id = %ctx.telegram_id, "Rendering cart view");

    let items = get_cart_items(ctx.pool, ctx.telegram_id).await?;
    if items.is_empty() {
        render_empty_cart(ctx).await?;
        return Ok(());
    }

    let delivery_method = get_cart_by_telegram_id(ctx.pool, ctx.telegram_id)
        .await?
        .map(|cart| cart.delivery_method)
        .unwrap_or_else(|| DeliveryMethod::Pickup.as_str().to_string());

    let message = format_cart_message(
        &items,
        &delivery_method,
        &ctx.config.business.currency,
        ctx.language_code,
        ctx.localization,
    );
    ctx.bot
        .edit_message_text(ctx.chat_id, ctx.message_id, message)
        .reply_markup(create_cart_keyboard(&items, ctx.language_code, ctx.localization))
        .await?;

    Ok(())
}

pub(super) async fn render_empty_cart(ctx: &CallbackContext<'_>) -> Result<()> {
    let message = format!(
        "🛒 {}\n\n{}",
        t_lang(ctx.localization, "cart-empty", ctx.language_code),
        t_lang(ctx.localization, "cart-empty-suggestion", ctx.language_code)
    );
    ctx.bot
        .edit_message_text(ctx.chat_id, ctx.message_id, message)
        .reply_markup(create_main_menu_keyboard(ctx.language_code, ctx.localization))
        .await?;
    Ok(())
}

/// Handle the clear cart button (`cart_clear_confirm`)
pub async fn handle_clear_confirm(ctx: &CallbackContext<'_>) -> Result<()> {
    let message = format!(
        "🗑️ {}",
        t_lang(ctx.localization, "clear-cart-question", ctx.language_code)
    );
    ctx.bot
        .edit_message_text(ctx.chat_id, ctx.message_id, message)
        .reply_markup(create_clear_cart_confirm_keyboard(
            ctx.language_code,
            ctx.localization,
        ))
        .await?;
    Ok(())
}

/// Handle the confirmed clear (`cart_clear_yes`)
pub async fn handle_clear_cart(ctx: &CallbackContext<'_>) -> Result<()> {
    debug!(user_id = %ctx.telegram_id, "Clearing cart");

    clear_cart(ctx.pool, ctx.telegram_id).await?;

    let message = format!(
        "✅ {}",
        t_lang(ctx.localization, "cart-cleared", ctx.language_code)
    );
    ctx.bot
        .edit_message_text(ctx.chat_id, ctx.message_id, message)
        .reply_markup(create_main_menu_keyboard(ctx.language_code, ctx.localization))
        .await?;
    Ok(())
}

/// Handle a per-line button (`cart_inc_{id}`, `cart_dec_{id}`, `cart_remove_{id}`)
///
/// Increments cap at [`MAX_LINE_QUANTITY`]; decrements below one remove the
/// line. The cart view is re-rendered afterwards either way.
pub async fn handle_cart_adjustment(ctx: &CallbackContext<'_>, data: &str) -> Result<()> {
    if let Some(product_id) = parse_line_target(data, "cart_remove_") {
        remove_from_cart(ctx.pool, ctx.telegram_id, product_id).await?;
    } else if let Some(product_id) = parse_line_target(data, "cart_inc_") {
        let items = get_cart_items(ctx.pool, ctx.telegram_id).await?;
        if line_quantity(&items, product_id) < MAX_LINE_QUANTITY {
            adjust_cart_item_quantity(ctx.pool, ctx.telegram_id, product_id, 1).await?;
        }
    } else if let Some(product_id) = parse_line_target(data, "cart_dec_") {
        adjust_cart_item_quantity(ctx.pool, ctx.telegram_id, product_id, -1).await?;
    } else {
        return Ok(());
    }

    handle_cart_view(ctx).await
}

fn parse_line_target(data: &str, prefix: &str) -> Option<i64> {
    data.strip_prefix(prefix)?.parse().ok()
}

fn line_quantity(items: &[CartItemView], product_id: i64) -> i32 {
    items
        .iter()
        .find(|item| item.product_id == product_id)
        .map(|item| item.quantity)
        .unwrap_or(0)
}

/// Handle the checkout button (`cart_checkout`)
pub async fn handle_checkout(ctx: &CallbackContext<'_>) -> Result<()> {
    debug!(user_id = %ctx.telegram_id, "Starting checkout");

    let items = get_cart_items(ctx.pool, ctx.telegram_id).await?;
    if items.is_empty() {
        render_empty_cart(ctx).await?;
        return Ok(());
    }

    let message = format!(
        "🚚 {}",
        t_lang(ctx.localization, "ask-delivery-method", ctx.language_code)
    );
    ctx.bot
        .edit_message_text(ctx.chat_id, ctx.message_id, message)
        .reply_markup(create_delivery_method_keyboard(
            ctx.language_code,
            ctx.localization,
        ))
        .await?;
    Ok(())
}

/// Handle the delivery method and address choice buttons during checkout
///
/// Pickup goes straight to the order summary. Delivery offers the saved
/// address when one exists, otherwise asks for a new one through the
/// dialogue.
pub async fn handle_delivery_choice(
    ctx: &CallbackContext<'_>,
    data: &str,
    dialogue: &OrderDialogue,
) -> Result<()> {
    debug!(user_id = %ctx.telegram_id, data = %data, "Handling delivery choice");

    match data {
        "delivery_pickup" => {
            update_cart_delivery(ctx.pool, ctx.telegram_id, DeliveryMethod::Pickup, None).await?;
            render_order_summary(ctx, DeliveryMethod::Pickup, None).await?;
        }
        "delivery_delivery" => {
            let saved_address = get_customer_cached(ctx.pool, ctx.cache, ctx.telegram_id)
                .await?
                .and_then(|customer| customer.delivery_address)
                .filter(|address| !address.trim().is_empty());

            match saved_address {
                Some(address) => {
                    let message = format!(
                        "📍 {}",
                        t_lang(
                            ctx.localization,
                            "delivery-address-question",
                            ctx.language_code
                        )
                    );
                    ctx.bot
                        .edit_message_text(ctx.chat_id, ctx.message_id, message)
                        .reply_markup(create_address_choice_keyboard(
                            &address,
                            ctx.language_code,
                            ctx.localization,
                        ))
                        .await?;
                }
                None => ask_checkout_address(ctx, dialogue).await?,
            }
        }
        "delivery_address_use_saved" => {
            let saved_address = get_customer_cached(ctx.pool, ctx.cache, ctx.telegram_id)
                .await?
                .and_then(|customer| customer.delivery_address)
                .filter(|address| !address.trim().is_empty());

            match saved_address {
                Some(address) => {
                    update_cart_delivery(
                        ctx.pool,
                        ctx.telegram_id,
                        DeliveryMethod::Delivery,
                        Some(&address),
                    )
                    .await?;
                    render_order_summary(ctx, DeliveryMethod::Delivery, Some(&address)).await?;
                }
                // Saved address vanished between renders; fall back to asking
                None => ask_checkout_address(ctx, dialogue).await?,
            }
        }
        "delivery_address_new_address" => ask_checkout_address(ctx, dialogue).await?,
        _ => {}
    }

    Ok(())
}

async fn ask_checkout_address(ctx: &CallbackContext<'_>, dialogue: &OrderDialogue) -> Result<()> {
    let message = format!(
        "📍 {}",
        t_lang(ctx.localization, "ask-address", ctx.language_code)
    );
    ctx.bot
        .edit_message_text(ctx.chat_id, ctx.message_id, message)
        .await?;
    dialogue
        .update(OrderDialogueState::AwaitingCheckoutAddress {
            language_code: ctx.language_code.map(str::to_string),
        })
        .await?;
    Ok(())
}

async fn render_order_summary(
    ctx: &CallbackContext<'_>,
    delivery_method: DeliveryMethod,
    delivery_address: Option<&str>,
) -> Result<()> {
    let items = get_cart_items(ctx.pool, ctx.telegram_id).await?;
    if items.is_empty() {
        render_empty_cart(ctx).await?;
        return Ok(());
    }

    let subtotal: f64 = items.iter().map(CartItemView::line_total).sum();
    let delivery_charge = match delivery_method {
        DeliveryMethod::Delivery => ctx.config.business.delivery_charge,
        DeliveryMethod::Pickup => 0.0,
    };

    let message = format_order_summary(
        &items,
        subtotal,
        delivery_charge,
        delivery_method,
        delivery_address,
        &ctx.config.business.currency,
        ctx.language_code,
        ctx.localization,
    );
    ctx.bot
        .edit_message_text(ctx.chat_id, ctx.message_id, message)
        .reply_markup(create_order_confirm_keyboard(
            ctx.language_code,
            ctx.localization,
        ))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(product_id: i64, quantity: i32) -> CartItemView {
        CartItemView {
            id: product_id,
            product_id,
            product_name: format!("Product {product_id}"),
            quantity,
            unit_price: 10.0,
            product_options: json!({}),
        }
    }

    #[test]
    fn test_parse_line_target() {
        assert_eq!(parse_line_target("cart_inc_7", "cart_inc_"), Some(7));
        assert_eq!(parse_line_target("cart_remove_3", "cart_remove_"), Some(3));
        assert_eq!(parse_line_target("cart_inc_x", "cart_inc_"), None);
        assert_eq!(parse_line_target("cart_dec_2", "cart_inc_"), None);
    }

    #[test]
    fn test_line_quantity_lookup() {
        let items = vec![item(1, 2), item(5, 98)];
        assert_eq!(line_quantity(&items, 1), 2);
        assert_eq!(line_quantity(&items, 5), 98);
        assert_eq!(line_quantity(&items, 9), 0);
    }
}
