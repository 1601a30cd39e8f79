//! Order callback handlers
//!
//! Covers the final order confirmation and the admin-side confirm button.
//! Placing an order snapshots the cart into `orders`/`order_items`, clears
//! the cart and strips the inline keyboard so the button cannot fire twice.

use anyhow::Result;
use tracing::{debug, warn};

use teloxide::prelude::*;
use teloxide::types::ChatId;

use super::callback_types::CallbackContext;
use super::cart_callbacks::render_empty_cart;

use crate::bot::ui_builder::{
    create_admin_order_keyboard, create_language_keyboard, format_admin_order_notification,
    format_order_confirmation,
};
use crate::db::{
    clear_cart, create_order_with_items, generate_order_number, get_cart_by_telegram_id,
    get_cart_items, get_customer_by_id, get_customer_cached, get_order_by_id, get_order_items,
    update_order_status, CartItemView, Customer, DeliveryMethod, Order, OrderStatus,
};
use crate::errors::error_logging;
use crate::localization::t_lang;

/// Handle the final confirm button (`confirm_order`)
pub async fn handle_confirm_order(ctx: &CallbackContext<'_>) -> Result<()> {
    debug!(user_id = %ctx.telegram_id, "Handling order confirmation");

    let items = get_cart_items(ctx.pool, ctx.telegram_id).await?;
    if items.is_empty() {
        render_empty_cart(ctx).await?;
        return Ok(());
    }

    let Some(customer) = get_customer_cached(ctx.pool, ctx.cache, ctx.telegram_id).await? else {
        let message = format!(
            "👋 {}",
            t_lang(ctx.localization, "registration-required", ctx.language_code)
        );
        ctx.bot
            .edit_message_text(ctx.chat_id, ctx.message_id, message)
            .reply_markup(create_language_keyboard())
            .await?;
        return Ok(());
    };

    let cart = get_cart_by_telegram_id(ctx.pool, ctx.telegram_id).await?;
    let delivery_method = cart
        .as_ref()
        .and_then(|cart| DeliveryMethod::parse(&cart.delivery_method))
        .unwrap_or(DeliveryMethod::Pickup);
    let delivery_address = cart.and_then(|cart| cart.delivery_address);

    let subtotal: f64 = items.iter().map(CartItemView::line_total).sum();
    let delivery_charge = match delivery_method {
        DeliveryMethod::Delivery => ctx.config.business.delivery_charge,
        DeliveryMethod::Pickup => 0.0,
    };

    let order_number = generate_order_number();
    let order = match create_order_with_items(
        ctx.pool,
        customer.id,
        &order_number,
        subtotal,
        delivery_charge,
        delivery_method,
        delivery_address.as_deref(),
        &items,
    )
    .await
    {
        Ok(order) => order,
        Err(e) => {
            error_logging::log_order_error(
                &e,
                "create_order",
                ctx.telegram_id,
                Some(&order_number),
                Some(items.len()),
            );
            let message = format!(
                "❌ {}",
                t_lang(ctx.localization, "error-generic", ctx.language_code)
            );
            ctx.bot
                .edit_message_text(ctx.chat_id, ctx.message_id, message)
                .await?;
            return Ok(());
        }
    };

    // The order now owns the snapshot; a failed clear only leaves stale lines
    if let Err(e) = clear_cart(ctx.pool, ctx.telegram_id).await {
        error_logging::log_database_error(&e, "clear_cart_after_order", Some(ctx.telegram_id), None);
    }

    // No reply markup here: the summary keyboard disappears so the order
    // cannot be confirmed twice
    let confirmation = format_order_confirmation(
        &order.order_number,
        order.total,
        &ctx.config.business.currency,
        ctx.language_code,
        ctx.localization,
    );
    // The order exists either way; the admin notification below must still
    // go out even if this edit fails
    if let Err(e) = ctx
        .bot
        .edit_message_text(ctx.chat_id, ctx.message_id, confirmation)
        .await
    {
        error_logging::log_internal_error(
            &e,
            "order_callbacks",
            "edit_order_confirmation",
            Some(ctx.telegram_id),
        );
    }

    notify_admin(ctx, &order, &customer).await;

    Ok(())
}

/// Send the new-order notification to the configured admin chat
///
/// Failures are logged but never surfaced to the customer; the order is
/// already placed at this point.
async fn notify_admin(ctx: &CallbackContext<'_>, order: &Order, customer: &Customer) {
    let Some(admin_chat_id) = ctx.config.bot.admin_chat_id else {
        return;
    };

    let order_items = match get_order_items(ctx.pool, order.id).await {
        Ok(items) => items,
        Err(e) => {
            error_logging::log_database_error(&e, "admin_notification_items", None, None);
            return;
        }
    };

    let notification = format_admin_order_notification(
        order,
        customer,
        &order_items,
        &ctx.config.business.currency,
        ctx.localization,
    );
    let send = ctx
        .bot
        .send_message(ChatId(admin_chat_id), notification)
        .reply_markup(create_admin_order_keyboard(order.id, ctx.localization))
        .await;

    if let Err(e) = send {
        error_logging::log_telegram_error(
            &e,
            "admin_notification",
            Some(admin_chat_id),
            None,
        );
    }
}

/// Handle the admin confirm button (`order_confirm_{id}`)
///
/// Only honoured inside the configured admin chat. Re-renders the
/// notification with the outcome appended and drops the button.
pub async fn handle_admin_order_confirm(ctx: &CallbackContext<'_>, data: &str) -> Result<()> {
    if ctx.config.bot.admin_chat_id != Some(ctx.chat_id.0) {
        warn!(chat_id = %ctx.chat_id, "Ignoring order confirm outside admin chat");
        return Ok(());
    }

    let Some(order_id) = data
        .strip_prefix("order_confirm_")
        .and_then(|raw| raw.parse::<i64>().ok())
    else {
        return Ok(());
    };
    debug!(order_id = %order_id, "Handling admin order confirmation");

    let Some(order) = get_order_by_id(ctx.pool, order_id).await? else {
        let message = format!("❌ {}", t_lang(ctx.localization, "admin-order-missing", None));
        ctx.bot
            .edit_message_text(ctx.chat_id, ctx.message_id, message)
            .await?;
        return Ok(());
    };

    let can_confirm = OrderStatus::parse(&order.status)
        .map(|status| status.can_transition_to(OrderStatus::Confirmed))
        .unwrap_or(false);

    let status_line = if can_confirm {
        update_order_status(ctx.pool, order_id, OrderStatus::Confirmed).await?;
        format!("✅ {}", t_lang(ctx.localization, "admin-order-confirmed", None))
    } else {
        format!("ℹ️ {}", t_lang(ctx.localization, "admin-order-already", None))
    };

    let message = match get_customer_by_id(ctx.pool, order.customer_id).await? {
        Some(customer) => {
            let order_items = get_order_items(ctx.pool, order.id).await?;
            let notification = format_admin_order_notification(
                &order,
                &customer,
                &order_items,
                &ctx.config.business.currency,
                ctx.localization,
            );
            format!("{}\n\n{}", notification, status_line)
        }
        None => status_line,
    };

    ctx.bot
        .edit_message_text(ctx.chat_id, ctx.message_id, message)
        .await?;

    Ok(())
}
