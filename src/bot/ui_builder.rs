//! UI Builder module for creating keyboards and formatting messages

use std::sync::Arc;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

// Import localization
use crate::localization::{t_args_lang, t_lang, LocalizationManager};

// Import catalog mapping and layout helpers
use crate::catalog::{option_label_key, product_display_key};
use crate::db::{CartItemView, Customer, DeliveryMethod, Order, OrderItem};
use crate::formatting::{format_price, format_product_label, DIVIDER};

/// Longest label shown on an inline button before truncation
const MAX_BUTTON_LABEL_CHARS: usize = 24;

/// Marker shown next to a product on its menu page
pub fn product_emoji(product_id: i64) -> &'static str {
    match product_id {
        crate::catalog::PRODUCT_KUBANEH => "🍞",
        crate::catalog::PRODUCT_SAMNEH => "🧈",
        crate::catalog::PRODUCT_RED_BISBAS => "🌶️",
        crate::catalog::PRODUCT_HAWAIJ_SOUP => "🍲",
        crate::catalog::PRODUCT_HAWAIJ_COFFEE => "☕",
        crate::catalog::PRODUCT_WHITE_COFFEE => "🥛",
        crate::catalog::PRODUCT_HILBEH => "🌿",
        _ => "🍽️",
    }
}

fn truncate_button_label(label: &str) -> String {
    if label.chars().count() > MAX_BUTTON_LABEL_CHARS {
        let shortened: String = label.chars().take(MAX_BUTTON_LABEL_CHARS - 3).collect();
        format!("{}...", shortened)
    } else {
        label.to_string()
    }
}

/// Create the language selection keyboard
///
/// Labels are written in their own language on purpose, so the keyboard
/// is readable before any language has been chosen.
pub fn create_language_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "🇬🇧 English",
            "language_en".to_string(),
        )],
        vec![InlineKeyboardButton::callback(
            "🇮🇱 עברית",
            "language_he".to_string(),
        )],
    ])
}

/// Create the main menu keyboard with one row per product family
pub fn create_main_menu_keyboard(
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            format!("🍞 {}", t_lang(localization, "menu-kubaneh", language_code)),
            "menu_kubaneh".to_string(),
        )],
        vec![InlineKeyboardButton::callback(
            format!("🧈 {}", t_lang(localization, "menu-samneh", language_code)),
            "menu_samneh".to_string(),
        )],
        vec![InlineKeyboardButton::callback(
            format!(
                "🌶️ {}",
                t_lang(localization, "menu-red-bisbas", language_code)
            ),
            "menu_red_bisbas".to_string(),
        )],
        vec![
            InlineKeyboardButton::callback(
                format!(
                    "🍲 {}",
                    t_lang(localization, "menu-hawaij-soup", language_code)
                ),
                "menu_hawaij_soup".to_string(),
            ),
            InlineKeyboardButton::callback(
                format!(
                    "☕ {}",
                    t_lang(localization, "menu-hawaij-coffee", language_code)
                ),
                "menu_hawaij_coffee".to_string(),
            ),
        ],
        vec![InlineKeyboardButton::callback(
            format!(
                "🥛 {}",
                t_lang(localization, "menu-white-coffee", language_code)
            ),
            "menu_white_coffee".to_string(),
        )],
        vec![InlineKeyboardButton::callback(
            format!("🌿 {}", t_lang(localization, "menu-hilbeh", language_code)),
            "menu_hilbeh".to_string(),
        )],
        vec![InlineKeyboardButton::callback(
            format!("🛒 {}", t_lang(localization, "cart-view-button", language_code)),
            "cart_view".to_string(),
        )],
    ])
}

fn back_to_menu_row(
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> Vec<InlineKeyboardButton> {
    vec![InlineKeyboardButton::callback(
        format!("⬅️ {}", t_lang(localization, "back-to-menu", language_code)),
        "menu_main".to_string(),
    )]
}

/// Create the Kubaneh type selection keyboard
pub fn create_kubaneh_keyboard(
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                t_lang(localization, "option-classic", language_code),
                "kubaneh_classic".to_string(),
            ),
            InlineKeyboardButton::callback(
                t_lang(localization, "option-seeded", language_code),
                "kubaneh_seeded".to_string(),
            ),
        ],
        vec![
            InlineKeyboardButton::callback(
                t_lang(localization, "option-herb", language_code),
                "kubaneh_herb".to_string(),
            ),
            InlineKeyboardButton::callback(
                t_lang(localization, "option-aromatic", language_code),
                "kubaneh_aromatic".to_string(),
            ),
        ],
        back_to_menu_row(language_code, localization),
    ])
}

/// Create the Samneh preparation keyboard
pub fn create_samneh_keyboard(
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                t_lang(localization, "option-smoked", language_code),
                "samneh_smoked".to_string(),
            ),
            InlineKeyboardButton::callback(
                t_lang(localization, "option-not-smoked", language_code),
                "samneh_not_smoked".to_string(),
            ),
        ],
        back_to_menu_row(language_code, localization),
    ])
}

/// Create the Red Bisbas size keyboard
pub fn create_red_bisbas_keyboard(
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                t_lang(localization, "option-small", language_code),
                "red_bisbas_small".to_string(),
            ),
            InlineKeyboardButton::callback(
                t_lang(localization, "option-large", language_code),
                "red_bisbas_large".to_string(),
            ),
        ],
        back_to_menu_row(language_code, localization),
    ])
}

/// Create an add-to-cart keyboard for products without options
pub fn create_direct_add_keyboard(
    add_callback: &str,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            format!(
                "➕ {}",
                t_lang(localization, "add-to-cart-button", language_code)
            ),
            add_callback.to_string(),
        )],
        back_to_menu_row(language_code, localization),
    ])
}

/// Create the keyboard shown when Hilbeh is out of its weekday window
pub fn create_hilbeh_unavailable_keyboard(
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            format!(
                "🚫 {}",
                t_lang(localization, "hilbeh-unavailable-button", language_code)
            ),
            "hilbeh_unavailable".to_string(),
        )],
        back_to_menu_row(language_code, localization),
    ])
}

/// Create the keyboard offered right after an item lands in the cart
pub fn create_post_add_keyboard(
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            format!("🛒 {}", t_lang(localization, "cart-view-button", language_code)),
            "cart_view".to_string(),
        ),
        InlineKeyboardButton::callback(
            format!("🍽️ {}", t_lang(localization, "back-to-menu", language_code)),
            "menu_main".to_string(),
        ),
    ]])
}

/// Create the cart keyboard: one adjustment row per line, then actions
pub fn create_cart_keyboard(
    items: &[CartItemView],
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    let mut buttons = Vec::new();

    for item in items {
        let label = truncate_button_label(&localized_product_label(
            item.product_id,
            &item.product_name,
            &item.product_options,
            language_code,
            localization,
        ));

        buttons.push(vec![
            InlineKeyboardButton::callback("➖", format!("cart_dec_{}", item.product_id)),
            InlineKeyboardButton::callback(
                format!("{} × {}", item.quantity, label),
                "noop".to_string(),
            ),
            InlineKeyboardButton::callback("➕", format!("cart_inc_{}", item.product_id)),
            InlineKeyboardButton::callback("🗑️", format!("cart_remove_{}", item.product_id)),
        ]);
    }

    buttons.push(vec![InlineKeyboardButton::callback(
        format!("✅ {}", t_lang(localization, "checkout-button", language_code)),
        "cart_checkout".to_string(),
    )]);
    buttons.push(vec![InlineKeyboardButton::callback(
        format!(
            "🗑️ {}",
            t_lang(localization, "clear-cart-button", language_code)
        ),
        "cart_clear_confirm".to_string(),
    )]);
    buttons.push(back_to_menu_row(language_code, localization));

    InlineKeyboardMarkup::new(buttons)
}

/// Create the clear-cart confirmation keyboard
pub fn create_clear_cart_confirm_keyboard(
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            format!("✅ {}", t_lang(localization, "yes-button", language_code)),
            "cart_clear_yes".to_string(),
        ),
        InlineKeyboardButton::callback(
            format!("❌ {}", t_lang(localization, "no-button", language_code)),
            "cart_view".to_string(),
        ),
    ]])
}

/// Create the pickup/delivery choice keyboard
pub fn create_delivery_method_keyboard(
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                format!("🏪 {}", t_lang(localization, "pickup-button", language_code)),
                "delivery_pickup".to_string(),
            ),
            InlineKeyboardButton::callback(
                format!("🚚 {}", t_lang(localization, "delivery-button", language_code)),
                "delivery_delivery".to_string(),
            ),
        ],
        vec![InlineKeyboardButton::callback(
            format!("⬅️ {}", t_lang(localization, "back-to-cart", language_code)),
            "cart_view".to_string(),
        )],
    ])
}

/// Create the pickup/delivery keyboard used during onboarding
///
/// Same choices as checkout, minus the back-to-cart row: there is no cart
/// to go back to yet.
pub fn create_onboarding_delivery_keyboard(
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            format!("🏪 {}", t_lang(localization, "pickup-button", language_code)),
            "delivery_pickup".to_string(),
        ),
        InlineKeyboardButton::callback(
            format!("🚚 {}", t_lang(localization, "delivery-button", language_code)),
            "delivery_delivery".to_string(),
        ),
    ]])
}

/// Create the saved-address / new-address choice keyboard
pub fn create_address_choice_keyboard(
    saved_address: &str,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            format!(
                "📍 {} ({})",
                t_lang(localization, "use-saved-address", language_code),
                truncate_button_label(saved_address)
            ),
            "delivery_address_use_saved".to_string(),
        )],
        vec![InlineKeyboardButton::callback(
            format!(
                "✏️ {}",
                t_lang(localization, "new-address-button", language_code)
            ),
            "delivery_address_new_address".to_string(),
        )],
        vec![InlineKeyboardButton::callback(
            format!("⬅️ {}", t_lang(localization, "back-to-cart", language_code)),
            "cart_view".to_string(),
        )],
    ])
}

/// Create the final order confirmation keyboard
pub fn create_order_confirm_keyboard(
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            format!(
                "✅ {}",
                t_lang(localization, "confirm-order-button", language_code)
            ),
            "confirm_order".to_string(),
        )],
        vec![InlineKeyboardButton::callback(
            format!("⬅️ {}", t_lang(localization, "back-to-cart", language_code)),
            "cart_view".to_string(),
        )],
    ])
}

/// Create the admin keyboard attached to new-order notifications
pub fn create_admin_order_keyboard(
    order_id: i64,
    localization: &Arc<LocalizationManager>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        format!("✅ {}", t_lang(localization, "admin-confirm-button", None)),
        format!("order_confirm_{}", order_id),
    )]])
}

/// Localized display label for a product and its chosen options
///
/// Seeded products have translation keys; anything else falls back to the
/// name stored in the database.
pub fn localized_product_label(
    product_id: i64,
    product_name: &str,
    options: &serde_json::Value,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> String {
    let display_name = match product_display_key(product_id) {
        Some(key) => t_lang(localization, key, language_code),
        None => product_name.to_string(),
    };

    let option_labels: Vec<String> = options
        .as_object()
        .map(|map| {
            map.values()
                .filter_map(|value| value.as_str())
                .map(|value| match option_label_key(value) {
                    Some(key) => t_lang(localization, key, language_code),
                    None => value.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    format_product_label(&display_name, &option_labels)
}

fn format_item_lines(
    items: &[CartItemView],
    currency: &str,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> String {
    let mut result = String::new();

    for (i, item) in items.iter().enumerate() {
        let label = localized_product_label(
            item.product_id,
            &item.product_name,
            &item.product_options,
            language_code,
            localization,
        );
        result.push_str(&format!(
            "{}. {}\n    {} × {} = {}\n",
            i + 1,
            label,
            item.quantity,
            format_price(item.unit_price, currency),
            format_price(item.line_total(), currency),
        ));
    }

    result
}

/// Render the cart contents message
pub fn format_cart_message(
    items: &[CartItemView],
    delivery_method: &str,
    currency: &str,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> String {
    let subtotal: f64 = items.iter().map(CartItemView::line_total).sum();
    let method_label = delivery_method_label(delivery_method, language_code, localization);

    format!(
        "🛒 **{}**\n{}\n{}{}\n{}: {}\n{}: {}",
        t_lang(localization, "cart-title", language_code),
        DIVIDER,
        format_item_lines(items, currency, language_code, localization),
        DIVIDER,
        t_lang(localization, "cart-subtotal", language_code),
        format_price(subtotal, currency),
        t_lang(localization, "cart-delivery-method", language_code),
        method_label,
    )
}

/// Localized pickup/delivery label for a stored method string
pub fn delivery_method_label(
    delivery_method: &str,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> String {
    match DeliveryMethod::parse(delivery_method) {
        Some(DeliveryMethod::Delivery) => t_lang(localization, "delivery-label", language_code),
        _ => t_lang(localization, "pickup-label", language_code),
    }
}

/// Render the pre-confirmation order summary
#[allow(clippy::too_many_arguments)]
pub fn format_order_summary(
    items: &[CartItemView],
    subtotal: f64,
    delivery_charge: f64,
    delivery_method: DeliveryMethod,
    delivery_address: Option<&str>,
    currency: &str,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> String {
    let total = subtotal + delivery_charge;
    let mut summary = format!(
        "📋 **{}**\n{}\n{}{}\n{}: {}\n",
        t_lang(localization, "order-summary-title", language_code),
        DIVIDER,
        format_item_lines(items, currency, language_code, localization),
        DIVIDER,
        t_lang(localization, "order-subtotal", language_code),
        format_price(subtotal, currency),
    );

    if delivery_method == DeliveryMethod::Delivery {
        summary.push_str(&format!(
            "{}: {}\n",
            t_lang(localization, "order-delivery-charge", language_code),
            format_price(delivery_charge, currency),
        ));
    }

    summary.push_str(&format!(
        "{}: {}\n\n{}: {}\n",
        t_lang(localization, "order-total", language_code),
        format_price(total, currency),
        t_lang(localization, "cart-delivery-method", language_code),
        delivery_method_label(delivery_method.as_str(), language_code, localization),
    ));

    if let Some(address) = delivery_address {
        if delivery_method == DeliveryMethod::Delivery {
            summary.push_str(&format!(
                "{}: {}\n",
                t_lang(localization, "order-address-label", language_code),
                address,
            ));
        }
    }

    summary.push('\n');
    summary.push_str(&t_lang(localization, "order-summary-footer", language_code));
    summary
}

/// Render the post-confirmation success message
pub fn format_order_confirmation(
    order_number: &str,
    total: f64,
    currency: &str,
    language_code: Option<&str>,
    localization: &Arc<LocalizationManager>,
) -> String {
    format!(
        "🎉 **{}**\n{}\n{}\n{}\n{}\n\n{}",
        t_lang(localization, "order-confirmed-title", language_code),
        DIVIDER,
        t_args_lang(
            localization,
            "order-confirmed-number",
            &[("number", order_number)],
            language_code,
        ),
        t_args_lang(
            localization,
            "order-confirmed-total",
            &[("total", &format_price(total, currency))],
            language_code,
        ),
        DIVIDER,
        t_lang(localization, "order-confirmed-footer", language_code),
    )
}

/// Render the admin notification for a freshly placed order
///
/// Admin messages are not localized per customer; they use the default
/// language and the product names stored on the order snapshot.
pub fn format_admin_order_notification(
    order: &Order,
    customer: &Customer,
    items: &[OrderItem],
    currency: &str,
    localization: &Arc<LocalizationManager>,
) -> String {
    let mut lines = String::new();
    for (i, item) in items.iter().enumerate() {
        let option_labels: Vec<String> = item
            .product_options
            .as_object()
            .map(|map| {
                map.values()
                    .filter_map(|value| value.as_str())
                    .map(|value| value.to_string())
                    .collect()
            })
            .unwrap_or_default();
        lines.push_str(&format!(
            "{}. {}\n    {} × {} = {}\n",
            i + 1,
            format_product_label(&item.product_name, &option_labels),
            item.quantity,
            format_price(item.unit_price, currency),
            format_price(item.total_price, currency),
        ));
    }

    let mut notification = format!(
        "🔔 **{}**\n{}\n{}: {}\n{}: {}\n{}: {}\n",
        t_args_lang(
            localization,
            "admin-new-order",
            &[("number", order.order_number.as_str())],
            None,
        ),
        DIVIDER,
        t_lang(localization, "admin-customer-label", None),
        customer.name,
        t_lang(localization, "admin-phone-label", None),
        customer.phone,
        t_lang(localization, "admin-method-label", None),
        order.delivery_method,
    );

    if let Some(ref address) = order.delivery_address {
        if order.delivery_method == DeliveryMethod::Delivery.as_str() {
            notification.push_str(&format!(
                "{}: {}\n",
                t_lang(localization, "admin-address-label", None),
                address,
            ));
        }
    }

    notification.push_str(&format!(
        "{}\n{}{}\n{}: {}",
        DIVIDER,
        lines,
        DIVIDER,
        t_lang(localization, "admin-total-label", None),
        format_price(order.total, currency),
    ));

    notification
}
