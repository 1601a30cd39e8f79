use samna_salta::bot::ui_builder::{
    create_address_choice_keyboard, create_admin_order_keyboard, create_cart_keyboard,
    create_clear_cart_confirm_keyboard, create_delivery_method_keyboard,
    create_direct_add_keyboard, create_hilbeh_unavailable_keyboard, create_kubaneh_keyboard,
    create_language_keyboard, create_main_menu_keyboard, create_onboarding_delivery_keyboard,
    create_order_confirm_keyboard, create_post_add_keyboard, create_red_bisbas_keyboard,
    create_samneh_keyboard, delivery_method_label, format_admin_order_notification,
    format_cart_message, format_order_confirmation, format_order_summary,
    localized_product_label, product_emoji,
};
use samna_salta::db::{CartItemView, Customer, DeliveryMethod, Order, OrderItem};
use samna_salta::localization::create_localization_manager;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardButtonKind, InlineKeyboardMarkup};

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> Arc<samna_salta::localization::LocalizationManager> {
        // Create a new shared localization manager for tests
        create_localization_manager().expect("Failed to create localization manager")
    }

    fn callback_data(button: &InlineKeyboardButton) -> &str {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => data,
            other => panic!("Expected a callback button, got {:?}", other),
        }
    }

    fn sample_cart_items() -> Vec<CartItemView> {
        vec![
            CartItemView {
                id: 1,
                product_id: 1,
                product_name: "Kubaneh".to_string(),
                quantity: 2,
                unit_price: 25.0,
                product_options: json!({"type": "classic"}),
            },
            CartItemView {
                id: 2,
                product_id: 2,
                product_name: "Samneh".to_string(),
                quantity: 1,
                unit_price: 15.0,
                product_options: json!({"type": "smoked"}),
            },
        ]
    }

    /// Test language selection keyboard structure
    #[test]
    fn test_language_keyboard_creation() {
        let keyboard = create_language_keyboard();

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            // One row per language, each with a single button
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].len(), 1);
            assert_eq!(rows[1].len(), 1);

            assert_eq!(callback_data(&rows[0][0]), "language_en");
            assert!(rows[0][0].text.contains("English"));
            assert_eq!(callback_data(&rows[1][0]), "language_he");
            assert!(rows[1][0].text.contains("עברית"));
        }
    }

    /// Test main menu keyboard structure and product callbacks
    #[test]
    fn test_main_menu_keyboard_creation() {
        let manager = setup_localization();
        let keyboard = create_main_menu_keyboard(Some("en"), &manager);

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            // Six product rows (hawaij blends share one) plus the cart row
            assert_eq!(rows.len(), 7);

            assert_eq!(callback_data(&rows[0][0]), "menu_kubaneh");
            assert!(rows[0][0].text.contains("Kubaneh"));
            assert_eq!(callback_data(&rows[1][0]), "menu_samneh");
            assert_eq!(callback_data(&rows[2][0]), "menu_red_bisbas");

            // The two hawaij blends sit side by side
            assert_eq!(rows[3].len(), 2);
            assert_eq!(callback_data(&rows[3][0]), "menu_hawaij_soup");
            assert_eq!(callback_data(&rows[3][1]), "menu_hawaij_coffee");

            assert_eq!(callback_data(&rows[4][0]), "menu_white_coffee");
            assert_eq!(callback_data(&rows[5][0]), "menu_hilbeh");

            // The cart shortcut closes the menu
            assert_eq!(rows[6].len(), 1);
            assert_eq!(callback_data(&rows[6][0]), "cart_view");
        }
    }

    /// Test main menu keyboard renders Hebrew labels
    #[test]
    fn test_main_menu_keyboard_hebrew() {
        let manager = setup_localization();
        let keyboard = create_main_menu_keyboard(Some("he"), &manager);

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            assert!(rows[0][0].text.contains("כובאנה"));
            // Callback data stays language independent
            assert_eq!(callback_data(&rows[0][0]), "menu_kubaneh");
        }
    }

    /// Test kubaneh option keyboard structure
    #[test]
    fn test_kubaneh_keyboard_creation() {
        let manager = setup_localization();
        let keyboard = create_kubaneh_keyboard(Some("en"), &manager);

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            // Two option rows of two, then the back row
            assert_eq!(rows.len(), 3);
            assert_eq!(rows[0].len(), 2);
            assert_eq!(rows[1].len(), 2);
            assert_eq!(rows[2].len(), 1);

            assert_eq!(callback_data(&rows[0][0]), "kubaneh_classic");
            assert_eq!(callback_data(&rows[0][1]), "kubaneh_seeded");
            assert_eq!(callback_data(&rows[1][0]), "kubaneh_herb");
            assert_eq!(callback_data(&rows[1][1]), "kubaneh_aromatic");
            assert_eq!(callback_data(&rows[2][0]), "menu_main");
        }
    }

    /// Test samneh and red bisbas option keyboards
    #[test]
    fn test_two_option_keyboards() {
        let manager = setup_localization();

        let InlineKeyboardMarkup {
            inline_keyboard: samneh_rows,
        } = create_samneh_keyboard(Some("en"), &manager);
        assert_eq!(samneh_rows.len(), 2);
        assert_eq!(callback_data(&samneh_rows[0][0]), "samneh_smoked");
        assert_eq!(callback_data(&samneh_rows[0][1]), "samneh_not_smoked");
        assert_eq!(callback_data(&samneh_rows[1][0]), "menu_main");

        let InlineKeyboardMarkup {
            inline_keyboard: bisbas_rows,
        } = create_red_bisbas_keyboard(Some("en"), &manager);
        assert_eq!(bisbas_rows.len(), 2);
        assert_eq!(callback_data(&bisbas_rows[0][0]), "red_bisbas_small");
        assert_eq!(callback_data(&bisbas_rows[0][1]), "red_bisbas_large");
        assert_eq!(callback_data(&bisbas_rows[1][0]), "menu_main");
    }

    /// Test the add keyboard for products without options
    #[test]
    fn test_direct_add_keyboard_creation() {
        let manager = setup_localization();
        let keyboard = create_direct_add_keyboard("white_coffee", Some("en"), &manager);

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            assert_eq!(rows.len(), 2);
            assert_eq!(callback_data(&rows[0][0]), "white_coffee");
            assert!(rows[0][0].text.contains("Add to Cart"));
            assert_eq!(callback_data(&rows[1][0]), "menu_main");
        }
    }

    /// Test the keyboard shown when hilbeh is out of season
    #[test]
    fn test_hilbeh_unavailable_keyboard_creation() {
        let manager = setup_localization();
        let keyboard = create_hilbeh_unavailable_keyboard(Some("en"), &manager);

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            assert_eq!(rows.len(), 2);
            assert_eq!(callback_data(&rows[0][0]), "hilbeh_unavailable");
            assert!(rows[0][0].text.contains("🚫"));
            assert_eq!(callback_data(&rows[1][0]), "menu_main");
        }
    }

    /// Test the keyboard offered right after adding to cart
    #[test]
    fn test_post_add_keyboard_creation() {
        let manager = setup_localization();
        let keyboard = create_post_add_keyboard(Some("en"), &manager);

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].len(), 2);
            assert_eq!(callback_data(&rows[0][0]), "cart_view");
            assert_eq!(callback_data(&rows[0][1]), "menu_main");
        }
    }

    /// Test cart keyboard structure with adjustment rows per line
    #[test]
    fn test_cart_keyboard_creation() {
        let manager = setup_localization();
        let items = sample_cart_items();
        let keyboard = create_cart_keyboard(&items, Some("en"), &manager);

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            // One adjustment row per line, then checkout, clear and back
            assert_eq!(rows.len(), 5);

            // First line: minus, label, plus, remove
            assert_eq!(rows[0].len(), 4);
            assert_eq!(callback_data(&rows[0][0]), "cart_dec_1");
            assert_eq!(callback_data(&rows[0][1]), "noop");
            assert!(rows[0][1].text.contains("2 ×"));
            assert!(rows[0][1].text.contains("Kubaneh"));
            assert_eq!(callback_data(&rows[0][2]), "cart_inc_1");
            assert_eq!(callback_data(&rows[0][3]), "cart_remove_1");

            assert_eq!(callback_data(&rows[1][0]), "cart_dec_2");
            assert_eq!(callback_data(&rows[1][3]), "cart_remove_2");

            assert_eq!(callback_data(&rows[2][0]), "cart_checkout");
            assert_eq!(callback_data(&rows[3][0]), "cart_clear_confirm");
            assert_eq!(callback_data(&rows[4][0]), "menu_main");
        }
    }

    /// Test cart keyboard with no lines still offers the action rows
    #[test]
    fn test_cart_keyboard_empty() {
        let manager = setup_localization();
        let items: Vec<CartItemView> = vec![];
        let keyboard = create_cart_keyboard(&items, Some("en"), &manager);

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            assert_eq!(rows.len(), 3);
            assert_eq!(callback_data(&rows[0][0]), "cart_checkout");
            assert_eq!(callback_data(&rows[1][0]), "cart_clear_confirm");
            assert_eq!(callback_data(&rows[2][0]), "menu_main");
        }
    }

    /// Test long product labels are truncated on cart buttons
    #[test]
    fn test_cart_keyboard_long_labels() {
        let manager = setup_localization();
        let items = vec![CartItemView {
            id: 1,
            product_id: 99,
            product_name: "Extra Special Festival Gift Basket Deluxe".to_string(),
            quantity: 1,
            unit_price: 120.0,
            product_options: json!({}),
        }];

        let keyboard = create_cart_keyboard(&items, Some("en"), &manager);

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            assert!(rows[0][1].text.contains("..."));
        }
    }

    /// Test the clear-cart confirmation keyboard
    #[test]
    fn test_clear_cart_confirm_keyboard_creation() {
        let manager = setup_localization();
        let keyboard = create_clear_cart_confirm_keyboard(Some("en"), &manager);

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].len(), 2);
            assert_eq!(callback_data(&rows[0][0]), "cart_clear_yes");
            // Declining just goes back to the cart view
            assert_eq!(callback_data(&rows[0][1]), "cart_view");
        }
    }

    /// Test checkout and onboarding delivery keyboards
    #[test]
    fn test_delivery_method_keyboards() {
        let manager = setup_localization();

        let InlineKeyboardMarkup {
            inline_keyboard: checkout_rows,
        } = create_delivery_method_keyboard(Some("en"), &manager);
        assert_eq!(checkout_rows.len(), 2);
        assert_eq!(callback_data(&checkout_rows[0][0]), "delivery_pickup");
        assert_eq!(callback_data(&checkout_rows[0][1]), "delivery_delivery");
        assert_eq!(callback_data(&checkout_rows[1][0]), "cart_view");

        // The onboarding variant has no cart to go back to
        let InlineKeyboardMarkup {
            inline_keyboard: onboarding_rows,
        } = create_onboarding_delivery_keyboard(Some("en"), &manager);
        assert_eq!(onboarding_rows.len(), 1);
        assert_eq!(callback_data(&onboarding_rows[0][0]), "delivery_pickup");
        assert_eq!(callback_data(&onboarding_rows[0][1]), "delivery_delivery");
    }

    /// Test the saved-address choice keyboard
    #[test]
    fn test_address_choice_keyboard_creation() {
        let manager = setup_localization();
        let keyboard =
            create_address_choice_keyboard("12 Herzl St, Tel Aviv", Some("en"), &manager);

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            assert_eq!(rows.len(), 3);
            assert_eq!(callback_data(&rows[0][0]), "delivery_address_use_saved");
            assert!(rows[0][0].text.contains("12 Herzl St"));
            assert_eq!(callback_data(&rows[1][0]), "delivery_address_new_address");
            assert_eq!(callback_data(&rows[2][0]), "cart_view");
        }
    }

    /// Test the final order confirmation keyboard
    #[test]
    fn test_order_confirm_keyboard_creation() {
        let manager = setup_localization();
        let keyboard = create_order_confirm_keyboard(Some("en"), &manager);

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            assert_eq!(rows.len(), 2);
            assert_eq!(callback_data(&rows[0][0]), "confirm_order");
            assert!(rows[0][0].text.contains("Confirm"));
            assert_eq!(callback_data(&rows[1][0]), "cart_view");
        }
    }

    /// Test the admin notification keyboard carries the order id
    #[test]
    fn test_admin_order_keyboard_creation() {
        let manager = setup_localization();
        let keyboard = create_admin_order_keyboard(42, &manager);

        let InlineKeyboardMarkup {
            inline_keyboard: rows,
        } = keyboard;
        {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].len(), 1);
            assert_eq!(callback_data(&rows[0][0]), "order_confirm_42");
        }
    }

    /// Test every seeded product has its own emoji
    #[test]
    fn test_product_emoji_covers_catalog() {
        for product_id in 1..=7 {
            assert_ne!(product_emoji(product_id), "🍽️");
        }
        assert_eq!(product_emoji(99), "🍽️");
    }

    /// Test localized product labels with and without options
    #[test]
    fn test_localized_product_label() {
        let manager = setup_localization();

        let english = localized_product_label(
            1,
            "Kubaneh",
            &json!({"type": "classic"}),
            Some("en"),
            &manager,
        );
        assert_eq!(english, "Kubaneh (Classic)");

        let hebrew = localized_product_label(
            1,
            "Kubaneh",
            &json!({"type": "classic"}),
            Some("he"),
            &manager,
        );
        assert!(hebrew.contains("כובאנה"));

        // Unknown products fall back to the stored name
        let unknown = localized_product_label(42, "Lachuch", &json!({}), Some("en"), &manager);
        assert_eq!(unknown, "Lachuch");
    }

    /// Test pickup/delivery labels from stored method strings
    #[test]
    fn test_delivery_method_label() {
        let manager = setup_localization();

        assert_eq!(delivery_method_label("pickup", Some("en"), &manager), "Pickup");
        assert_eq!(
            delivery_method_label("delivery", Some("en"), &manager),
            "Delivery"
        );
        // Unknown strings read as pickup rather than crashing the render
        assert_eq!(
            delivery_method_label("teleport", Some("en"), &manager),
            "Pickup"
        );
        assert_eq!(delivery_method_label("delivery", Some("he"), &manager), "משלוח");
    }

    /// Test cart message formatting with items and totals
    #[test]
    fn test_cart_message_formatting() {
        let manager = setup_localization();
        let items = sample_cart_items();

        let message = format_cart_message(&items, "pickup", "ILS", Some("en"), &manager);

        assert!(message.contains("Your Cart"));
        assert!(message.contains("1. Kubaneh (Classic)"));
        assert!(message.contains("2. Samneh (Smoked)"));
        assert!(message.contains("₪25.00"));
        // Subtotal: 2 × 25 + 1 × 15
        assert!(message.contains("₪65.00"));
        assert!(message.contains("Subtotal"));
        assert!(message.contains("Pickup"));
    }

    /// Test order summary includes the delivery charge and address
    #[test]
    fn test_order_summary_with_delivery() {
        let manager = setup_localization();
        let items = sample_cart_items();

        let summary = format_order_summary(
            &items,
            65.0,
            5.0,
            DeliveryMethod::Delivery,
            Some("12 Herzl St, Tel Aviv"),
            "ILS",
            Some("en"),
            &manager,
        );

        assert!(summary.contains("Order Summary"));
        assert!(summary.contains("Delivery charge"));
        assert!(summary.contains("₪5.00"));
        assert!(summary.contains("₪70.00"));
        assert!(summary.contains("Address"));
        assert!(summary.contains("12 Herzl St"));
        assert!(summary.contains("Everything look right?"));
    }

    /// Test pickup summaries omit the delivery charge and address lines
    #[test]
    fn test_order_summary_pickup() {
        let manager = setup_localization();
        let items = sample_cart_items();

        let summary = format_order_summary(
            &items,
            65.0,
            0.0,
            DeliveryMethod::Pickup,
            None,
            "ILS",
            Some("en"),
            &manager,
        );

        assert!(summary.contains("Order Summary"));
        assert!(summary.contains("₪65.00"));
        assert!(summary.contains("Pickup"));
        assert!(!summary.contains("Delivery charge"));
        assert!(!summary.contains("Address"));
    }

    /// Test the customer-facing order confirmation message
    #[test]
    fn test_order_confirmation_formatting() {
        let manager = setup_localization();

        let message = format_order_confirmation(
            "SS20260823120000AB12",
            70.0,
            "ILS",
            Some("en"),
            &manager,
        );

        assert!(message.contains("Order Confirmed"));
        assert!(message.contains("SS20260823120000AB12"));
        assert!(message.contains("₪70.00"));
        assert!(message.contains("Thank you"));
    }

    /// Test the admin notification carries customer and order details
    #[test]
    fn test_admin_notification_formatting() {
        let manager = setup_localization();
        let now = Utc::now();

        let order = Order {
            id: 7,
            customer_id: 3,
            order_number: "SS20260823120000AB12".to_string(),
            status: "pending".to_string(),
            subtotal: 70.0,
            delivery_charge: 5.0,
            total: 75.0,
            delivery_method: "delivery".to_string(),
            delivery_address: Some("12 Herzl St, Tel Aviv".to_string()),
            created_at: now,
        };
        let customer = Customer {
            id: 3,
            telegram_id: 123456789,
            name: "Maya Levi".to_string(),
            phone: "+972501234567".to_string(),
            language: "he".to_string(),
            delivery_address: Some("12 Herzl St, Tel Aviv".to_string()),
            created_at: now,
            updated_at: now,
        };
        let items = vec![
            OrderItem {
                id: 1,
                order_id: 7,
                product_id: Some(1),
                product_name: "Kubaneh".to_string(),
                product_options: json!({"type": "classic"}),
                quantity: 2,
                unit_price: 25.0,
                total_price: 50.0,
            },
            OrderItem {
                id: 2,
                order_id: 7,
                product_id: Some(6),
                product_name: "White coffee".to_string(),
                product_options: json!({}),
                quantity: 2,
                unit_price: 10.0,
                total_price: 20.0,
            },
        ];

        let notification =
            format_admin_order_notification(&order, &customer, &items, "ILS", &manager);

        assert!(notification.contains("SS20260823120000AB12"));
        assert!(notification.contains("Maya Levi"));
        assert!(notification.contains("+972501234567"));
        assert!(notification.contains("delivery"));
        assert!(notification.contains("12 Herzl St"));
        // Option values appear as stored, not localized
        assert!(notification.contains("Kubaneh (classic)"));
        assert!(notification.contains("White coffee"));
        assert!(notification.contains("₪75.00"));
    }

    /// Test pickup admin notifications omit the address line
    #[test]
    fn test_admin_notification_pickup() {
        let manager = setup_localization();
        let now = Utc::now();

        let order = Order {
            id: 8,
            customer_id: 3,
            order_number: "SS20260823130000CD34".to_string(),
            status: "pending".to_string(),
            subtotal: 25.0,
            delivery_charge: 0.0,
            total: 25.0,
            delivery_method: "pickup".to_string(),
            delivery_address: None,
            created_at: now,
        };
        let customer = Customer {
            id: 3,
            telegram_id: 123456789,
            name: "Maya Levi".to_string(),
            phone: "+972501234567".to_string(),
            language: "en".to_string(),
            delivery_address: None,
            created_at: now,
            updated_at: now,
        };
        let items = vec![OrderItem {
            id: 3,
            order_id: 8,
            product_id: Some(1),
            product_name: "Kubaneh".to_string(),
            product_options: json!({"type": "herb"}),
            quantity: 1,
            unit_price: 25.0,
            total_price: 25.0,
        }];

        let notification =
            format_admin_order_notification(&order, &customer, &items, "ILS", &manager);

        assert!(notification.contains("pickup"));
        assert!(!notification.contains("Address"));
        assert!(notification.contains("₪25.00"));
    }
}
