//! Product catalog constants and callback mapping
//!
//! The menu keyboards emit product callback strings; this module resolves
//! them to the seeded product ids and their option payloads, and answers
//! availability questions for the one product with a weekday window.

use crate::config::BusinessConfig;
use chrono::{Datelike, Local, Weekday};
use serde_json::{json, Value};

/// Seeded product ids, stable across deployments
pub const PRODUCT_KUBANEH: i64 = 1;
pub const PRODUCT_SAMNEH: i64 = 2;
pub const PRODUCT_RED_BISBAS: i64 = 3;
pub const PRODUCT_HAWAIJ_SOUP: i64 = 4;
pub const PRODUCT_HAWAIJ_COFFEE: i64 = 5;
pub const PRODUCT_WHITE_COFFEE: i64 = 6;
pub const PRODUCT_HILBEH: i64 = 7;

/// Resolve a product callback string to a product id and options payload
///
/// Returns `None` for callback data that does not select a product.
pub fn product_selection(callback_data: &str) -> Option<(i64, Value)> {
    let selection = match callback_data {
        // Kubaneh bread types
        "kubaneh_classic" => (PRODUCT_KUBANEH, json!({"type": "classic"})),
        "kubaneh_seeded" => (PRODUCT_KUBANEH, json!({"type": "seeded"})),
        "kubaneh_herb" => (PRODUCT_KUBANEH, json!({"type": "herb"})),
        "kubaneh_aromatic" => (PRODUCT_KUBANEH, json!({"type": "aromatic"})),

        // Samneh smoking options
        "samneh_smoked" => (PRODUCT_SAMNEH, json!({"type": "smoked"})),
        "samneh_not_smoked" => (PRODUCT_SAMNEH, json!({"type": "not_smoked"})),

        // Red Bisbas sizes
        "red_bisbas_small" => (PRODUCT_RED_BISBAS, json!({"size": "small"})),
        "red_bisbas_large" => (PRODUCT_RED_BISBAS, json!({"size": "large"})),

        // Single-variant products
        "hawaij_soup_spice" => (PRODUCT_HAWAIJ_SOUP, json!({})),
        "hawaij_coffee_spice" => (PRODUCT_HAWAIJ_COFFEE, json!({})),
        "white_coffee" => (PRODUCT_WHITE_COFFEE, json!({})),
        "add_hilbeh" => (PRODUCT_HILBEH, json!({})),

        _ => return None,
    };

    Some(selection)
}

/// Resolve a menu navigation callback to the product it opens
pub fn menu_target(callback_data: &str) -> Option<i64> {
    match callback_data {
        "menu_kubaneh" => Some(PRODUCT_KUBANEH),
        "menu_samneh" => Some(PRODUCT_SAMNEH),
        "menu_red_bisbas" => Some(PRODUCT_RED_BISBAS),
        "menu_hawaij_soup" => Some(PRODUCT_HAWAIJ_SOUP),
        "menu_hawaij_coffee" => Some(PRODUCT_HAWAIJ_COFFEE),
        "menu_white_coffee" => Some(PRODUCT_WHITE_COFFEE),
        "menu_hilbeh" => Some(PRODUCT_HILBEH),
        _ => None,
    }
}

/// Localization key for a product's display name
pub fn product_display_key(product_id: i64) -> Option<&'static str> {
    match product_id {
        PRODUCT_KUBANEH => Some("product-kubaneh"),
        PRODUCT_SAMNEH => Some("product-samneh"),
        PRODUCT_RED_BISBAS => Some("product-red-bisbas"),
        PRODUCT_HAWAIJ_SOUP => Some("product-hawaij-soup"),
        PRODUCT_HAWAIJ_COFFEE => Some("product-hawaij-coffee"),
        PRODUCT_WHITE_COFFEE => Some("product-white-coffee"),
        PRODUCT_HILBEH => Some("product-hilbeh"),
        _ => None,
    }
}

/// Localization key for a product's description shown on its menu page
pub fn product_description_key(product_id: i64) -> Option<&'static str> {
    match product_id {
        PRODUCT_KUBANEH => Some("desc-kubaneh"),
        PRODUCT_SAMNEH => Some("desc-samneh"),
        PRODUCT_RED_BISBAS => Some("desc-red-bisbas"),
        PRODUCT_HAWAIJ_SOUP => Some("desc-hawaij-soup"),
        PRODUCT_HAWAIJ_COFFEE => Some("desc-hawaij-coffee"),
        PRODUCT_WHITE_COFFEE => Some("desc-white-coffee"),
        PRODUCT_HILBEH => Some("desc-hilbeh"),
        _ => None,
    }
}

/// Localization key for an option value stored in a cart item payload
pub fn option_label_key(option_value: &str) -> Option<&'static str> {
    match option_value {
        "classic" => Some("option-classic"),
        "seeded" => Some("option-seeded"),
        "herb" => Some("option-herb"),
        "aromatic" => Some("option-aromatic"),
        "smoked" => Some("option-smoked"),
        "not_smoked" => Some("option-not-smoked"),
        "small" => Some("option-small"),
        "large" => Some("option-large"),
        _ => None,
    }
}

/// Check whether Hilbeh can be ordered today
pub fn is_hilbeh_available(config: &BusinessConfig) -> bool {
    is_hilbeh_available_on(config, Local::now().weekday())
}

/// Check Hilbeh availability for a given weekday
pub fn is_hilbeh_available_on(config: &BusinessConfig, weekday: Weekday) -> bool {
    let today = weekday_name(weekday);
    config
        .hilbeh_available_days
        .iter()
        .any(|day| day == today)
}

/// Lowercase English weekday name, matching the configuration vocabulary
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_selection_with_options() {
        let (id, options) = product_selection("kubaneh_seeded").unwrap();
        assert_eq!(id, PRODUCT_KUBANEH);
        assert_eq!(options, json!({"type": "seeded"}));

        let (id, options) = product_selection("samneh_not_smoked").unwrap();
        assert_eq!(id, PRODUCT_SAMNEH);
        assert_eq!(options, json!({"type": "not_smoked"}));

        let (id, options) = product_selection("red_bisbas_large").unwrap();
        assert_eq!(id, PRODUCT_RED_BISBAS);
        assert_eq!(options, json!({"size": "large"}));
    }

    #[test]
    fn test_product_selection_single_variant() {
        let (id, options) = product_selection("hawaij_soup_spice").unwrap();
        assert_eq!(id, PRODUCT_HAWAIJ_SOUP);
        assert_eq!(options, json!({}));

        let (id, _) = product_selection("white_coffee").unwrap();
        assert_eq!(id, PRODUCT_WHITE_COFFEE);

        let (id, _) = product_selection("add_hilbeh").unwrap();
        assert_eq!(id, PRODUCT_HILBEH);
    }

    #[test]
    fn test_product_selection_rejects_non_product_callbacks() {
        assert!(product_selection("cart_view").is_none());
        assert!(product_selection("menu_main").is_none());
        assert!(product_selection("delivery_pickup").is_none());
        assert!(product_selection("").is_none());
    }

    #[test]
    fn test_option_label_keys() {
        assert_eq!(option_label_key("classic"), Some("option-classic"));
        assert_eq!(option_label_key("not_smoked"), Some("option-not-smoked"));
        assert_eq!(option_label_key("large"), Some("option-large"));
        assert_eq!(option_label_key("unknown"), None);
    }

    #[test]
    fn test_menu_target_resolution() {
        assert_eq!(menu_target("menu_kubaneh"), Some(PRODUCT_KUBANEH));
        assert_eq!(menu_target("menu_hilbeh"), Some(PRODUCT_HILBEH));
        assert_eq!(menu_target("menu_main"), None);
        assert_eq!(menu_target("cart_view"), None);
    }

    #[test]
    fn test_every_product_has_display_and_description_keys() {
        for product_id in 1..=7 {
            assert!(product_display_key(product_id).is_some());
            assert!(product_description_key(product_id).is_some());
        }
        assert!(product_display_key(99).is_none());
        assert!(product_description_key(0).is_none());
    }

    #[test]
    fn test_hilbeh_availability_window() {
        let config = BusinessConfig::default();

        // Default window is Wednesday through Friday
        assert!(is_hilbeh_available_on(&config, Weekday::Wed));
        assert!(is_hilbeh_available_on(&config, Weekday::Fri));
        assert!(!is_hilbeh_available_on(&config, Weekday::Mon));
        assert!(!is_hilbeh_available_on(&config, Weekday::Sun));

        let mut everyday = BusinessConfig::default();
        everyday.hilbeh_available_days = vec![
            "monday".to_string(),
            "tuesday".to_string(),
            "wednesday".to_string(),
            "thursday".to_string(),
            "friday".to_string(),
            "saturday".to_string(),
            "sunday".to_string(),
        ];
        assert!(is_hilbeh_available_on(&everyday, Weekday::Sun));

        let mut never = BusinessConfig::default();
        never.hilbeh_available_days.clear();
        assert!(!is_hilbeh_available_on(&never, Weekday::Wed));
    }
}
