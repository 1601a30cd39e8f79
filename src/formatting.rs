//! Message layout helpers
//!
//! String-template helpers shared by the bot handlers: price rendering,
//! product labels and the divider used to frame titles and totals.
//! Message wording itself lives in the Fluent resources; these functions
//! only lay text out.

/// Horizontal rule used to frame titles and totals
pub const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Render an amount in the configured currency, e.g. "₪25.00"
pub fn format_price(amount: f64, currency: &str) -> String {
    format!("{}{:.2}", currency_symbol(currency), amount)
}

/// Symbol for a supported currency code
pub fn currency_symbol(currency: &str) -> &str {
    match currency {
        "ILS" => "₪",
        "USD" => "$",
        "EUR" => "€",
        other => other,
    }
}

/// Product label with its option labels, e.g. "Kubaneh (Classic)"
pub fn format_product_label(name: &str, option_labels: &[String]) -> String {
    if option_labels.is_empty() {
        name.to_string()
    } else {
        format!("{} ({})", name, option_labels.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(25.0, "ILS"), "₪25.00");
        assert_eq!(format_price(8.5, "ILS"), "₪8.50");
        assert_eq!(format_price(12.345, "USD"), "$12.35");
        assert_eq!(format_price(0.0, "EUR"), "€0.00");
        // Unknown codes fall back to the code itself
        assert_eq!(format_price(3.0, "GBP"), "GBP3.00");
    }

    #[test]
    fn test_format_product_label() {
        assert_eq!(format_product_label("Kubaneh", &[]), "Kubaneh");
        assert_eq!(
            format_product_label("Kubaneh", &["Classic".to_string()]),
            "Kubaneh (Classic)"
        );
        assert_eq!(
            format_product_label("Red Bisbas", &["Small".to_string(), "Jar".to_string()]),
            "Red Bisbas (Small, Jar)"
        );
    }
}
