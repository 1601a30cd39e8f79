use anyhow::Result;

use samna_salta::bot::dialogue_manager::is_cancellation_command;
use samna_salta::dialogue::OrderDialogueState;
use samna_salta::validation::{
    validate_customer_name, validate_delivery_address, validate_phone_number,
};

/// Integration test for customer name validation during onboarding
#[tokio::test]
async fn test_customer_name_dialogue_validation() -> Result<()> {
    // Test valid names
    assert_eq!(validate_customer_name("Maya Levi"), Ok("Maya Levi"));
    assert_eq!(validate_customer_name("  Maya  "), Ok("Maya"));

    // Test invalid names, by error key
    assert_eq!(validate_customer_name(""), Err("name-empty"));
    assert_eq!(validate_customer_name("   "), Err("name-empty"));
    assert_eq!(validate_customer_name("M"), Err("name-too-short"));
    assert_eq!(validate_customer_name(&"a".repeat(101)), Err("name-too-long"));
    assert_eq!(validate_customer_name("12345"), Err("name-needs-letters"));

    Ok(())
}

/// Integration test for phone validation and normalization during onboarding
#[tokio::test]
async fn test_phone_dialogue_validation() -> Result<()> {
    // Local numbers normalize to the +972 international form
    assert_eq!(
        validate_phone_number("0501234567"),
        Ok("+972501234567".to_string())
    );
    assert_eq!(
        validate_phone_number("050-123-4567"),
        Ok("+972501234567".to_string())
    );
    assert_eq!(
        validate_phone_number("+972 50 123 4567"),
        Ok("+972501234567".to_string())
    );
    assert_eq!(
        validate_phone_number("501234567"),
        Ok("+972501234567".to_string())
    );

    // Test invalid numbers, by error key
    assert_eq!(validate_phone_number(""), Err("phone-empty"));
    assert_eq!(
        validate_phone_number("call me maybe"),
        Err("phone-invalid-characters")
    );
    assert_eq!(validate_phone_number("12-34"), Err("phone-too-short"));
    assert_eq!(
        validate_phone_number("1234567890123456"),
        Err("phone-too-long")
    );

    Ok(())
}

/// Integration test for delivery address validation
#[tokio::test]
async fn test_address_dialogue_validation() -> Result<()> {
    assert_eq!(
        validate_delivery_address("12 Herzl St, Tel Aviv"),
        Ok("12 Herzl St, Tel Aviv")
    );
    assert_eq!(
        validate_delivery_address("  5 Yefet St, Jaffa  "),
        Ok("5 Yefet St, Jaffa")
    );

    assert_eq!(validate_delivery_address(""), Err("address-empty"));
    assert_eq!(validate_delivery_address("abc"), Err("address-too-short"));
    assert_eq!(
        validate_delivery_address(&"a".repeat(501)),
        Err("address-too-long")
    );

    Ok(())
}

/// Test basic dialogue functionality
#[tokio::test]
async fn test_dialogue_functionality() -> Result<()> {
    // Test that we can create dialogue states properly
    let start_state = OrderDialogueState::Start;
    assert!(matches!(start_state, OrderDialogueState::Start));

    // Test default trait
    let default_state = OrderDialogueState::default();
    assert!(matches!(default_state, OrderDialogueState::Start));

    Ok(())
}

/// Test onboarding states carry collected answers forward
#[test]
fn test_onboarding_state_progression() {
    // Language chosen, waiting for a name
    let state = OrderDialogueState::AwaitingName {
        language_code: Some("he".to_string()),
    };
    match state {
        OrderDialogueState::AwaitingName { language_code } => {
            assert_eq!(language_code, Some("he".to_string()));
        }
        _ => panic!("Expected AwaitingName state"),
    }

    // Name accepted, waiting for a phone number
    let state = OrderDialogueState::AwaitingPhone {
        name: "Maya Levi".to_string(),
        language_code: Some("he".to_string()),
    };
    match state {
        OrderDialogueState::AwaitingPhone {
            name,
            language_code,
        } => {
            assert_eq!(name, "Maya Levi");
            assert_eq!(language_code, Some("he".to_string()));
        }
        _ => panic!("Expected AwaitingPhone state"),
    }

    // Phone accepted, waiting for the pickup/delivery choice
    let state = OrderDialogueState::AwaitingDeliveryMethod {
        name: "Maya Levi".to_string(),
        phone: "+972501234567".to_string(),
        language_code: Some("he".to_string()),
    };
    match state {
        OrderDialogueState::AwaitingDeliveryMethod {
            name,
            phone,
            language_code,
        } => {
            assert_eq!(name, "Maya Levi");
            assert_eq!(phone, "+972501234567");
            assert_eq!(language_code, Some("he".to_string()));
        }
        _ => panic!("Expected AwaitingDeliveryMethod state"),
    }

    // Delivery chosen, waiting for the address with everything still in hand
    let state = OrderDialogueState::AwaitingDeliveryAddress {
        name: "Maya Levi".to_string(),
        phone: "+972501234567".to_string(),
        language_code: Some("he".to_string()),
    };
    match state {
        OrderDialogueState::AwaitingDeliveryAddress { name, phone, .. } => {
            assert_eq!(name, "Maya Levi");
            assert_eq!(phone, "+972501234567");
        }
        _ => panic!("Expected AwaitingDeliveryAddress state"),
    }
}

/// Test the checkout address state stands alone without onboarding data
#[test]
fn test_checkout_address_state() {
    let state = OrderDialogueState::AwaitingCheckoutAddress {
        language_code: None,
    };
    match state {
        OrderDialogueState::AwaitingCheckoutAddress { language_code } => {
            assert_eq!(language_code, None);
        }
        _ => panic!("Expected AwaitingCheckoutAddress state"),
    }
}

/// Test dialogue states survive a serde round trip
#[test]
fn test_dialogue_state_serialization() {
    let state = OrderDialogueState::AwaitingPhone {
        name: "Maya Levi".to_string(),
        language_code: Some("en".to_string()),
    };

    let encoded = serde_json::to_string(&state).expect("state should serialize");
    let decoded: OrderDialogueState =
        serde_json::from_str(&encoded).expect("state should deserialize");

    match decoded {
        OrderDialogueState::AwaitingPhone {
            name,
            language_code,
        } => {
            assert_eq!(name, "Maya Levi");
            assert_eq!(language_code, Some("en".to_string()));
        }
        _ => panic!("Expected AwaitingPhone state after round trip"),
    }
}

/// Test typed cancellation commands during the dialogue
#[test]
fn test_dialogue_cancellation_commands() {
    let cancellation_inputs = ["/cancel", "cancel", "stop", "back", "  CANCEL  ", "Stop"];
    for input in &cancellation_inputs {
        assert!(
            is_cancellation_command(input),
            "Input '{}' should be recognized as cancellation",
            input
        );
    }

    let regular_inputs = ["backwards", "cancelled", "Maya Levi", "5 Cancel St, Haifa", ""];
    for input in &regular_inputs {
        assert!(
            !is_cancellation_command(input),
            "Input '{}' should not be recognized as cancellation",
            input
        );
    }
}
