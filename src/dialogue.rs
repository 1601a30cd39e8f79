//! Order dialogue module for handling conversation state with customers.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Represents the conversation state for onboarding and checkout
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum OrderDialogueState {
    #[default]
    Start,
    /// Onboarding: language chosen, waiting for the customer's name
    AwaitingName {
        language_code: Option<String>,
    },
    /// Onboarding: name accepted, waiting for a phone number
    AwaitingPhone {
        name: String,
        language_code: Option<String>,
    },
    /// Onboarding: phone accepted, waiting for the pickup/delivery choice
    AwaitingDeliveryMethod {
        name: String,
        phone: String,
        language_code: Option<String>,
    },
    /// Onboarding: delivery chosen, waiting for the address
    AwaitingDeliveryAddress {
        name: String,
        phone: String,
        language_code: Option<String>,
    },
    /// Checkout: delivery chosen, waiting for a fresh address
    AwaitingCheckoutAddress {
        language_code: Option<String>,
    },
}

/// Type alias for our order dialogue
pub type OrderDialogue = Dialogue<OrderDialogueState, InMemStorage<OrderDialogueState>>;
