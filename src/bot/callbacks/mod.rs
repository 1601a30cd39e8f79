//! Callbacks module for handling all inline keyboard callback queries
//!
//! This module is organized into submodules for different types of callbacks:
//! - `callback_handler`: Main routing handler for all callback queries
//! - `callback_types`: Shared context struct for callback handlers
//! - `menu_callbacks`: Language selection, menu navigation and add-to-cart
//! - `cart_callbacks`: Cart view, quantity adjustments and checkout
//! - `order_callbacks`: Order confirmation and admin-side handling

pub mod callback_handler;
pub mod callback_types;
pub mod cart_callbacks;
pub mod menu_callbacks;
pub mod order_callbacks;
