//! # Samna Salta Telegram Bot
//!
//! A Telegram storefront for traditional Yemenite food: customers browse the
//! menu, build a cart, and place pickup or delivery orders in English or
//! Hebrew.

pub mod bot;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod errors;
pub mod formatting;
pub mod localization;
pub mod validation;

// Re-export types for easier access
pub use config::AppConfig;
pub use errors::{AppError, AppResult};
