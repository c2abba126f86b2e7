//! HTTP request handlers.

pub mod auth_handler;
pub mod referral_handler;
