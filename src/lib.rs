//! AquaWatch backend library
//!
//! Water-quality surveillance and outbreak reporting platform: citizen OTP
//! login, government official accounts, water measurements, symptom reports,
//! alerts and daily tips. Exposed as a library so the server binary, the
//! seed tool, and the integration tests share one implementation.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod sms;
pub mod store;
