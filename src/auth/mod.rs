//! Authentication Subsystem
//! Mission: OTP login lifecycle, session tokens, and role-scoped guards

pub mod guard;
pub mod otp;
pub mod token;

pub use guard::{citizen_guard, official_guard};
pub use otp::{OtpManager, Session};
pub use token::{Claims, TokenService};
