//! OTP Delivery
//! Mission: hand freshly issued codes to an SMS gateway

use tracing::info;

/// Outbound code delivery seam. The platform only guarantees the code is
/// durably stored before this runs; delivery itself is fire-and-forget.
pub trait SmsNotifier: Send + Sync {
    fn send_otp(&self, phone: &str, code: &str);
}

/// Development notifier: writes the code to the log instead of texting it.
/// Stands in for a real gateway integration.
#[derive(Debug, Default)]
pub struct LogSmsNotifier;

impl SmsNotifier for LogSmsNotifier {
    fn send_otp(&self, phone: &str, code: &str) {
        info!("📨 OTP for {}: {}", phone, code);
    }
}
