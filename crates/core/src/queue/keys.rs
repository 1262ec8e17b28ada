/// Topic carrying one message per created client.
pub const WELCOME_EMAIL_TOPIC: &str = "clients-email-queue";
