use uuid::Uuid;

/// Returns the cache key for a client looked up by id.
pub fn client_id_key(id: Uuid) -> String {
    format!("client:id:{}", id)
}

/// Returns the cache key for a client looked up by email.
pub fn client_email_key(email: &str) -> String {
    format!("client:email:{}", email)
}

/// Returns the cache key for a client looked up by phone.
pub fn client_phone_key(phone: &str) -> String {
    format!("client:phone:{}", phone)
}
