//! Authentication configuration.

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session lifetime in seconds (default: 604_800 = 7 days).
    pub session_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Minimum password length accepted at sign-up.
    pub min_password_length: usize,
    /// Name of the session cookie.
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_lifetime_secs: 604_800,
            pepper: None,
            min_password_length: 8,
            cookie_name: "homestay_session".into(),
        }
    }
}
