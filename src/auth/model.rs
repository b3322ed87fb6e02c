use serde::{Deserialize, Serialize};

/// Payload of every issued token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub rememberme: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub referral_link: Option<String>,
}

impl RegisterRequest {
    /// The referrer's username; an empty link counts as none.
    pub fn upline(&self) -> Option<String> {
        self.referral_link
            .as_deref()
            .filter(|link| !link.is_empty())
            .map(str::to_string)
    }
}
