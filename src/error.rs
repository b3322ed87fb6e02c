use std::{error::Error, fmt::Debug};

#[derive(thiserror::Error)]
pub enum CustomError {
    #[error("ENV '{0}' Not Found")]
    EnvError(String, #[source] std::env::VarError),

    #[error("Error encode token")]
    EncodeError(#[source] jsonwebtoken::errors::Error),

    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("User not found")]
    UserNotFound,

    #[error("Admin not found")]
    AdminNotFound,

    #[error("Email or username already exists")]
    EmailExists,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Insufficient capital")]
    InsufficientCapital,

    #[error("Unsupported percent '{0}'")]
    UnsupportedPercent(String),

    #[error("Invalid body")]
    InvalidBody(#[source] serde_json::Error),

    #[error("Database query")]
    DBError(#[source] sqlx::Error),
}

impl Debug for CustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        if let Some(source) = self.source() {
            write!(f, " (Caused by: {})", source)?;
        }
        Ok(())
    }
}

impl From<sqlx::Error> for CustomError {
    fn from(err: sqlx::Error) -> Self {
        CustomError::DBError(err)
    }
}
