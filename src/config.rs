use std::env;

use dotenvy::dotenv;

use crate::error::CustomError;

pub const DEFAULT_JWT_SECRET: &str = "secret1258";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7879";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
}

impl Config {
    /// Loads `.env` (if any) and reads the process environment once.
    pub fn from_env() -> Result<Self, CustomError> {
        dotenv().ok();

        let database_url = env::var("ATLAS_URI")
            .map_err(|e| CustomError::EnvError("ATLAS_URI".to_string(), e))?;
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not set, falling back to the built-in secret");
            DEFAULT_JWT_SECRET.to_string()
        });
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Ok(Config {
            database_url,
            jwt_secret,
            bind_addr,
        })
    }

    pub fn new(database_url: &str, jwt_secret: &str) -> Self {
        Config {
            database_url: database_url.to_string(),
            jwt_secret: jwt_secret.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}
