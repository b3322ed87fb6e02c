use crate::auth::model::Claims;
use crate::error::CustomError;
use crate::utils::extract_token;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::collections::HashMap;

pub fn create_jwt(
    id: &str,
    email: &str,
    secret: &str,
    ttl: Duration,
) -> Result<String, CustomError> {
    let now = Utc::now();
    let expiration = (now + ttl).timestamp() as usize;

    let claims = Claims {
        id: id.to_string(),
        email: email.to_string(),
        iat: now.timestamp() as usize,
        exp: expiration,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(CustomError::EncodeError)
}

pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, CustomError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => CustomError::TokenExpired,
        _ => CustomError::InvalidToken(e),
    })
}

/// Reads `x-access-token` and verifies it.
pub fn authenticate(headers: &HashMap<String, String>, secret: &str) -> Result<Claims, CustomError> {
    let token = extract_token(headers).ok_or(CustomError::MissingToken)?;
    verify_jwt(&token, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_token_round_trips_claims() {
        let token = create_jwt("abc", "a@b.c", SECRET, Duration::hours(1)).unwrap();
        let claims = verify_jwt(&token, SECRET).unwrap();
        assert_eq!(claims.id, "abc");
        assert_eq!(claims.email, "a@b.c");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let token = create_jwt("abc", "a@b.c", SECRET, Duration::hours(-1)).unwrap();
        assert!(matches!(
            verify_jwt(&token, SECRET),
            Err(CustomError::TokenExpired)
        ));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = create_jwt("abc", "a@b.c", SECRET, Duration::hours(1)).unwrap();
        assert!(matches!(
            verify_jwt(&token, "other"),
            Err(CustomError::InvalidToken(_))
        ));
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(matches!(
            authenticate(&HashMap::new(), SECRET),
            Err(CustomError::MissingToken)
        ));
    }
}
