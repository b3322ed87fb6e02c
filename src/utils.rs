use chrono::{DateTime, Local, TimeZone};
use rand::RngCore;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

use crate::constants::{INTERNAL_ERROR, TOKEN_HEADER};
use crate::error::CustomError;

pub fn des_from_str<T: for<'a> Deserialize<'a>>(string: &str) -> Result<T, CustomError> {
    serde_json::from_str(string).map_err(CustomError::InvalidBody)
}

pub fn ser_to_str<T: Serialize>(t: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(t)
}

/// Pairs a status line with the serialized body.
pub fn respond<T: Serialize>(status_line: &str, body: &T) -> (String, String) {
    match ser_to_str(body) {
        Ok(json) => (status_line.to_string(), json),
        Err(e) => {
            log::error!("serde error: {}", e);
            (INTERNAL_ERROR.to_string(), "".to_string())
        }
    }
}

/// `bytes` random bytes rendered as lowercase hex.
pub fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    buf.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Human readable timestamp stored on list entries, e.g. `3/7/2025, 4:05:09 PM`.
pub fn locale_string<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

pub fn now_local() -> DateTime<Local> {
    Local::now()
}

pub fn extract_token(headers: &HashMap<String, String>) -> Option<String> {
    headers
        .get(TOKEN_HEADER)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn serialize_flag<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bool(*value != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn random_hex_has_two_chars_per_byte() {
        let hex = random_hex(32);
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hex, random_hex(32));
    }

    #[test]
    fn locale_string_matches_en_us_layout() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 16, 5, 9).unwrap();
        assert_eq!(locale_string(&at), "3/7/2025, 4:05:09 PM");
    }

    #[test]
    fn blank_token_is_ignored() {
        let mut headers = HashMap::new();
        headers.insert(TOKEN_HEADER.to_string(), "  ".to_string());
        assert_eq!(extract_token(&headers), None);
    }
}
