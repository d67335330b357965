//! Telegram WebApp init-data verification.
//!
//! A mini-app hands the server the signed `initData` query string it
//! received from Telegram. Verification follows the documented scheme:
//! build the data-check string from the percent-decoded pairs (minus
//! `hash`) sorted by key, derive the secret key as
//! HMAC-SHA256("WebAppData", bot_token), and compare the hex signature in
//! constant time.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// The `user` payload embedded in init data.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
}

/// Successfully verified init data.
#[derive(Debug, Clone)]
pub struct InitData {
    pub user: Option<TelegramUser>,
    pub auth_date: Option<DateTime<Utc>>,
    pub query_id: Option<String>,
}

/// Verify `init_data` against `bot_token`.
///
/// `max_age_secs` bounds how old the payload's `auth_date` may be; 0
/// disables the freshness check.
pub fn validate_init_data(init_data: &str, bot_token: &str, max_age_secs: u64) -> Result<InitData> {
    validate_init_data_at(init_data, bot_token, max_age_secs, Utc::now())
}

/// Verification with an explicit clock, for deterministic tests.
pub fn validate_init_data_at(
    init_data: &str,
    bot_token: &str,
    max_age_secs: u64,
    now: DateTime<Utc>,
) -> Result<InitData> {
    let mut fields: BTreeMap<String, String> = BTreeMap::new();
    let mut provided_hash: Option<String> = None;

    for (key, value) in url::form_urlencoded::parse(init_data.as_bytes()) {
        if key == "hash" {
            provided_hash = Some(value.into_owned());
        } else {
            fields.insert(key.into_owned(), value.into_owned());
        }
    }

    let provided_hash = provided_hash
        .ok_or_else(|| Error::Forbidden("Init data is missing its hash".to_string()))?;
    let provided_hash = hex::decode(provided_hash.to_lowercase())
        .map_err(|_| Error::Forbidden("Invalid Telegram data".to_string()))?;

    // BTreeMap iteration is already key-sorted.
    let data_check_string = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n");

    let mut secret = HmacSha256::new_from_slice(b"WebAppData")
        .map_err(|e| Error::Internal(e.to_string()))?;
    secret.update(bot_token.as_bytes());
    let secret = secret.finalize().into_bytes();

    let mut mac =
        HmacSha256::new_from_slice(&secret).map_err(|e| Error::Internal(e.to_string()))?;
    mac.update(data_check_string.as_bytes());
    mac.verify_slice(&provided_hash)
        .map_err(|_| Error::Forbidden("Invalid Telegram data".to_string()))?;

    let auth_date = fields
        .get("auth_date")
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single());

    if max_age_secs > 0 {
        let fresh = auth_date.is_some_and(|ts| {
            let age = now.signed_duration_since(ts).num_seconds();
            (0..=max_age_secs as i64).contains(&age)
        });
        if !fresh {
            return Err(Error::Forbidden("Init data has expired".to_string()));
        }
    }

    let user = match fields.get("user") {
        Some(raw) => Some(
            serde_json::from_str(raw)
                .map_err(|_| Error::Forbidden("Invalid Telegram user payload".to_string()))?,
        ),
        None => None,
    };

    Ok(InitData {
        user,
        auth_date,
        query_id: fields.get("query_id").cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_TOKEN: &str = "7000000000:AAFakeBotTokenForSigningTests";

    /// Build a correctly signed init-data string, the way Telegram would.
    fn sign_init_data(fields: &[(&str, &str)], bot_token: &str) -> String {
        let mut sorted: Vec<_> = fields.to_vec();
        sorted.sort_by_key(|(k, _)| *k);
        let data_check_string = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("\n");

        let mut secret = HmacSha256::new_from_slice(b"WebAppData").unwrap();
        secret.update(bot_token.as_bytes());
        let secret = secret.finalize().into_bytes();

        let mut mac = HmacSha256::new_from_slice(&secret).unwrap();
        mac.update(data_check_string.as_bytes());
        let hash = hex::encode(mac.finalize().into_bytes());

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in fields {
            serializer.append_pair(k, v);
        }
        serializer.append_pair("hash", &hash);
        serializer.finish()
    }

    fn sample_fields(auth_date: i64) -> Vec<(&'static str, String)> {
        vec![
            ("auth_date", auth_date.to_string()),
            ("query_id", "AAH0-test".to_string()),
            (
                "user",
                r#"{"id":123456789,"first_name":"Pepe","username":"pepe_the_frog","is_premium":true}"#
                    .to_string(),
            ),
        ]
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_600, 0).unwrap()
    }

    #[test]
    fn test_valid_signature_accepted() {
        let fields = sample_fields(1_700_000_000);
        let borrowed: Vec<(&str, &str)> =
            fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let init_data = sign_init_data(&borrowed, BOT_TOKEN);

        let data = validate_init_data_at(&init_data, BOT_TOKEN, 86400, now()).unwrap();
        let user = data.user.unwrap();
        assert_eq!(user.id, 123456789);
        assert_eq!(user.username.as_deref(), Some("pepe_the_frog"));
        assert!(user.is_premium);
        assert_eq!(data.query_id.as_deref(), Some("AAH0-test"));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let fields = sample_fields(1_700_000_000);
        let borrowed: Vec<(&str, &str)> =
            fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let init_data = sign_init_data(&borrowed, BOT_TOKEN);

        // Swap the user id after signing.
        let tampered = init_data.replace("123456789", "987654321");
        let result = validate_init_data_at(&tampered, BOT_TOKEN, 86400, now());
        assert!(matches!(result, Err(Error::Forbidden(_))));
    }

    #[test]
    fn test_wrong_bot_token_rejected() {
        let fields = sample_fields(1_700_000_000);
        let borrowed: Vec<(&str, &str)> =
            fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let init_data = sign_init_data(&borrowed, "1:other-bot");

        let result = validate_init_data_at(&init_data, BOT_TOKEN, 86400, now());
        assert!(matches!(result, Err(Error::Forbidden(_))));
    }

    #[test]
    fn test_missing_hash_rejected() {
        let result = validate_init_data_at("user=%7B%22id%22%3A1%7D", BOT_TOKEN, 0, now());
        assert!(matches!(result, Err(Error::Forbidden(_))));
    }

    #[test]
    fn test_stale_auth_date_rejected() {
        let fields = sample_fields(1_600_000_000);
        let borrowed: Vec<(&str, &str)> =
            fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let init_data = sign_init_data(&borrowed, BOT_TOKEN);

        let result = validate_init_data_at(&init_data, BOT_TOKEN, 86400, now());
        assert!(matches!(result, Err(Error::Forbidden(_))));

        // With the freshness check disabled the same payload verifies.
        assert!(validate_init_data_at(&init_data, BOT_TOKEN, 0, now()).is_ok());
    }

    #[test]
    fn test_payload_without_user_verifies() {
        let init_data = sign_init_data(&[("auth_date", "1700000000")], BOT_TOKEN);
        let data = validate_init_data_at(&init_data, BOT_TOKEN, 86400, now()).unwrap();
        assert!(data.user.is_none());
    }
}
