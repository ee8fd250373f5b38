//! Serde adapters writing `U256` values as base-10 digit strings.
//!
//! Use with `#[serde(with = "amm_sandbox_domain::serde_dec")]`.

use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
    let text = String::deserialize(deserializer)?;
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(serde::de::Error::custom(format!("invalid unsigned integer: {text:?}")));
    }
    U256::from_dec_str(trimmed)
        .map_err(|_| serde::de::Error::custom(format!("unsigned integer out of range: {text:?}")))
}
