pub mod listing;
pub mod member;
pub mod service;

use serde::{Deserialize, Deserializer};

/// The device emits numeric identifiers and ports as either JSON strings or
/// numbers depending on firmware build; normalize everything to a string at
/// the serde boundary.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}
