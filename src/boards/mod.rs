mod headhunter;
mod superjob;

pub use headhunter::HhFamilyBoard;
pub use superjob::SuperJobBoard;

use crate::models::ContactInfo;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Country every board is narrowed to.
pub const HOME_COUNTRY: &str = "Россия";

/// Ids arrive as strings or numbers depending on board and endpoint.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_text(&value).ok_or_else(|| serde::de::Error::custom(format!("invalid id: {}", value)))
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Reads `fio`, `email` and the first of `phones.phones` from a contact object.
fn contact_from_json(value: &Value) -> ContactInfo {
    let phone = value
        .pointer("/phones/phones/0")
        .and_then(|phone| {
            let country = phone.get("country").and_then(id_text)?;
            let city = phone.get("city").and_then(id_text)?;
            let number = phone.get("number").and_then(id_text)?;
            Some(format!("+{}{}{}", country, city, number))
        });

    ContactInfo {
        full_name: non_empty(value.get("fio")),
        email: non_empty(value.get("email")),
        phone,
    }
}
