//! The `hero_images` settings singleton: one keyed row whose value is an
//! ordered list of homepage banner entries. The invariant is "always an
//! array" - absence, null, or a malformed value all read as empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::FieldErrors;

pub const TABLE: &str = "site_settings";
pub const KEY_COLUMN: &str = "key";
pub const HERO_KEY: &str = "hero_images";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Decode the singleton row's `value` into the hero list. Tolerates the
/// value arriving as a native array or a JSON-encoded string; anything else
/// is empty.
pub fn hero_from_value(value: Option<&Value>) -> Vec<HeroImage> {
    let array = match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items,
            _ => return vec![],
        },
        _ => return vec![],
    };

    array
        .into_iter()
        .filter_map(|item| serde_json::from_value::<HeroImage>(item).ok())
        .filter(|hero| !hero.url.trim().is_empty())
        .collect()
}

/// Validate an incoming hero list before it is persisted.
pub fn validate_hero_list(items: &[HeroImage]) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for (index, item) in items.iter().enumerate() {
        if item.url.trim().is_empty() {
            errors.push(format!("hero[{}].url", index), "This field is required");
        }
    }
    errors.into_result()
}
