use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::{FieldErrors, STATUS_DRAFT, STATUS_VALUES};

pub const TABLE: &str = "cultural_sites";

pub const COLUMNS: &[&str] = &[
    "id",
    "name",
    "description",
    "category",
    "location",
    "local_government",
    "state",
    "status",
    "is_featured",
    "image_url",
    "cultural_significance",
    "best_time_to_visit",
    "entry_fee",
    "opening_hours",
    "contact_info",
    "created_by",
    "created_at",
    "updated_at",
];

pub const SEARCH_COLUMNS: &[&str] = &["name", "description", "location"];

const NAME_MAX: usize = 200;
const CATEGORY_MAX: usize = 100;

#[derive(Debug, Deserialize)]
pub struct SiteCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub local_government: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub cultural_significance: Option<String>,
    #[serde(default)]
    pub best_time_to_visit: Option<String>,
    #[serde(default)]
    pub entry_fee: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<Value>,
    #[serde(default)]
    pub contact_info: Option<Value>,
}

impl SiteCreate {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("name", Some(&self.name));
        errors.max_len("name", Some(&self.name), NAME_MAX);
        errors.require("description", self.description.as_deref());
        errors.require("category", self.category.as_deref());
        errors.max_len("category", self.category.as_deref(), CATEGORY_MAX);
        errors.require("location", self.location.as_deref());
        errors.require("state", self.state.as_deref());
        errors.one_of("status", self.status.as_deref(), STATUS_VALUES);
        errors.into_result()
    }

    pub fn into_row(self, created_by: Uuid) -> Value {
        let now = Utc::now();
        json!({
            "name": self.name,
            "description": self.description.unwrap_or_default(),
            "category": self.category,
            "location": self.location,
            "local_government": self.local_government,
            "state": self.state,
            "status": self.status.unwrap_or_else(|| STATUS_DRAFT.to_string()),
            "is_featured": self.is_featured.unwrap_or(false),
            "image_url": self.image_url,
            "cultural_significance": self.cultural_significance,
            "best_time_to_visit": self.best_time_to_visit,
            "entry_fee": self.entry_fee,
            "opening_hours": self.opening_hours,
            "contact_info": self.contact_info,
            "created_by": created_by,
            "created_at": now,
            "updated_at": now,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SitePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub local_government: Option<String>,
    pub state: Option<String>,
    pub status: Option<String>,
    pub is_featured: Option<bool>,
    pub image_url: Option<String>,
    pub cultural_significance: Option<String>,
    pub best_time_to_visit: Option<String>,
    pub entry_fee: Option<String>,
    pub opening_hours: Option<Value>,
    pub contact_info: Option<Value>,
}

impl SitePatch {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.require("name", Some(name));
            errors.max_len("name", Some(name), NAME_MAX);
        }
        errors.max_len("category", self.category.as_deref(), CATEGORY_MAX);
        errors.one_of("status", self.status.as_deref(), STATUS_VALUES);
        errors.into_result()
    }

    pub fn into_row(self) -> Value {
        let mut row = Map::new();
        macro_rules! put {
            ($field:ident) => {
                if let Some(v) = self.$field {
                    row.insert(stringify!($field).into(), json!(v));
                }
            };
        }
        put!(name);
        put!(description);
        put!(category);
        put!(location);
        put!(local_government);
        put!(state);
        put!(status);
        put!(is_featured);
        put!(image_url);
        put!(cultural_significance);
        put!(best_time_to_visit);
        put!(entry_fee);
        put!(opening_hours);
        put!(contact_info);
        row.insert("updated_at".into(), json!(Utc::now()));
        Value::Object(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_reports_every_missing_field() {
        let payload = SiteCreate {
            name: String::new(),
            description: None,
            category: None,
            location: None,
            local_government: None,
            state: None,
            status: Some("published".to_string()),
            is_featured: None,
            image_url: None,
            cultural_significance: None,
            best_time_to_visit: None,
            entry_fee: None,
            opening_hours: None,
            contact_info: None,
        };
        let errors = payload.validate().unwrap_err().into_map();
        for field in ["name", "description", "category", "location", "state"] {
            assert!(errors.contains_key(field), "missing error for {}", field);
        }
    }

    #[test]
    fn create_row_records_owner() {
        let owner = Uuid::new_v4();
        let payload = SiteCreate {
            name: "Yankari Game Reserve".to_string(),
            description: Some("Wildlife reserve with warm springs".to_string()),
            category: Some("nature".to_string()),
            location: Some("Alkaleri".to_string()),
            local_government: Some("Alkaleri".to_string()),
            state: Some("Bauchi".to_string()),
            status: None,
            is_featured: Some(true),
            image_url: None,
            cultural_significance: None,
            best_time_to_visit: None,
            entry_fee: None,
            opening_hours: None,
            contact_info: None,
        };
        let row = payload.into_row(owner);
        assert_eq!(row["created_by"], json!(owner));
        assert_eq!(row["status"], "draft");
    }
}
