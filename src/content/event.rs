use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::{FieldErrors, STATUS_DRAFT, STATUS_VALUES};

pub const TABLE: &str = "events";

pub const COLUMNS: &[&str] = &[
    "id",
    "title",
    "description",
    "event_type",
    "location",
    "local_government",
    "state",
    "start_date",
    "end_date",
    "status",
    "is_featured",
    "registration_required",
    "max_participants",
    "current_participants",
    "registration_link",
    "image_url",
    "contact_info",
    "created_by",
    "created_at",
    "updated_at",
];

pub const SEARCH_COLUMNS: &[&str] = &["title", "description", "location"];

const TITLE_MAX: usize = 200;
const TYPE_MAX: usize = 100;

#[derive(Debug, Deserialize)]
pub struct EventCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub local_government: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub registration_required: Option<bool>,
    #[serde(default)]
    pub max_participants: Option<i64>,
    #[serde(default)]
    pub current_participants: Option<i64>,
    #[serde(default)]
    pub registration_link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub contact_info: Option<Value>,
}

impl EventCreate {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("title", Some(&self.title));
        errors.max_len("title", Some(&self.title), TITLE_MAX);
        errors.require("description", self.description.as_deref());
        errors.require("event_type", self.event_type.as_deref());
        errors.max_len("event_type", self.event_type.as_deref(), TYPE_MAX);
        errors.require("start_date", self.start_date.as_deref());
        errors.one_of("status", self.status.as_deref(), STATUS_VALUES);

        validate_date(&mut errors, "start_date", self.start_date.as_deref());
        validate_date(&mut errors, "end_date", self.end_date.as_deref());
        validate_participants(
            &mut errors,
            self.max_participants,
            self.current_participants,
        );

        errors.into_result()
    }

    pub fn into_row(self, created_by: Uuid) -> Value {
        let now = Utc::now();
        json!({
            "title": self.title,
            "description": self.description.unwrap_or_default(),
            "event_type": self.event_type,
            "location": self.location,
            "local_government": self.local_government,
            "state": self.state,
            "start_date": self.start_date,
            "end_date": self.end_date,
            "status": self.status.unwrap_or_else(|| STATUS_DRAFT.to_string()),
            "is_featured": self.is_featured.unwrap_or(false),
            "registration_required": self.registration_required.unwrap_or(false),
            "max_participants": self.max_participants,
            "current_participants": self.current_participants,
            "registration_link": self.registration_link,
            "image_url": self.image_url,
            "contact_info": self.contact_info,
            "created_by": created_by,
            "created_at": now,
            "updated_at": now,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<String>,
    pub location: Option<String>,
    pub local_government: Option<String>,
    pub state: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub is_featured: Option<bool>,
    pub registration_required: Option<bool>,
    pub max_participants: Option<i64>,
    pub current_participants: Option<i64>,
    pub registration_link: Option<String>,
    pub image_url: Option<String>,
    pub contact_info: Option<Value>,
}

impl EventPatch {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            errors.require("title", Some(title));
            errors.max_len("title", Some(title), TITLE_MAX);
        }
        errors.one_of("status", self.status.as_deref(), STATUS_VALUES);
        validate_date(&mut errors, "start_date", self.start_date.as_deref());
        validate_date(&mut errors, "end_date", self.end_date.as_deref());
        validate_participants(
            &mut errors,
            self.max_participants,
            self.current_participants,
        );
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
        put!(title);
        put!(description);
        put!(event_type);
        put!(location);
        put!(local_government);
        put!(state);
        put!(start_date);
        put!(end_date);
        put!(status);
        put!(is_featured);
        put!(registration_required);
        put!(max_participants);
        put!(current_participants);
        put!(registration_link);
        put!(image_url);
        put!(contact_info);
        row.insert("updated_at".into(), json!(Utc::now()));
        Value::Object(row)
    }
}

fn validate_date(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value {
        if v.trim().is_empty() {
            return;
        }
        let ok = DateTime::parse_from_rfc3339(v).is_ok()
            || NaiveDate::parse_from_str(v, "%Y-%m-%d").is_ok();
        if !ok {
            errors.push(field, "Must be an RFC 3339 timestamp or YYYY-MM-DD date");
        }
    }
}

fn validate_participants(errors: &mut FieldErrors, max: Option<i64>, current: Option<i64>) {
    if let Some(max) = max {
        if max < 0 {
            errors.push("max_participants", "Must be zero or greater");
        }
    }
    if let Some(current) = current {
        if current < 0 {
            errors.push("current_participants", "Must be zero or greater");
        }
    }
    if let (Some(max), Some(current)) = (max, current) {
        if current > max {
            errors.push(
                "current_participants",
                "Cannot exceed max_participants",
            );
        }
    }
}
