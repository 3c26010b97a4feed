use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{slugify, FieldErrors};

pub const TABLE: &str = "pages";

pub const COLUMNS: &[&str] = &[
    "id",
    "title",
    "slug",
    "summary",
    "body",
    "published",
    "cover_image",
    "created_at",
    "updated_at",
];

pub const SEARCH_COLUMNS: &[&str] = &["title", "summary"];

const TITLE_MAX: usize = 200;
const SUMMARY_MAX: usize = 500;

/// Structurally a Story minus tags/category. Pages honor the supplied
/// `published` flag (only admin-created stories force-publish).
#[derive(Debug, Deserialize)]
pub struct PageCreate {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
}

impl PageCreate {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("title", Some(&self.title));
        errors.max_len("title", Some(&self.title), TITLE_MAX);
        errors.require("body", self.body.as_deref());
        errors.max_len("summary", self.summary.as_deref(), SUMMARY_MAX);
        errors.into_result()
    }

    pub fn into_row(self) -> Value {
        let now = Utc::now();
        json!({
            "title": self.title,
            "slug": slugify(&self.title),
            "summary": self.summary.unwrap_or_default(),
            "body": self.body.unwrap_or_default(),
            "cover_image": self.cover_image,
            "published": self.published.unwrap_or(false),
            "created_at": now,
            "updated_at": now,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PagePatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub cover_image: Option<String>,
    pub published: Option<bool>,
}

impl PagePatch {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            errors.require("title", Some(title));
            errors.max_len("title", Some(title), TITLE_MAX);
        }
        errors.max_len("summary", self.summary.as_deref(), SUMMARY_MAX);
        errors.into_result()
    }

    pub fn into_row(self) -> Value {
        let mut row = Map::new();
        if let Some(title) = self.title {
            row.insert("slug".into(), json!(slugify(&title)));
            row.insert("title".into(), json!(title));
        }
        if let Some(summary) = self.summary {
            row.insert("summary".into(), json!(summary));
        }
        if let Some(body) = self.body {
            row.insert("body".into(), json!(body));
        }
        if let Some(cover_image) = self.cover_image {
            row.insert("cover_image".into(), json!(cover_image));
        }
        if let Some(published) = self.published {
            row.insert("published".into(), json!(published));
        }
        row.insert("updated_at".into(), json!(Utc::now()));
        Value::Object(row)
    }
}
