use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{slugify, FieldErrors};

pub const TABLE: &str = "stories";

pub const COLUMNS: &[&str] = &[
    "id",
    "title",
    "slug",
    "summary",
    "body",
    "cover_image",
    "images",
    "published",
    "category",
    "tags",
    "views_count",
    "created_at",
    "updated_at",
];

/// Text columns searched by the public listing's `search` parameter.
pub const SEARCH_COLUMNS: &[&str] = &["title", "summary"];

const TITLE_MAX: usize = 200;
const SUMMARY_MAX: usize = 500;
const CATEGORY_MAX: usize = 100;

#[derive(Debug, Deserialize)]
pub struct StoryCreate {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Accepted on the wire but ignored: admin-created stories go live
    /// immediately.
    #[serde(default)]
    pub published: Option<bool>,
}

impl StoryCreate {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("title", Some(&self.title));
        errors.max_len("title", Some(&self.title), TITLE_MAX);
        errors.require("body", self.body.as_deref());
        errors.max_len("summary", self.summary.as_deref(), SUMMARY_MAX);
        errors.max_len("category", self.category.as_deref(), CATEGORY_MAX);
        errors.into_result()
    }

    /// Build the insert row. Admin-created stories are published on creation
    /// regardless of the client-supplied flag, start at zero views, and get
    /// a slug derived from the title.
    pub fn into_row(self) -> Value {
        let now = Utc::now();
        json!({
            "title": self.title,
            "slug": slugify(&self.title),
            "summary": self.summary.unwrap_or_default(),
            "body": self.body.unwrap_or_default(),
            "cover_image": self.cover_image,
            "images": self.images.unwrap_or_default(),
            "published": true,
            "category": self.category,
            "tags": self.tags.unwrap_or_default(),
            "views_count": 0,
            "created_at": now,
            "updated_at": now,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StoryPatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub cover_image: Option<String>,
    pub images: Option<Vec<String>>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

impl StoryPatch {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            errors.require("title", Some(title));
            errors.max_len("title", Some(title), TITLE_MAX);
        }
        errors.max_len("summary", self.summary.as_deref(), SUMMARY_MAX);
        errors.max_len("category", self.category.as_deref(), CATEGORY_MAX);
        errors.into_result()
    }

    /// Build a partial update containing only the supplied fields. A new
    /// title re-derives the slug so the two never diverge.
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
        if let Some(images) = self.images {
            row.insert("images".into(), json!(images));
        }
        if let Some(category) = self.category {
            row.insert("category".into(), json!(category));
        }
        if let Some(tags) = self.tags {
            row.insert("tags".into(), json!(tags));
        }
        if let Some(published) = self.published {
            row.insert("published".into(), json!(published));
        }
        row.insert("updated_at".into(), json!(Utc::now()));
        Value::Object(row)
    }
}
