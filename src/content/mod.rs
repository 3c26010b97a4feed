//! Content models for the publishing workflow: payload validation, slug
//! derivation, image normalization, and the hero-settings singleton.

pub mod event;
pub mod images;
pub mod page;
pub mod settings;
pub mod site;
pub mod story;

use std::collections::BTreeMap;

pub const SLUG_MAX_LEN: usize = 200;

/// Canonical publication states for resources that carry a `status` column.
/// The source data mixed "active"/"published" per call site; this server
/// treats "published" as the single live value.
pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PUBLISHED: &str = "published";
pub const STATUS_VALUES: &[&str] = &[STATUS_DRAFT, STATUS_PUBLISHED];

/// Accumulates per-field validation messages so a rejection lists every
/// violated field, not just the first.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field.into(), message.into());
    }

    pub fn require(&mut self, field: &str, value: Option<&str>) {
        match value {
            Some(v) if !v.trim().is_empty() => {}
            _ => self.push(field, "This field is required"),
        }
    }

    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(v) = value {
            if v.chars().count() > max {
                self.push(field, format!("Must be at most {} characters", max));
            }
        }
    }

    pub fn one_of(&mut self, field: &str, value: Option<&str>, allowed: &[&str]) {
        if let Some(v) = value {
            if !allowed.contains(&v) {
                self.push(field, format!("Must be one of: {}", allowed.join(", ")));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.errors
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Derive a URL-safe slug from a title: lowercase ASCII alphanumerics with
/// single-hyphen separators, capped at [`SLUG_MAX_LEN`]. Deterministic, so
/// the same title always yields the same slug.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true; // suppress leading hyphen

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug.truncate(SLUG_MAX_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
