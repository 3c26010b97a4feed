//! Image-field normalization for rows coming back from the backend.
//!
//! The stored `images` column has accumulated several shapes over time: a
//! single URL string, a native JSON array, a JSON array encoded as a string,
//! or nothing at all. Both the public renderer and the admin UI consume the
//! single normalized form produced here; none of the variants ever raises an
//! error, malformed input degrades to whatever can be salvaged.

use serde_json::Value;

/// Normalize a raw `images` field into an ordered list of URL strings, with
/// the cover image as a fallback when the list comes out empty.
pub fn normalize_image_list(raw: Option<&Value>, cover_image: Option<&str>) -> Vec<String> {
    let mut urls = match raw {
        None | Some(Value::Null) => vec![],
        Some(Value::String(s)) => normalize_string_field(s),
        Some(Value::Array(items)) => collect_strings(items),
        Some(_) => vec![],
    };

    if urls.is_empty() {
        if let Some(cover) = cover_image {
            if !cover.trim().is_empty() {
                urls.push(cover.trim().to_string());
            }
        }
    }

    urls
}

fn normalize_string_field(s: &str) -> Vec<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return vec![];
    }
    // A JSON-encoded array stored as text
    if trimmed.starts_with('[') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
            return collect_strings(&items);
        }
        return vec![];
    }
    vec![trimmed.to_string()]
}

fn collect_strings(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve a bare storage-object path into a fully qualified public URL.
/// Already-absolute URLs pass through untouched.
pub fn resolve_public_url(raw: &str, backend_url: &str, bucket: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("data:") {
        return raw.to_string();
    }
    format!(
        "{}/storage/v1/object/public/{}/{}",
        backend_url.trim_end_matches('/'),
        bucket,
        raw.trim_start_matches('/')
    )
}

/// Rewrite a row's image fields in place: `images` becomes a resolved URL
/// array (with `cover_image` fallback) and single-URL fields are resolved.
pub fn normalize_row_images(row: &mut Value, backend_url: &str, bucket: &str) {
    let Some(obj) = row.as_object_mut() else {
        return;
    };

    let cover = obj
        .get("cover_image")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let images = normalize_image_list(obj.get("images"), cover.as_deref())
        .into_iter()
        .map(|u| resolve_public_url(&u, backend_url, bucket))
        .collect::<Vec<_>>();
    obj.insert("images".to_string(), Value::from(images));

    for field in ["cover_image", "image_url"] {
        if let Some(url) = obj.get(field).and_then(|v| v.as_str()) {
            if !url.trim().is_empty() {
                let resolved = resolve_public_url(url, backend_url, bucket);
                obj.insert(field.to_string(), Value::String(resolved));
            }
        }
    }
}
