//! Projection negotiation for schema drift.
//!
//! Handlers and the live backend schema can drift independently: a handler
//! may project a column the deployed schema no longer has. The backend
//! reports this per-column, so list queries retry with the offending column
//! removed until the query succeeds or the projection is exhausted. The
//! reduction step is a pure function so the loop bound is testable.

/// Extract the missing column name from a backend drift message such as
/// `column stories.reading_time does not exist` or
/// `column "reading_time" does not exist`.
pub fn missing_column_from_message(message: &str) -> Option<String> {
    let rest = message.strip_prefix("column ")?;
    let name_part = rest.split(" does not exist").next()?.trim();
    let name = name_part.trim_matches('"');
    // Qualified names arrive as table.column
    let column = name.rsplit('.').next()?.trim_matches('"');
    if column.is_empty() {
        None
    } else {
        Some(column.to_string())
    }
}

/// Remove `missing` from the projection. Returns `None` when the column was
/// not part of the projection (retrying would loop forever) or when removal
/// would leave nothing to select.
pub fn reduce_projection(columns: &[String], missing: &str) -> Option<Vec<String>> {
    if !columns.iter().any(|c| c == missing) {
        return None;
    }
    let reduced: Vec<String> = columns.iter().filter(|c| *c != missing).cloned().collect();
    if reduced.is_empty() {
        None
    } else {
        Some(reduced)
    }
}
