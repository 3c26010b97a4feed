//! Typed builder for backend list queries, rendered to PostgREST-style
//! query parameters. Mirrors the call shapes the handlers need: equality
//! filters, a case-insensitive substring OR-search across named text
//! columns, ordering, and an explicit projection.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub columns: Vec<String>,
    pub eq: Vec<(String, String)>,
    /// `(columns, needle)` - rows match when any column contains the needle
    /// case-insensitively.
    pub search: Option<(Vec<String>, String)>,
    pub order: Option<(String, Order)>,
    pub limit: Option<u32>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.eq.push((column.into(), value.into()));
        self
    }

    pub fn search<I, S>(mut self, columns: I, needle: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search = Some((
            columns.into_iter().map(Into::into).collect(),
            needle.into(),
        ));
        self
    }

    pub fn order(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order = Some((column.into(), order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render to query parameters for the backend REST endpoint.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if !self.columns.is_empty() {
            params.push(("select".to_string(), self.columns.join(",")));
        }
        for (column, value) in &self.eq {
            params.push((column.clone(), format!("eq.{}", value)));
        }
        if let Some((columns, needle)) = &self.search {
            let needle = sanitize_needle(needle);
            if !needle.is_empty() && !columns.is_empty() {
                let clauses: Vec<String> = columns
                    .iter()
                    .map(|c| format!("{}.ilike.*{}*", c, needle))
                    .collect();
                params.push(("or".to_string(), format!("({})", clauses.join(","))));
            }
        }
        if let Some((column, order)) = &self.order {
            let dir = match order {
                Order::Asc => "asc",
                Order::Desc => "desc",
            };
            params.push(("order".to_string(), format!("{}.{}", column, dir)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }
}

/// Strip characters that are structural in the backend's filter grammar so a
/// search term cannot smuggle extra clauses into the `or=` parameter.
fn sanitize_needle(needle: &str) -> String {
    needle
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | ',' | '*' | '.' | '"'))
        .collect::<String>()
        .trim()
        .to_string()
}
