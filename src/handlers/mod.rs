// Handler tiers: public (anonymous gateway, degrade-to-empty) and admin
// (behind the admin gate, elevated gateway).
pub mod admin;
pub mod auth;
pub mod public;

use serde::Deserialize;

use crate::gateway::SelectQuery;

/// Common listing filters shared by every resource listing. Fields that do
/// not exist on a given resource are simply not applied there.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub state: Option<String>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

impl ListQuery {
    /// Apply an equality filter when the parameter is present and non-empty.
    pub(crate) fn apply_eq(
        query: SelectQuery,
        column: &str,
        value: Option<&String>,
    ) -> SelectQuery {
        match value {
            Some(v) if !v.trim().is_empty() => query.eq(column, v.trim()),
            _ => query,
        }
    }

    pub(crate) fn apply_search(
        &self,
        query: SelectQuery,
        search_columns: &[&str],
    ) -> SelectQuery {
        match &self.search {
            Some(needle) if !needle.trim().is_empty() => {
                query.search(search_columns.iter().copied(), needle.trim())
            }
            _ => query,
        }
    }

    pub(crate) fn apply_featured(&self, query: SelectQuery) -> SelectQuery {
        match self.featured {
            Some(featured) => query.eq("is_featured", featured.to_string()),
            None => query,
        }
    }
}
