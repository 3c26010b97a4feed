use thiserror::Error;

/// Errors surfaced by the data access gateway.
///
/// Backend error bodies are parsed into typed variants where the handler
/// layer needs to react to them (missing columns drive projection
/// negotiation, RLS denials get operator-facing guidance); everything else
/// stays a generic backend or transport failure.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("backend schema is missing column '{column}'")]
    MissingColumn { column: String },

    #[error("row-level security rejected the operation: {0}")]
    RowLevelSecurity(String),

    #[error("projection negotiation exhausted for table '{table}'")]
    SchemaDrift { table: String },

    #[error("{0}")]
    MissingCredential(String),

    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },
}

impl GatewayError {
    /// Classify a PostgREST-style error body.
    ///
    /// Relevant shapes:
    ///   `{"code":"42703","message":"column stories.reading_time does not exist"}`
    ///   `{"code":"42501","message":"new row violates row-level security policy ..."}`
    pub fn from_backend_body(status: u16, body: &str) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let code = parsed
            .as_ref()
            .and_then(|v| v.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let message = parsed
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();

        if code == "42703" {
            if let Some(column) = super::projection::missing_column_from_message(&message) {
                return GatewayError::MissingColumn { column };
            }
        }
        if code == "42501" || message.contains("row-level security") {
            return GatewayError::RowLevelSecurity(message);
        }

        GatewayError::Backend { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_body_is_typed() {
        let body = r#"{"code":"42703","message":"column stories.reading_time does not exist"}"#;
        match GatewayError::from_backend_body(400, body) {
            GatewayError::MissingColumn { column } => assert_eq!(column, "reading_time"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn rls_body_is_typed() {
        let body =
            r#"{"code":"42501","message":"new row violates row-level security policy for table \"stories\""}"#;
        assert!(matches!(
            GatewayError::from_backend_body(403, body),
            GatewayError::RowLevelSecurity(_)
        ));
    }

    #[test]
    fn unknown_body_stays_generic() {
        let err = GatewayError::from_backend_body(500, "boom");
        assert!(matches!(err, GatewayError::Backend { status: 500, .. }));
    }
}
