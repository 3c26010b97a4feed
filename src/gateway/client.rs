use reqwest::Method;
use serde_json::Value;

use super::error::GatewayError;

/// Thin HTTP client for the hosted backend's REST data endpoint.
///
/// Both credential tiers share this call shape; only the key differs. The
/// backend enforces row-level security for the anonymous key and bypasses it
/// for the service key, so no policy logic lives here.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn send(
        &self,
        method: Method,
        table: &str,
        params: &[(String, String)],
        body: Option<&Value>,
        prefer: Option<&str>,
    ) -> Result<Value, GatewayError> {
        let mut request = self
            .http
            .request(method, self.endpoint(table))
            .query(params)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key));

        if let Some(prefer) = prefer {
            request = request.header("Prefer", prefer);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(GatewayError::from_backend_body(status.as_u16(), &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Array(vec![]));
        }
        serde_json::from_str(&text).map_err(|e| {
            GatewayError::Transport(format!("backend returned non-JSON body: {}", e))
        })
    }

    pub async fn select(
        &self,
        table: &str,
        params: &[(String, String)],
    ) -> Result<Vec<Value>, GatewayError> {
        let value = self.send(Method::GET, table, params, None, None).await?;
        Ok(as_rows(value))
    }

    pub async fn insert(&self, table: &str, row: &Value) -> Result<Value, GatewayError> {
        let value = self
            .send(
                Method::POST,
                table,
                &[],
                Some(row),
                Some("return=representation"),
            )
            .await?;
        first_row(value).ok_or_else(|| GatewayError::Backend {
            status: 500,
            message: "insert returned no representation".to_string(),
        })
    }

    pub async fn update(
        &self,
        table: &str,
        id: &str,
        patch: &Value,
    ) -> Result<Option<Value>, GatewayError> {
        let params = vec![("id".to_string(), format!("eq.{}", id))];
        let value = self
            .send(
                Method::PATCH,
                table,
                &params,
                Some(patch),
                Some("return=representation"),
            )
            .await?;
        Ok(first_row(value))
    }

    pub async fn delete(&self, table: &str, id: &str) -> Result<u64, GatewayError> {
        let params = vec![("id".to_string(), format!("eq.{}", id))];
        let value = self
            .send(
                Method::DELETE,
                table,
                &params,
                None,
                Some("return=representation"),
            )
            .await?;
        Ok(as_rows(value).len() as u64)
    }

    pub async fn upsert_on(
        &self,
        table: &str,
        conflict_column: &str,
        row: &Value,
    ) -> Result<Value, GatewayError> {
        let params = vec![("on_conflict".to_string(), conflict_column.to_string())];
        let value = self
            .send(
                Method::POST,
                table,
                &params,
                Some(row),
                Some("resolution=merge-duplicates,return=representation"),
            )
            .await?;
        first_row(value).ok_or_else(|| GatewayError::Backend {
            status: 500,
            message: "upsert returned no representation".to_string(),
        })
    }
}

fn as_rows(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Null => vec![],
        other => vec![other],
    }
}

fn first_row(value: Value) -> Option<Value> {
    as_rows(value).into_iter().next()
}
