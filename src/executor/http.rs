//! GraphQL-over-HTTP executor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Executor;
use crate::config::Config;
use crate::error_handling::{ExecutionError, InitializationError};
use crate::initialization::init_client;

/// Maximum number of body characters kept in an HTTP status error.
const MAX_ERROR_BODY_CHARS: usize = 2000;

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: &'a Value,
}

#[derive(Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

/// Executes queries by POSTing them to a GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpExecutor {
    /// Wraps an already configured client.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        HttpExecutor {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Builds the client and executor described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, InitializationError> {
        config.validate()?;
        let client = init_client(config)?;
        Ok(Self::new(client, config.endpoint.clone()))
    }

    /// URL queries are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    async fn execute(&self, query: &str, variables: &Value) -> Result<Value, ExecutionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ExecutionError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let mut parsed: Value =
            serde_json::from_str(&body).map_err(|e| ExecutionError::Decode(e.to_string()))?;

        if let Some(errors) = parsed.get("errors").filter(|e| !e.is_null()) {
            let entries: Vec<GraphQlErrorEntry> = serde_json::from_value(errors.clone())
                .map_err(|e| ExecutionError::Decode(format!("unexpected errors shape: {e}")))?;
            if !entries.is_empty() {
                return Err(ExecutionError::GraphQl {
                    messages: entries.into_iter().map(|e| e.message).collect(),
                });
            }
        }

        match parsed.get_mut("data") {
            Some(data) => Ok(data.take()),
            None => Ok(parsed),
        }
    }
}
