use crate::domain::model::{Filter, RawRecord};
use crate::domain::ports::DocumentStore;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_DATABASE: &str = "aac";
pub const DEFAULT_DATA_SOURCE: &str = "Cluster0";

/// Document store reached over an Atlas-style data API (`POST {endpoint}/action/find`).
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    endpoint: String,
    database: String,
    data_source: String,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FindRequest<'a> {
    data_source: &'a str,
    database: &'a str,
    collection: &'a str,
    filter: &'a Filter,
}

impl HttpStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            database: DEFAULT_DATABASE.to_string(),
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            api_key: None,
            timeout: None,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_data_source(mut self, data_source: impl Into<String>) -> Self {
        self.data_source = data_source.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn find(&self, filter: &Filter, collection: &str) -> Result<Value> {
        let url = format!("{}/action/find", self.endpoint);
        let body = FindRequest {
            data_source: &self.data_source,
            database: &self.database,
            collection,
            filter,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.header("api-key", api_key);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Querying {} for '{}'", url, collection);
        let response = request.send().await?;
        tracing::debug!("Store response status: {}", response.status());

        let response = response.error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Accepts `{"documents": [...]}` or a bare array.
fn documents_from_body(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("documents") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn read(&self, filter: &Filter, collection: &str) -> Result<Vec<RawRecord>> {
        let body = self
            .find(filter, collection)
            .await
            .map_err(|e| EtlError::store_access(collection, e.to_string()))?;

        let documents = documents_from_body(body).ok_or_else(|| {
            EtlError::store_access(collection, "response carried no document array")
        })?;

        Ok(documents.into_iter().filter_map(RawRecord::from_value).collect())
    }
}
