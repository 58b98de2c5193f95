#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::adapters::http_store::{HttpStore, DEFAULT_DATABASE, DEFAULT_DATA_SOURCE};
use crate::adapters::json_store::JsonDirStore;
use crate::app::export::{ExportOptions, OutputFormat, SUPPORTED_FORMATS};
use crate::domain::model::{CollectionNames, Filter, RawRecord, RunFilters};
use crate::domain::ports::DocumentStore;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_output_formats, validate_path, validate_range,
    validate_url, Validate,
};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Where the intake and outcome collections are read from.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreSettings {
    JsonDir {
        path: String,
    },
    Http {
        endpoint: String,
        database: String,
        data_source: String,
        api_key: Option<String>,
        timeout_seconds: Option<u64>,
    },
}

impl StoreSettings {
    pub fn http(endpoint: impl Into<String>) -> Self {
        Self::Http {
            endpoint: endpoint.into(),
            database: DEFAULT_DATABASE.to_string(),
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            api_key: None,
            timeout_seconds: None,
        }
    }

    pub fn build(&self) -> StoreBackend {
        match self {
            Self::JsonDir { path } => StoreBackend::JsonDir(JsonDirStore::new(path)),
            Self::Http {
                endpoint,
                database,
                data_source,
                api_key,
                timeout_seconds,
            } => {
                let mut store = HttpStore::new(endpoint.as_str())
                    .with_database(database.as_str())
                    .with_data_source(data_source.as_str());
                if let Some(key) = api_key {
                    store = store.with_api_key(key.as_str());
                }
                if let Some(secs) = timeout_seconds {
                    store = store.with_timeout(Duration::from_secs(*secs));
                }
                StoreBackend::Http(store)
            }
        }
    }
}

/// The store picked at runtime by configuration.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    JsonDir(JsonDirStore),
    Http(HttpStore),
}

#[async_trait]
impl DocumentStore for StoreBackend {
    async fn read(&self, filter: &Filter, collection: &str) -> Result<Vec<RawRecord>> {
        match self {
            Self::JsonDir(store) => store.read(filter, collection).await,
            Self::Http(store) => store.read(filter, collection).await,
        }
    }
}

/// Everything one run of the binary needs, whichever source it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub store: StoreSettings,
    pub collections: CollectionNames,
    pub filters: RunFilters,
    pub output_path: String,
    pub formats: Vec<String>,
    pub base_name: String,
    pub zip_archive: Option<String>,
    pub summary: bool,
    pub monitor: bool,
    pub verbose: bool,
    pub json_logs: bool,
}

impl RunSettings {
    pub fn export_options(&self) -> Result<ExportOptions> {
        let formats = self
            .formats
            .iter()
            .map(|f| f.parse::<OutputFormat>())
            .collect::<Result<Vec<_>>>()?;
        Ok(ExportOptions {
            formats,
            base_name: self.base_name.clone(),
            zip_archive: self.zip_archive.clone(),
        })
    }
}

impl Validate for RunSettings {
    fn validate(&self) -> Result<()> {
        match &self.store {
            StoreSettings::JsonDir { path } => validate_path("store.path", path)?,
            StoreSettings::Http {
                endpoint,
                database,
                timeout_seconds,
                ..
            } => {
                validate_url("store.endpoint", endpoint)?;
                validate_non_empty_string("store.database", database)?;
                if let Some(secs) = timeout_seconds {
                    validate_range("store.timeout_seconds", *secs, 1, 600)?;
                }
            }
        }

        validate_non_empty_string("pipeline.intake_collection", &self.collections.intake)?;
        validate_non_empty_string("pipeline.outcome_collection", &self.collections.outcome)?;
        validate_path("export.output_path", &self.output_path)?;
        validate_non_empty_string("export.base_name", &self.base_name)?;
        validate_output_formats("export.formats", &self.formats, &SUPPORTED_FORMATS)?;
        if let Some(archive) = &self.zip_archive {
            validate_non_empty_string("export.zip_archive", archive)?;
        }
        Ok(())
    }
}

/// Parses repeated `field=value` arguments into an equality filter.
///
/// Values that read as JSON numbers or booleans keep that type; everything else is text.
pub fn parse_filter_pairs(field_name: &str, pairs: &[String]) -> Result<Filter> {
    let mut filter = Filter::all();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: pair.clone(),
                reason: "Expected field=value".to_string(),
            })?;
        validate_non_empty_string(field_name, key)?;
        filter = filter.where_eq(key.trim(), filter_value(raw.trim()));
    }
    Ok(filter)
}

fn filter_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}
