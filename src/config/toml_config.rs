use crate::domain::model::{CollectionNames, Filter, RunFilters};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use crate::config::{RunSettings, StoreSettings};
use crate::adapters::http_store::{DEFAULT_DATABASE, DEFAULT_DATA_SOURCE};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: Option<PipelineConfig>,
    pub store: StoreConfig,
    pub filters: Option<FiltersConfig>,
    pub export: ExportConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: Option<String>,
    pub intake_collection: Option<String>,
    pub outcome_collection: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub r#type: String,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub database: Option<String>,
    pub data_source: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    pub intake: Option<Map<String, Value>>,
    pub outcome: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: String,
    pub formats: Vec<String>,
    pub base_name: Option<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
    pub summary: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!("Environment variable {} is not set", var_name);
                format!("${{{}}}", var_name)
            })
        });

        Ok(result.to_string())
    }

    pub fn pipeline_name(&self) -> &str {
        self.pipeline
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .unwrap_or("shelter-etl")
    }

    pub fn collections(&self) -> CollectionNames {
        let defaults = CollectionNames::default();
        let pipeline = self.pipeline.as_ref();
        CollectionNames {
            intake: pipeline
                .and_then(|p| p.intake_collection.clone())
                .unwrap_or(defaults.intake),
            outcome: pipeline
                .and_then(|p| p.outcome_collection.clone())
                .unwrap_or(defaults.outcome),
        }
    }

    pub fn run_filters(&self) -> RunFilters {
        let filters = self.filters.as_ref();
        let to_filter = |conditions: Option<&Map<String, Value>>| {
            conditions.cloned().map(Filter::from).unwrap_or_default()
        };
        RunFilters {
            intake: to_filter(filters.and_then(|f| f.intake.as_ref())),
            outcome: to_filter(filters.and_then(|f| f.outcome.as_ref())),
        }
    }

    pub fn store_settings(&self) -> Result<StoreSettings> {
        match self.store.r#type.as_str() {
            "json_dir" => {
                let path = self.store.path.clone().ok_or_else(|| EtlError::MissingConfigError {
                    field: "store.path".to_string(),
                })?;
                Ok(StoreSettings::JsonDir { path })
            }
            "http" => {
                let endpoint =
                    self.store.endpoint.clone().ok_or_else(|| EtlError::MissingConfigError {
                        field: "store.endpoint".to_string(),
                    })?;
                Ok(StoreSettings::Http {
                    endpoint,
                    database: self
                        .store
                        .database
                        .clone()
                        .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
                    data_source: self
                        .store
                        .data_source
                        .clone()
                        .unwrap_or_else(|| DEFAULT_DATA_SOURCE.to_string()),
                    api_key: self.store.api_key.clone(),
                    timeout_seconds: self.store.timeout_seconds,
                })
            }
            other => Err(EtlError::InvalidConfigValueError {
                field: "store.type".to_string(),
                value: other.to_string(),
                reason: "Valid store types: json_dir, http".to_string(),
            }),
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn to_settings(&self) -> Result<RunSettings> {
        let monitoring = self.monitoring.as_ref();
        Ok(RunSettings {
            store: self.store_settings()?,
            collections: self.collections(),
            filters: self.run_filters(),
            output_path: self.export.output_path.clone(),
            formats: self.export.formats.clone(),
            base_name: self
                .export
                .base_name
                .clone()
                .unwrap_or_else(|| "shelter_dataset".to_string()),
            zip_archive: self
                .export
                .compression
                .as_ref()
                .filter(|c| c.enabled)
                .map(|c| c.filename.clone()),
            summary: monitoring.and_then(|m| m.summary).unwrap_or(false),
            monitor: self.monitoring_enabled(),
            verbose: false,
            json_logs: monitoring.and_then(|m| m.json_logs).unwrap_or(false),
        })
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.to_settings()?.validate()
    }
}
