use crate::adapters::http_store::{DEFAULT_DATABASE, DEFAULT_DATA_SOURCE};
use crate::config::{parse_filter_pairs, RunSettings, StoreSettings, TomlConfig};
use crate::domain::model::{CollectionNames, RunFilters};
use crate::utils::error::{EtlError, Result};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "shelter-etl")]
#[command(about = "Joins shelter intake and outcome records into one enriched dataset")]
pub struct CliConfig {
    /// TOML config file; when given, the store/export flags below are ignored
    #[arg(long)]
    pub config: Option<String>,

    /// Directory holding <collection>.json or <collection>.jsonl exports
    #[arg(long, conflicts_with = "store_endpoint")]
    pub data_dir: Option<String>,

    /// Base URL of the document store's data API
    #[arg(long)]
    pub store_endpoint: Option<String>,

    #[arg(long, env = "SHELTER_ETL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_DATABASE)]
    pub database: String,

    #[arg(long, default_value = DEFAULT_DATA_SOURCE)]
    pub data_source: String,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, default_value = crate::constants::DEFAULT_INTAKE_COLLECTION)]
    pub intake_collection: String,

    #[arg(long, default_value = crate::constants::DEFAULT_OUTCOME_COLLECTION)]
    pub outcome_collection: String,

    /// Equality filter on intake records, field=value (repeatable)
    #[arg(long)]
    pub intake_filter: Vec<String>,

    /// Equality filter on outcome records, field=value (repeatable)
    #[arg(long)]
    pub outcome_filter: Vec<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "csv")]
    pub format: Vec<String>,

    #[arg(long, default_value = "shelter_dataset")]
    pub base_name: String,

    /// Pack the rendered files into this zip archive
    #[arg(long)]
    pub zip: Option<String>,

    #[arg(long, help = "Print breed, shelter-stay and rescue summaries")]
    pub summary: bool,

    #[arg(long, help = "Log process CPU and memory at each stage")]
    pub monitor: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Resolves the run settings, from the TOML file when `--config` is given.
    ///
    /// Flags that only affect this invocation (`--verbose`, `--summary`, `--monitor`,
    /// `--json-logs`) are honoured in both cases.
    pub fn resolve(&self) -> Result<RunSettings> {
        if let Some(path) = &self.config {
            let mut settings = TomlConfig::from_file(path)?.to_settings()?;
            settings.verbose |= self.verbose;
            settings.summary |= self.summary;
            settings.monitor |= self.monitor;
            settings.json_logs |= self.json_logs;
            return Ok(settings);
        }

        Ok(RunSettings {
            store: self.store_settings()?,
            collections: CollectionNames {
                intake: self.intake_collection.clone(),
                outcome: self.outcome_collection.clone(),
            },
            filters: RunFilters {
                intake: parse_filter_pairs("intake_filter", &self.intake_filter)?,
                outcome: parse_filter_pairs("outcome_filter", &self.outcome_filter)?,
            },
            output_path: self.output_path.clone(),
            formats: self.format.iter().map(|f| f.trim().to_lowercase()).collect(),
            base_name: self.base_name.clone(),
            zip_archive: self.zip.clone(),
            summary: self.summary,
            monitor: self.monitor,
            verbose: self.verbose,
            json_logs: self.json_logs,
        })
    }

    fn store_settings(&self) -> Result<StoreSettings> {
        match (&self.data_dir, &self.store_endpoint) {
            (Some(path), _) => Ok(StoreSettings::JsonDir { path: path.clone() }),
            (None, Some(endpoint)) => Ok(StoreSettings::Http {
                endpoint: endpoint.clone(),
                database: self.database.clone(),
                data_source: self.data_source.clone(),
                api_key: self.api_key.clone(),
                timeout_seconds: self.timeout_seconds,
            }),
            (None, None) => Err(EtlError::MissingConfigError {
                field: "data_dir or store_endpoint".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;
    use serde_json::json;

    #[test]
    fn test_resolve_json_dir_run() {
        let cli = CliConfig::parse_from([
            "shelter-etl",
            "--data-dir",
            "./data",
            "--intake-filter",
            "animal_type=Dog",
            "--format",
            "csv,JSON",
            "--summary",
        ]);
        let settings = cli.resolve().unwrap();

        assert_eq!(settings.store, StoreSettings::JsonDir { path: "./data".to_string() });
        assert_eq!(settings.formats, vec!["csv", "json"]);
        assert_eq!(settings.filters.intake.conditions()["animal_type"], json!("Dog"));
        assert!(settings.summary);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_resolve_http_run() {
        let cli = CliConfig::parse_from([
            "shelter-etl",
            "--store-endpoint",
            "https://data.example.com/app/v1",
            "--api-key",
            "k",
            "--outcome-collection",
            "aac_outcomes",
        ]);
        let settings = cli.resolve().unwrap();

        assert_eq!(settings.collections.outcome, "aac_outcomes");
        assert!(matches!(
            settings.store,
            StoreSettings::Http { ref database, ref api_key, .. }
                if database == "aac" && api_key.as_deref() == Some("k")
        ));
    }

    #[test]
    fn test_resolve_requires_a_store() {
        let cli = CliConfig::parse_from(["shelter-etl"]);
        assert!(matches!(cli.resolve(), Err(EtlError::MissingConfigError { .. })));
    }
}
