pub mod adapters;
pub mod app;
pub mod config;
pub mod constants;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{
    http_store::HttpStore, json_store::JsonDirStore, local_storage::LocalStorage,
    memory_store::MemoryStore, stage_log::{MemoryStageLog, TracingStageLog},
};
pub use app::{DatasetExporter, ExportOptions, OutputFormat};
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{RunSettings, StoreBackend, StoreSettings, TomlConfig};
pub use core::etl::EtlEngine;
pub use domain::model::{
    CollectionNames, EntityKind, FieldValue, Filter, RawRecord, Record, RunFilters,
};
pub use domain::ports::{DocumentStore, StageEvent, StageLog, Storage};
pub use domain::table::{Dataset, RowSet, Table};
pub use utils::error::{EtlError, Result};
