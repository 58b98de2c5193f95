// Application layer: what happens to a dataset after the run.

pub mod analysis;
pub mod export;

pub use analysis::{summarize, DatasetSummary, RescueType};
pub use export::{DatasetExporter, ExportOptions, OutputFormat};
