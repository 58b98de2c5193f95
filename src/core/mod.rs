pub mod dedupe;
pub mod enrich;
pub mod etl;
pub mod finalize;
pub mod loader;
pub mod merge;

pub use crate::domain::model::{Record, RunFilters};
pub use crate::domain::ports::{DocumentStore, StageLog};
pub use crate::utils::error::Result;
