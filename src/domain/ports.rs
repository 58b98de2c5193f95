use crate::domain::model::{EntityKind, Filter, RawRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read side of the document store holding the intake and outcome collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn read(&self, filter: &Filter, collection: &str) -> Result<Vec<RawRecord>>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<T> {
    async fn read(&self, filter: &Filter, collection: &str) -> Result<Vec<RawRecord>> {
        (**self).read(filter, collection).await
    }
}

/// What happened at a stage boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    RunStarted,
    StoreFailed {
        kind: EntityKind,
        collection: String,
        message: String,
    },
    Loaded {
        kind: EntityKind,
        rows: usize,
        dropped_missing_id: usize,
        unparsable_timestamps: usize,
    },
    Deduplicated {
        kind: EntityKind,
        removed: usize,
        remaining: usize,
    },
    Merged {
        rows: usize,
        matched: usize,
    },
    Enriched {
        rows: usize,
        columns: usize,
    },
    Finalized {
        rows: usize,
    },
}

/// Receives stage events. Infallible, so a logging problem cannot stop a run.
pub trait StageLog: Send + Sync {
    fn record(&self, event: &StageEvent);
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
