use crate::adapters::stage_log::TracingStageLog;
use crate::core::dedupe::dedupe;
use crate::core::enrich::enrich;
use crate::core::finalize::finalize;
use crate::core::loader::Loader;
use crate::core::merge::merge;
use crate::domain::model::{CollectionNames, EntityKind, RunFilters};
use crate::domain::ports::{DocumentStore, StageEvent, StageLog};
use crate::domain::table::{Dataset, RowSet, Table};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::sync::Arc;

/// Runs load → dedupe → merge → enrich → finalize against an injected store.
///
/// Holds no data between runs; every call to [`EtlEngine::run`] starts from the store.
pub struct EtlEngine<S: DocumentStore> {
    store: S,
    collections: CollectionNames,
    log: Arc<dyn StageLog>,
    monitor: SystemMonitor,
}

impl<S: DocumentStore> EtlEngine<S> {
    pub fn new(store: S) -> Self {
        Self::new_with_monitoring(store, false)
    }

    pub fn new_with_monitoring(store: S, monitor_enabled: bool) -> Self {
        Self {
            store,
            collections: CollectionNames::default(),
            log: Arc::new(TracingStageLog),
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn with_collections(mut self, collections: CollectionNames) -> Self {
        self.collections = collections;
        self
    }

    pub fn with_stage_log(mut self, log: Arc<dyn StageLog>) -> Self {
        self.log = log;
        self
    }

    pub fn collections(&self) -> &CollectionNames {
        &self.collections
    }

    /// Loads both entity kinds concurrently. Store failures surface as empty tables.
    pub async fn extract(&self, filters: &RunFilters) -> (Table, Table) {
        let loader = Loader::new(&self.store, &self.collections, self.log.as_ref());
        tokio::join!(
            loader.load(EntityKind::Intake, &filters.intake),
            loader.load(EntityKind::Outcome, &filters.outcome)
        )
    }

    pub fn transform(&self, intake: Table, outcome: Table) -> Result<RowSet> {
        let intake = self.dedupe(intake);
        let outcome = self.dedupe(outcome);

        let merged = merge(&intake, &outcome)?;
        tracing::info!(
            "Merged {} intake rows, {} with an outcome",
            merged.rows.len(),
            merged.matched
        );
        self.log.record(&StageEvent::Merged {
            rows: merged.rows.len(),
            matched: merged.matched,
        });

        let enriched = enrich(merged.rows)?;
        self.log.record(&StageEvent::Enriched {
            rows: enriched.len(),
            columns: enriched.columns.len(),
        });
        Ok(enriched)
    }

    pub fn finalize(&self, enriched: &RowSet) -> Dataset {
        let dataset = finalize(enriched);
        self.log.record(&StageEvent::Finalized {
            rows: dataset.len(),
        });
        dataset
    }

    pub async fn run(&self, filters: &RunFilters) -> Result<Dataset> {
        tracing::info!("Starting shelter ETL run");
        self.log.record(&StageEvent::RunStarted);

        let (intake, outcome) = self.extract(filters).await;
        tracing::info!(
            "Extract complete: {} intakes, {} outcomes",
            intake.len(),
            outcome.len()
        );
        self.monitor.log_stats("extract");

        let enriched = self.transform(intake, outcome)?;
        self.monitor.log_stats("transform");

        let dataset = self.finalize(&enriched);
        self.monitor.log_stats("finalize");
        self.monitor.log_final_stats();

        tracing::info!("ETL run complete: {} rows", dataset.len());
        Ok(dataset)
    }

    fn dedupe(&self, table: Table) -> Table {
        let kind = table.kind();
        let before = table.len();
        let table = dedupe(table);
        let removed = before - table.len();
        if removed > 0 {
            tracing::info!("Deduplicated {} {} rows on animal_id", removed, kind);
        }
        self.log.record(&StageEvent::Deduplicated {
            kind,
            removed,
            remaining: table.len(),
        });
        table
    }
}
