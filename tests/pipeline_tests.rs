use async_trait::async_trait;
use serde_json::json;
use shelter_etl::app::analysis::{self, RescueType};
use shelter_etl::constants::{derived, ANIMAL_ID};
use shelter_etl::{
    DocumentStore, EntityKind, EtlEngine, EtlError, FieldValue, Filter, MemoryStageLog,
    MemoryStore, RawRecord, Result, RunFilters, StageEvent,
};
use std::sync::Arc;

fn docs(values: Vec<serde_json::Value>) -> Vec<RawRecord> {
    values.into_iter().filter_map(RawRecord::from_value).collect()
}

fn shelter_store() -> MemoryStore {
    MemoryStore::new()
        .with_collection(
            "intakes",
            docs(vec![
                json!({
                    "_id": "65a1",
                    "Animal ID": "A",
                    "Breed": "Labrador Retriever",
                    "DateTime Intake": "2019-01-01T10:00:00Z",
                    "Intake Type": "Stray",
                    "Animal Type": "Dog"
                }),
                json!({
                    "_id": "65a2",
                    "Animal ID": "B",
                    "Breed": "Pug",
                    "DateTime Intake": "2019-02-01T10:00:00Z",
                    "Intake Type": "Owner Surrender",
                    "Animal Type": "Dog"
                }),
                json!({
                    "_id": "65a3",
                    "Animal ID": null,
                    "Breed": "Beagle",
                    "DateTime Intake": "2019-03-01T10:00:00Z",
                    "Animal Type": "Dog"
                }),
                json!({
                    "_id": "65a4",
                    "Animal ID": "A",
                    "Breed": "Labrador Retriever",
                    "DateTime Intake": "2018-06-01T10:00:00Z",
                    "Intake Type": "Stray",
                    "Animal Type": "Dog"
                }),
            ]),
        )
        .with_collection(
            "outcomes",
            docs(vec![
                json!({
                    "_id": "75b1",
                    "animal_id": "A",
                    "breed": "Labrador Retriever",
                    "datetime_outcome": "2019-01-11T10:00:00Z",
                    "age_upon_outcome_in_weeks": 52,
                    "outcome_type": "Adoption"
                }),
                json!({
                    "_id": "75b2",
                    "animal_id": "C",
                    "breed": "Poodle",
                    "datetime_outcome": "2019-04-01T10:00:00Z",
                    "age_upon_outcome_in_weeks": 10,
                    "outcome_type": "Transfer"
                }),
            ]),
        )
}

#[tokio::test]
async fn test_end_to_end_join_and_enrichment() {
    let engine = EtlEngine::new(shelter_store());
    let dataset = engine.run(&RunFilters::default()).await.unwrap();

    // A and B from intake; C has no intake and the id-less row is dropped
    assert_eq!(dataset.len(), 2);
    let order: Vec<_> = dataset.rows().iter().filter_map(|r| r.id()).collect();
    assert_eq!(order, vec!["B", "A"]);

    assert_eq!(dataset.columns()[0], ANIMAL_ID);
    assert!(!dataset.has_column("_id"));
    assert!(dataset.has_column("breed_intake"));
    assert!(dataset.has_column("breed_outcome"));

    let a = dataset.find("A").unwrap();
    assert_eq!(a.get(derived::DAYS_IN_SHELTER), Some(&FieldValue::Integer(10)));
    assert_eq!(a.get(derived::AGE_IN_YEARS), Some(&FieldValue::Float(1.0)));
    assert_eq!(a.get(derived::IS_WORKING_DOG), Some(&FieldValue::Bool(true)));
    assert_eq!(a.get(derived::INTAKE_YEAR), Some(&FieldValue::text("2019")));
    assert_eq!(a.get("outcome_type"), Some(&FieldValue::text("Adoption")));

    let b = dataset.find("B").unwrap();
    assert_eq!(b.get(derived::DAYS_IN_SHELTER), Some(&FieldValue::Unknown));
    assert_eq!(b.get(derived::AGE_IN_YEARS), Some(&FieldValue::Unknown));
    assert_eq!(b.get(derived::OUTCOME_YEAR), Some(&FieldValue::Unknown));
    assert_eq!(b.get("outcome_type"), Some(&FieldValue::Unknown));
    assert_eq!(b.get(derived::IS_WORKING_DOG), Some(&FieldValue::Bool(false)));
}

#[tokio::test]
async fn test_every_cell_is_filled() {
    let engine = EtlEngine::new(shelter_store());
    let dataset = engine.run(&RunFilters::default()).await.unwrap();

    for row in dataset.rows() {
        for column in dataset.columns() {
            let value = row.get(column).unwrap();
            assert_ne!(value, &FieldValue::Null, "{} left null", column);
        }
    }
}

#[tokio::test]
async fn test_runs_are_idempotent() {
    let engine = EtlEngine::new(shelter_store());

    let first = engine.run(&RunFilters::default()).await.unwrap();
    let second = engine.run(&RunFilters::default()).await.unwrap();

    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[tokio::test]
async fn test_filters_reach_the_store() {
    let engine = EtlEngine::new(shelter_store());
    let filters = RunFilters {
        intake: Filter::all().where_eq("Intake Type", "Stray"),
        outcome: Filter::all(),
    };

    let dataset = engine.run(&filters).await.unwrap();
    assert_eq!(dataset.len(), 1);
    assert!(dataset.find("A").is_some());
}

#[tokio::test]
async fn test_stage_events_are_recorded() {
    let log = Arc::new(MemoryStageLog::new());
    let engine = EtlEngine::new(shelter_store()).with_stage_log(log.clone());
    engine.run(&RunFilters::default()).await.unwrap();

    let events = log.events();
    assert_eq!(events.first(), Some(&StageEvent::RunStarted));
    assert!(events.contains(&StageEvent::Loaded {
        kind: EntityKind::Intake,
        rows: 3,
        dropped_missing_id: 1,
        unparsable_timestamps: 0,
    }));
    assert!(events.contains(&StageEvent::Deduplicated {
        kind: EntityKind::Intake,
        removed: 1,
        remaining: 2,
    }));
    assert!(events.contains(&StageEvent::Merged { rows: 2, matched: 1 }));
    assert_eq!(events.last(), Some(&StageEvent::Finalized { rows: 2 }));
}

/// Serves intakes from memory and fails every outcome read.
struct OutcomeOutage {
    inner: MemoryStore,
}

#[async_trait]
impl DocumentStore for OutcomeOutage {
    async fn read(&self, filter: &Filter, collection: &str) -> Result<Vec<RawRecord>> {
        if collection == "outcomes" {
            return Err(EtlError::store_access(collection, "connection refused"));
        }
        self.inner.read(filter, collection).await
    }
}

#[tokio::test]
async fn test_store_failure_degrades_to_intake_only() {
    let log = Arc::new(MemoryStageLog::new());
    let engine = EtlEngine::new(OutcomeOutage {
        inner: shelter_store(),
    })
    .with_stage_log(log.clone());

    let dataset = engine.run(&RunFilters::default()).await.unwrap();

    assert_eq!(dataset.len(), 2);
    assert!(!dataset.has_column("outcome_type"));
    for row in dataset.rows() {
        assert_eq!(row.get(derived::DAYS_IN_SHELTER), Some(&FieldValue::Unknown));
    }
    assert!(log
        .events()
        .iter()
        .any(|e| matches!(e, StageEvent::StoreFailed { kind: EntityKind::Outcome, .. })));
}

#[tokio::test]
async fn test_empty_store_yields_empty_dataset() {
    let engine = EtlEngine::new(MemoryStore::new());
    let dataset = engine.run(&RunFilters::default()).await.unwrap();

    assert!(dataset.is_empty());
    assert!(dataset.has_column(ANIMAL_ID));
}

#[tokio::test]
async fn test_rescue_candidates_without_age_data() {
    let store = MemoryStore::new().with_collection(
        "intakes",
        docs(vec![json!({"animal_id": "A", "breed": "Labrador Retriever"})]),
    );
    let dataset = EtlEngine::new(store).run(&RunFilters::default()).await.unwrap();

    assert!(!dataset.has_column(derived::AGE_IN_YEARS));
    let water = analysis::rescue_candidates(&dataset, RescueType::Water);
    assert_eq!(water.len(), 1);
}
