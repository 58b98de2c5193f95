use crate::constants::{ANIMAL_ID, STORE_ID};
use crate::domain::model::{CollectionNames, EntityKind, FieldValue, Filter, RawRecord, Record};
use crate::domain::ports::{DocumentStore, StageEvent, StageLog};
use crate::domain::table::Table;
use crate::utils::timestamp::parse_timestamp_value;
use serde_json::{Map, Value};

/// Trim, lowercase, spaces to underscores.
pub fn canonical_column(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Outcome of normalizing one batch of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub table: Table,
    pub dropped_missing_id: usize,
    pub unparsable_timestamps: usize,
}

/// Reads one collection and turns it into a [`Table`].
pub struct Loader<'a, S: ?Sized> {
    store: &'a S,
    collections: &'a CollectionNames,
    log: &'a dyn StageLog,
}

impl<'a, S: DocumentStore + ?Sized> Loader<'a, S> {
    pub fn new(store: &'a S, collections: &'a CollectionNames, log: &'a dyn StageLog) -> Self {
        Self {
            store,
            collections,
            log,
        }
    }

    /// Never fails: a store error degrades to an empty table so the other
    /// entity kind can still be processed.
    pub async fn load(&self, kind: EntityKind, filter: &Filter) -> Table {
        let collection = self.collections.for_kind(kind);
        tracing::info!("Loading {} records from '{}'", kind, collection);

        let documents = match self.store.read(filter, collection).await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!("{} load failed, continuing with no rows: {}", kind, e);
                self.log.record(&StageEvent::StoreFailed {
                    kind,
                    collection: collection.to_string(),
                    message: e.to_string(),
                });
                return Table::empty(kind);
            }
        };

        let normalized = normalize_documents(kind, documents);
        if normalized.dropped_missing_id > 0 {
            tracing::warn!(
                "Dropped {} {} records without {}",
                normalized.dropped_missing_id,
                kind,
                ANIMAL_ID
            );
        }
        if normalized.unparsable_timestamps > 0 {
            tracing::warn!(
                "{} {} values could not be parsed and were cleared",
                normalized.unparsable_timestamps,
                kind.timestamp_field()
            );
        }

        self.log.record(&StageEvent::Loaded {
            kind,
            rows: normalized.table.len(),
            dropped_missing_id: normalized.dropped_missing_id,
            unparsable_timestamps: normalized.unparsable_timestamps,
        });
        tracing::info!("Loaded {} cleaned {} records", normalized.table.len(), kind);

        normalized.table
    }
}

pub fn normalize_documents(kind: EntityKind, documents: Vec<RawRecord>) -> Normalized {
    let timestamp_field = kind.timestamp_field();
    let mut rows = Vec::with_capacity(documents.len());
    let mut dropped_missing_id = 0;
    let mut unparsable_timestamps = 0;

    for document in documents {
        let fields = canonicalize(document);
        if matches!(fields.get(ANIMAL_ID), None | Some(Value::Null)) {
            dropped_missing_id += 1;
            continue;
        }

        let mut record = Record::new();
        for (column, value) in fields {
            let cell = if column == ANIMAL_ID {
                FieldValue::Text(identifier_text(value))
            } else if column == timestamp_field {
                match parse_timestamp_value(&value) {
                    Some(ts) => FieldValue::Timestamp(ts),
                    None => {
                        if !value.is_null() {
                            unparsable_timestamps += 1;
                        }
                        FieldValue::Null
                    }
                }
            } else {
                FieldValue::from_json(&value)
            };
            record.insert(column, cell);
        }
        rows.push(record);
    }

    Normalized {
        table: Table::from_rows(kind, rows),
        dropped_missing_id,
        unparsable_timestamps,
    }
}

// Keys that collapse to the same canonical name keep the first non-null value.
fn canonicalize(document: RawRecord) -> Map<String, Value> {
    let mut fields = Map::new();
    for (key, value) in document.data {
        let column = canonical_column(&key);
        if column == STORE_ID {
            continue;
        }
        let occupied = fields.get(&column).is_some_and(|existing| !existing.is_null());
        if !occupied {
            fields.insert(column, value);
        }
    }
    fields
}

fn identifier_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
