use crate::domain::model::{Filter, RawRecord};
use crate::domain::ports::DocumentStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Collections held in memory. Unknown collections read as empty, like the real store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<RawRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, name: impl Into<String>, documents: Vec<RawRecord>) -> Self {
        self.collections.insert(name.into(), documents);
        self
    }

    pub fn insert(&mut self, collection: &str, document: RawRecord) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self, filter: &Filter, collection: &str) -> Result<Vec<RawRecord>> {
        Ok(self
            .collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| filter.matches(document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
