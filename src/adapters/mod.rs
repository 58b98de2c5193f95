// Adapters layer: concrete stores, storage and stage logs behind the domain ports.

pub mod http_store;
pub mod json_store;
pub mod local_storage;
pub mod memory_store;
pub mod stage_log;
