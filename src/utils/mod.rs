pub mod error;
pub mod logger;
pub mod monitor;
pub mod timestamp;
pub mod validation;
