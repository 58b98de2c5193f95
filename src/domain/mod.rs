// Domain layer: record and table types plus the ports the pipeline talks through.

pub mod model;
pub mod ports;
pub mod table;
