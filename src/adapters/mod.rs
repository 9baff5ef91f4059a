// Adapters layer: concrete implementations for external systems (http, files).

pub mod csv_batch;
pub mod nhtsa;
pub mod track;
