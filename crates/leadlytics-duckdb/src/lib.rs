pub mod backend;
pub mod records;
pub mod schema;
pub mod store_impl;

pub use backend::DuckDbBackend;

/// Re-export the `duckdb` crate so tests can use
/// `leadlytics_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;
