//! Sales analytics aggregation engine behind the CRM dashboard.
//!
//! Everything below [`engine`] is a pure function over record snapshots; the
//! engine is the only place that talks to the collaborator stores.

pub mod classify;
pub mod config;
pub mod conversion;
pub mod dimension;
pub mod engine;
pub mod error;
pub mod followup;
pub mod funnel;
pub mod model;
pub mod report;
pub mod scope;
pub mod store;
pub mod timeseries;
