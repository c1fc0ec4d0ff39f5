pub mod dashboard;
pub mod health;
pub(crate) mod query;
