/// Environment parsing lives in `leadlytics-core`; the server only re-exports it.
pub use leadlytics_core::config::{AuthMode, Config};
