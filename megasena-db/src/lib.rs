pub mod archive;
pub mod models;

pub use serde_json;
