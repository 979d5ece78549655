//! Configuration and dependency initialization.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{
    Settings, DEFAULT_BATCH_SIZE, DEFAULT_DATABASE_URL, DEFAULT_OPENSEARCH_URL,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_STATE_FILE_PATH,
};
