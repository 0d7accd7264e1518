pub mod retry;

use crate::config::retry::BackoffSchedule;

/// Client-level defaults applied when a call site does not override them.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backoff schedule handed to the dispatcher for each document call.
    pub retry: BackoffSchedule,
    /// Whether request bodies above the gzip floor are compressed.
    pub compression_enabled: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            retry: BackoffSchedule::default(),
            compression_enabled: true,
        }
    }
}
