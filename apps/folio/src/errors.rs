use thiserror::Error;

/// Failures of the local slot file. Always recoverable: hydration substitutes
/// the default collection, writes are logged and swallowed.
#[derive(Debug, Error)]
pub enum LocalSlotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures of the remote file store. The mirror worker logs and discards
/// these; reconciliation aborts on them, leaving local-only state in effect.
#[derive(Debug, Error)]
pub enum RemoteStoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote store returned status {status}: {message}")]
    Api { status: u16, message: String },
}
