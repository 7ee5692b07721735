use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("search request failed: {0}")]
    SearchRequest(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("store I/O error on {path}: {source}")]
    StoreIo {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("notification delivery failed: {0}")]
    NotificationDelivery(String),
}

impl TrackerError {
    pub fn store_io(path: &std::path::Path, source: impl Into<csv::Error>) -> Self {
        TrackerError::StoreIo {
            path: path.display().to_string(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
