use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("authentication rejected: {message}")]
    Auth { message: String },

    #[error("fetch failed for user {uid}: {message}")]
    Fetch { uid: u64, message: String },

    #[error("invalid input: {message}")]
    Input { message: String },

    #[error("server returned status {status}")]
    Server { status: u16 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StatsError>;
