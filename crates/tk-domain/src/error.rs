/// Shared error type used across all reasoning-kernel crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("input invalid: {0}")]
    InputInvalid(String),

    #[error("graph I/O: {0}")]
    GraphIo(String),

    #[error("serialization: {0}")]
    Serialization(String),

    #[error("busy: a turn is already in progress")]
    Busy,

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
