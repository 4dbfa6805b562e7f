use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Requested name is absent both locally and upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Connection, timeout or non-success HTTP status other than 404.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body is not a JSON object.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Structurally present but semantically invalid payload.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }

    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::NotFound(_) => "not_found",
            CatalogError::Transport(_) => "transport",
            CatalogError::Decode(_) => "decode",
            CatalogError::MalformedRecord(_) => "malformed_record",
            CatalogError::Storage(_) => "storage",
            CatalogError::Config(_) | CatalogError::Toml(_) => "config",
            CatalogError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
