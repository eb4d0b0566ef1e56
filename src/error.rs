use thiserror::Error;

/// Batch-level failures. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Spreadsheet '{0}' was not found")]
    SpreadsheetNotFound(String),

    #[error("Sheet '{sheet}' does not exist (available: {available})")]
    MissingSheet { sheet: String, available: String },

    #[error("Sheet '{sheet}' has no '{column}' column")]
    MissingColumn { sheet: String, column: String },

    #[error("Spreadsheet could not be read: {0}")]
    Spreadsheet(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document store error: {0}")]
    Store(#[from] StoreError),
}

impl ImportError {
    /// Process exit code reported by the binary for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            ImportError::SpreadsheetNotFound(_) => 2,
            ImportError::MissingSheet { .. } => 3,
            ImportError::MissingColumn { .. } => 4,
            ImportError::Http(_) => 5,
            ImportError::Config(_) | ImportError::Toml(_) => 6,
            ImportError::Store(_) => 7,
            ImportError::Spreadsheet(_) | ImportError::Json(_) | ImportError::Io(_) => 1,
        }
    }
}

/// Failure to persist a single document.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Document rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Response(String),

    #[error("Missing credentials: {0}")]
    Credentials(String),
}

pub type Result<T> = std::result::Result<T, ImportError>;
