use thiserror::Error;

/// All possible errors when building or sorting a commit-order graph
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Node `{0}` is not registered")]
    UnknownNode(String),

    #[error("Dependency `{from}` -> `{to}` points at an unregistered node")]
    DanglingDependency { from: String, to: String },

    #[error("Table `{0}` is declared more than once")]
    DuplicateTable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, OrderError>;
