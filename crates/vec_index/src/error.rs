/// Result type for vector index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Vector index specific errors
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Weaviate returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("GraphQL error: {0}")]
    Graphql(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Index unavailable: {0}")]
    Unavailable(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
