use product_store::StoreError;
use vec_index::IndexError;

/// Result type for reconciliation
pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Product store error: {0}")]
    Store(#[from] StoreError),

    #[error("Vector index error: {0}")]
    Index(#[from] IndexError),

    #[error("{count} objects match name \"{name}\", refusing to pick one")]
    Ambiguous { name: String, count: usize },
}
