/*!
# Vector Index

Read-only lookups against the vector index that holds the product objects.
[`SearchIndex`] is the capability the reconciler depends on; [`WeaviateClient`]
talks to a Weaviate instance over GraphQL and [`MemoryIndex`] serves tests.
*/

pub mod error;
pub mod memory;
pub mod weaviate;

use async_trait::async_trait;

pub use error::{IndexError, IndexResult};
pub use memory::{IndexedObject, MemoryIndex};
pub use weaviate::{WeaviateClient, WeaviateSettings};

/// Exact-equality lookup on one text property of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameQuery<'a> {
    pub class_name: &'a str,
    pub field: &'a str,
    pub value: &'a str,
    pub limit: usize,
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Ids of objects whose `field` equals `value` (case-sensitive), in the
    /// order the index returns them, at most `limit` of them.
    async fn find_ids_by_name(&self, query: &NameQuery<'_>) -> IndexResult<Vec<String>>;
}
