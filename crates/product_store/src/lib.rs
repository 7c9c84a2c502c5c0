/*!
# Product Store

Document-store side of the id backfill. Exposes the three operations the
reconciler needs through [`ProductStore`], with a MongoDB implementation for
real runs and an in-memory one for tests and local experiments.
*/

pub mod error;
pub mod memory;
pub mod mongo;
pub mod record;

use async_trait::async_trait;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryProductStore;
pub use mongo::{CollectionLayout, MongoProductStore};
pub use record::{Candidates, ProductRecord, RecordId};

/// Capability interface over the product collection.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All documents whose cross-reference field is absent, in store order.
    async fn find_missing_cross_ref(&self) -> StoreResult<Candidates>;

    /// Sets the cross-reference field on the record with the given internal id.
    async fn set_cross_ref(&self, id: &RecordId, value: &str) -> StoreResult<()>;

    /// Releases the underlying connection. Calls after `close` are undefined.
    async fn close(&self) -> StoreResult<()>;
}
