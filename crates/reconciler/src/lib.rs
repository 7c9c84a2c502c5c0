/*!
# Reconciler

Orchestration for the id backfill: finds product records without a vector
index cross-reference, looks each one up by name and writes the matching
object id back.

The run is strictly sequential. Failures on one record are logged and
skipped; only startup failures (configuration, connecting, listing
candidates) abort the run.
*/

pub mod config;
pub mod engine;
pub mod error;
pub mod policy;
pub mod summary;

use product_store::MongoProductStore;
use tracing::info;
use vec_index::WeaviateClient;

pub use config::{ConfigError, SyncConfig};
pub use engine::{ItemOutcome, Reconciler};
pub use error::{ReconcileError, ReconcileResult};
pub use policy::{MatchPolicy, Selection};
pub use summary::RunSummary;

/// Connects to MongoDB, then builds the Weaviate client. Nothing is retried.
pub async fn connect(config: &SyncConfig) -> ReconcileResult<(MongoProductStore, WeaviateClient)> {
    let store = MongoProductStore::connect(&config.mongo_uri, config.layout.clone()).await?;
    let index = WeaviateClient::new(&config.weaviate)?;
    info!("Connected to Weaviate at {}", index.endpoint());
    Ok((store, index))
}
