use product_store::{ProductRecord, ProductStore};
use telemetry::RunMetrics;
use tracing::{debug, error, info, warn};
use vec_index::{NameQuery, SearchIndex};

use crate::config::SyncConfig;
use crate::error::{ReconcileError, ReconcileResult};
use crate::policy::Selection;
use crate::summary::{RunSummary, AMBIGUOUS, CANDIDATES, FAILED, LINKED, PLANNED, UNMATCHED};

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The cross-reference was written.
    Linked(String),
    /// Dry run: the cross-reference would have been written.
    Planned(String),
    /// The index holds no object with this name.
    Unmatched,
}

/// Backfills index ids onto product records, one record at a time.
pub struct Reconciler<'a> {
    store: &'a dyn ProductStore,
    index: &'a dyn SearchIndex,
    config: &'a SyncConfig,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        store: &'a dyn ProductStore,
        index: &'a dyn SearchIndex,
        config: &'a SyncConfig,
    ) -> Self {
        Self {
            store,
            index,
            config,
        }
    }

    /// Runs one full pass and closes the store.
    ///
    /// Only a failure to list candidates or to close the store is returned as
    /// an error. Per-record failures are logged and counted, and the loop moves
    /// on to the next record.
    pub async fn run(&self) -> ReconcileResult<RunSummary> {
        let mut metrics = RunMetrics::new();

        let candidates = self.store.find_missing_cross_ref().await?;
        metrics.record_counter(CANDIDATES, candidates.len() as u64);
        info!("🔍 Found {} products to sync…", candidates.len());
        if self.config.dry_run {
            info!("Dry run: no records will be written");
        }

        for e in &candidates.unreadable {
            metrics.incr(FAILED);
            error!("❌ Error syncing product document: {}", e);
        }

        for record in &candidates.records {
            match self.reconcile_record(record).await {
                Ok(ItemOutcome::Linked(id)) => {
                    metrics.incr(LINKED);
                    info!("✅ Synced \"{}\" → {}", record.name, id);
                }
                Ok(ItemOutcome::Planned(id)) => {
                    metrics.incr(PLANNED);
                    info!("📝 Would sync \"{}\" → {}", record.name, id);
                }
                Ok(ItemOutcome::Unmatched) => {
                    metrics.incr(UNMATCHED);
                    warn!("⚠️  No Weaviate object found for name=\"{}\"", record.name);
                }
                Err(e) => {
                    if matches!(e, ReconcileError::Ambiguous { .. }) {
                        metrics.incr(AMBIGUOUS);
                    } else {
                        metrics.incr(FAILED);
                    }
                    error!("❌ Error syncing \"{}\": {}", record.name, e);
                }
            }
        }

        self.store.close().await?;
        debug!("Run metrics: {}", metrics.snapshot());

        let summary = RunSummary::from_metrics(&metrics, self.config.dry_run);
        info!("🎉 Sync complete. {}", summary);
        Ok(summary)
    }

    /// Looks one record up in the index and, unless this is a dry run,
    /// writes the chosen id back.
    pub async fn reconcile_record(&self, record: &ProductRecord) -> ReconcileResult<ItemOutcome> {
        let policy = self.config.match_policy;
        let query = NameQuery {
            class_name: &self.config.class_name,
            field: &self.config.layout.name_field,
            value: &record.name,
            limit: policy.lookup_limit(),
        };

        let ids = self.index.find_ids_by_name(&query).await?;
        debug!("Lookup for \"{}\" returned {} id(s)", record.name, ids.len());

        let id = match policy.select(ids) {
            Selection::NoMatch => return Ok(ItemOutcome::Unmatched),
            Selection::Ambiguous(count) => {
                return Err(ReconcileError::Ambiguous {
                    name: record.name.clone(),
                    count,
                })
            }
            Selection::Chosen(id) => id,
        };

        if self.config.dry_run {
            return Ok(ItemOutcome::Planned(id));
        }

        self.store.set_cross_ref(&record.id, &id).await?;
        Ok(ItemOutcome::Linked(id))
    }
}
