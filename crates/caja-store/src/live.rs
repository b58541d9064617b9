//! # Reactive Query Engine
//!
//! Registered read queries are recomputed whenever a table they depend on
//! changes, and subscribers receive the new result through a watch
//! channel.
//!
//! ## Guarantees
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  write op (one logical unit, may touch several tables)        │
//! │       │  commits durably                                      │
//! │       ▼                                                       │
//! │  publish(ChangeSet{Sales, Products})  ← ONE call per unit     │
//! │       │                                                       │
//! │       ▼                                                       │
//! │  every registered query whose deps intersect the changeset    │
//! │  is recomputed sequentially, awaited by the writer while it   │
//! │  still holds its turn                                         │
//! │       │                                                       │
//! │       ▼                                                       │
//! │  subscribers observe the new result - never a partial view    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Notification therefore happens only after the underlying writes are
//! committed, and a multi-table operation (sale-commit writing the sale
//! plus several stock updates) produces exactly one recomputation wave.
//!
//! Recompute failures keep the last good value and log a warning.

use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::error::StoreResult;

// =============================================================================
// Tables and Change Sets
// =============================================================================

/// The tables a query can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Table {
    Products,
    Sales,
    Categories,
    Units,
    Users,
    Config,
    DailyCash,
}

/// The set of tables touched by one committed logical operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet(BTreeSet<Table>);

impl ChangeSet {
    /// A changeset touching a single table.
    pub fn single(table: Table) -> Self {
        ChangeSet(BTreeSet::from([table]))
    }

    /// A changeset touching the given tables.
    pub fn of(tables: &[Table]) -> Self {
        ChangeSet(tables.iter().copied().collect())
    }

    /// Every table; used by bulk import.
    pub fn all() -> Self {
        ChangeSet::of(&[
            Table::Products,
            Table::Sales,
            Table::Categories,
            Table::Units,
            Table::Users,
            Table::Config,
            Table::DailyCash,
        ])
    }

    /// True when any dependency is in the changeset.
    pub fn intersects(&self, deps: &BTreeSet<Table>) -> bool {
        deps.iter().any(|t| self.0.contains(t))
    }
}

// =============================================================================
// Subscriptions
// =============================================================================

type RecomputeFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Recompute = Box<dyn Fn() -> RecomputeFuture + Send + Sync>;

struct Subscription {
    deps: BTreeSet<Table>,
    recompute: Recompute,
    closed: Box<dyn Fn() -> bool + Send + Sync>,
}

/// A live view handle: the current result plus change notifications.
///
/// Dropping the handle unsubscribes; the engine prunes closed
/// subscriptions on the next publish.
#[derive(Debug, Clone)]
pub struct LiveQuery<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> LiveQuery<T> {
    /// The most recently computed result.
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits for the next recomputation. Returns false if the engine
    /// was dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Registry of live queries and the publish fan-out.
#[derive(Default)]
pub struct LiveQueryEngine {
    subs: Mutex<Vec<Subscription>>,
}

impl LiveQueryEngine {
    pub fn new() -> Self {
        LiveQueryEngine {
            subs: Mutex::new(Vec::new()),
        }
    }

    /// Registers a query with its table dependencies.
    ///
    /// The query runs once immediately to produce the initial value;
    /// afterwards it reruns on every publish whose changeset intersects
    /// `deps`.
    pub async fn register<T, F, Fut>(&self, deps: &[Table], query: F) -> StoreResult<LiveQuery<T>>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
    {
        let initial = query().await?;
        let (tx, rx) = watch::channel(initial);
        let tx = Arc::new(tx);
        let query = Arc::new(query);

        let closed_tx = Arc::clone(&tx);
        let recompute: Recompute = Box::new(move || {
            let tx = Arc::clone(&tx);
            let query = Arc::clone(&query);
            Box::pin(async move {
                match query().await {
                    Ok(value) => {
                        let _ = tx.send(value);
                    }
                    Err(err) => {
                        warn!(error = %err, "Live query recompute failed, keeping last value");
                    }
                }
            })
        });

        let mut subs = self.subs.lock().await;
        subs.push(Subscription {
            deps: deps.iter().copied().collect(),
            recompute,
            closed: Box::new(move || closed_tx.is_closed()),
        });
        debug!(subscriptions = subs.len(), "Live query registered");

        Ok(LiveQuery { rx })
    }

    /// Recomputes every affected query, sequentially, within the
    /// caller's turn. Called exactly once per committed logical write.
    pub async fn publish(&self, changes: &ChangeSet) {
        let mut subs = self.subs.lock().await;
        subs.retain(|s| !(s.closed)());

        for sub in subs.iter() {
            if changes.intersects(&sub.deps) {
                (sub.recompute)().await;
            }
        }
    }

    /// Number of open subscriptions (diagnostics; counts stale entries
    /// until the next publish prunes them).
    pub async fn subscription_count(&self) -> usize {
        self.subs.lock().await.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn counting_source() -> (Arc<AtomicI64>, impl Fn() -> RecomputeSourceFut + Send + Sync) {
        let source = Arc::new(AtomicI64::new(1));
        let reader = Arc::clone(&source);
        (source, move || {
            let reader = Arc::clone(&reader);
            let fut: RecomputeSourceFut =
                Box::pin(async move { Ok(reader.load(Ordering::SeqCst)) });
            fut
        })
    }

    type RecomputeSourceFut = Pin<Box<dyn Future<Output = StoreResult<i64>> + Send>>;

    #[tokio::test]
    async fn test_register_computes_initial_value() {
        let engine = LiveQueryEngine::new();
        let (_, query) = counting_source();

        let view = engine.register(&[Table::Sales], query).await.unwrap();
        assert_eq!(view.current(), 1);
    }

    #[tokio::test]
    async fn test_publish_recomputes_only_dependent_queries() {
        let engine = LiveQueryEngine::new();
        let (source, query) = counting_source();

        let view = engine.register(&[Table::Sales], query).await.unwrap();
        source.store(42, Ordering::SeqCst);

        // A products-only change must not touch a sales-dependent view.
        engine.publish(&ChangeSet::single(Table::Products)).await;
        assert_eq!(view.current(), 1);

        engine.publish(&ChangeSet::single(Table::Sales)).await;
        assert_eq!(view.current(), 42);
    }

    #[tokio::test]
    async fn test_multi_table_changeset_hits_overlapping_deps() {
        let engine = LiveQueryEngine::new();
        let (source, query) = counting_source();

        let view = engine.register(&[Table::Products], query).await.unwrap();
        source.store(7, Ordering::SeqCst);

        engine
            .publish(&ChangeSet::of(&[Table::Sales, Table::Products]))
            .await;
        assert_eq!(view.current(), 7);
    }

    #[tokio::test]
    async fn test_dropped_subscriptions_are_pruned() {
        let engine = LiveQueryEngine::new();
        let (_, query) = counting_source();

        let view = engine.register(&[Table::Sales], query).await.unwrap();
        assert_eq!(engine.subscription_count().await, 1);

        drop(view);
        engine.publish(&ChangeSet::single(Table::Sales)).await;
        assert_eq!(engine.subscription_count().await, 0);
    }
}
