//! Reconciler: existence check, then exactly one of create or update
//!
//! A single record is handled inline. Several records fan out as one task
//! each, bounded by a semaphore. Every task reports `(key, result)` back to
//! the caller, which is the only place the outcome is mutated. A failing or
//! panicking record never stops its siblings.

use futures::FutureExt;
use shared::{NormalizedRecord, RecordKey, SyncError, SyncOutcome};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use store_client::{FulfillmentSource, RemoteResource, RemoteStore, StoreError};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::resolver::ExistenceResolver;

/// Default bound on concurrently running record tasks
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// What was done for a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Created(RemoteResource),
    Updated(RemoteResource),
}

/// Per-record unit of work, cheap to clone into a task
#[derive(Clone)]
struct RecordWorker {
    store: Arc<dyn RemoteStore>,
    resolver: ExistenceResolver,
    fulfillment: Option<Arc<dyn FulfillmentSource>>,
}

impl RecordWorker {
    async fn run(&self, record: NormalizedRecord) -> Result<Dispatch, SyncError> {
        let verdict = self.resolver.resolve_record(&record).await?;

        if verdict.exists {
            let remote_id = verdict
                .remote_id
                .unwrap_or_else(|| record.key().to_string());
            let record = self.prepare_update(record).await?;
            self.store
                .update(&remote_id, &record)
                .await
                .map(Dispatch::Updated)
                .map_err(StoreError::into_call_error)
        } else {
            self.store
                .create(&record)
                .await
                .map(Dispatch::Created)
                .map_err(StoreError::into_call_error)
        }
    }

    /// `run` with a panic turned into a failure for this record only
    async fn run_isolated(&self, record: NormalizedRecord) -> Result<Dispatch, SyncError> {
        AssertUnwindSafe(self.run(record))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(SyncError::remote_call(None, "record task panicked")))
    }

    /// Existing orders carry the fulfillment status known to the backoffice
    async fn prepare_update(&self, record: NormalizedRecord) -> Result<NormalizedRecord, SyncError> {
        let Some(source) = &self.fulfillment else {
            return Ok(record);
        };
        let mut order = match record {
            NormalizedRecord::Order(order) => order,
            other => return Ok(other),
        };

        let status = source
            .fulfillment_status(order.key.as_str())
            .await
            .map_err(StoreError::into_lookup_error)?
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                SyncError::lookup(None, format!("no fulfillment status for order {}", order.key))
            })?;

        order.fulfillment_status = status;
        Ok(NormalizedRecord::Order(order))
    }
}

pub struct Reconciler {
    worker: RecordWorker,
    max_concurrency: usize,
}

impl Reconciler {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            worker: RecordWorker {
                resolver: ExistenceResolver::new(store.clone()),
                store,
                fulfillment: None,
            },
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Source of fulfillment status for orders that already exist
    pub fn with_fulfillment(mut self, source: Arc<dyn FulfillmentSource>) -> Self {
        self.worker.fulfillment = Some(source);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Sync every record; waits for all of them before returning
    pub async fn reconcile(&self, mut records: Vec<NormalizedRecord>) -> SyncOutcome {
        let mut outcome = SyncOutcome::new();

        if records.len() == 1 {
            if let Some(record) = records.pop() {
                let key = record.key().clone();
                let result = self.worker.run_isolated(record).await;
                self.tally(&mut outcome, &key, result);
            }
            return outcome;
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for record in records {
            let worker = self.worker.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let key = record.key().clone();
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => worker.run_isolated(record).await,
                    Err(_) => Err(SyncError::remote_call(None, "record task was not scheduled")),
                };
                (key, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((key, result)) => self.tally(&mut outcome, &key, result),
                Err(e) => {
                    // unreachable while tasks are never aborted and panics are caught
                    tracing::error!(error = %e, "Record task failed to join");
                    outcome.record_failure(
                        "<unknown>",
                        &SyncError::remote_call(None, format!("record task failed: {e}")),
                    );
                }
            }
        }

        outcome
    }

    fn tally(&self, outcome: &mut SyncOutcome, key: &RecordKey, result: Result<Dispatch, SyncError>) {
        let platform = self.worker.store.platform();
        match &result {
            Ok(Dispatch::Created(resource)) => {
                tracing::info!(key = %key, %platform, remote_id = %resource.id, "Record created");
            }
            Ok(Dispatch::Updated(resource)) => {
                tracing::info!(key = %key, %platform, remote_id = %resource.id, "Record updated");
            }
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    %platform,
                    error_kind = %e.kind(),
                    status = ?e.status(),
                    error = %e,
                    "Record sync failed"
                );
            }
        }
        outcome.record(key.as_str(), &result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared::ErrorKind;
    use shared::models::{LineItemRecord, ProductStatus, ProductVisibility};
    use shared::{OrderRecord, Price, ProductRecord};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use store_client::{Platform, StoreResult};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Lookup(String),
        Create(String),
        Update(String, String),
    }

    /// In-memory remote keyed by record key
    #[derive(Default)]
    struct FakeStore {
        resources: Mutex<HashMap<String, String>>,
        fail_create: HashSet<String>,
        fail_lookup: HashSet<String>,
        panic_on: HashSet<String>,
        calls: Mutex<Vec<Call>>,
        search: bool,
        updated_status: Mutex<Vec<String>>,
    }

    impl FakeStore {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls().iter().filter(|c| pred(c)).count()
        }

        fn existing(&self, key: &str) -> Option<RemoteResource> {
            self.resources
                .lock()
                .unwrap()
                .get(key)
                .map(|id| RemoteResource::new(id.clone()))
        }
    }

    #[async_trait]
    impl RemoteStore for FakeStore {
        fn platform(&self) -> Platform {
            if self.search {
                Platform::Storefront
            } else {
                Platform::Backoffice
            }
        }

        async fn fetch_by_key(&self, key: &str) -> StoreResult<Option<RemoteResource>> {
            self.calls.lock().unwrap().push(Call::Lookup(key.into()));
            if self.fail_lookup.contains(key) {
                return Err(StoreError::Decode(format!("lookup of {key}")));
            }
            Ok(self.existing(key))
        }

        async fn search_by_tag(&self, tag: &str) -> StoreResult<Vec<RemoteResource>> {
            self.calls.lock().unwrap().push(Call::Lookup(tag.into()));
            Ok(self.existing(tag).into_iter().collect())
        }

        async fn create(&self, record: &NormalizedRecord) -> StoreResult<RemoteResource> {
            let key = record.key().to_string();
            self.calls.lock().unwrap().push(Call::Create(key.clone()));
            if self.panic_on.contains(&key) {
                panic!("boom on {key}");
            }
            if self.fail_create.contains(&key) {
                return Err(StoreError::Unsupported("create rejected"));
            }
            let id = format!("remote-{key}");
            self.resources.lock().unwrap().insert(key, id.clone());
            Ok(RemoteResource::new(id))
        }

        async fn update(
            &self,
            remote_id: &str,
            record: &NormalizedRecord,
        ) -> StoreResult<RemoteResource> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Update(record.key().to_string(), remote_id.into()));
            if let Some(order) = record.as_order() {
                self.updated_status
                    .lock()
                    .unwrap()
                    .push(order.fulfillment_status.clone());
            }
            Ok(RemoteResource::new(remote_id))
        }
    }

    struct FixedStatus(Option<&'static str>);

    #[async_trait]
    impl FulfillmentSource for FixedStatus {
        async fn fulfillment_status(&self, _order_id: &str) -> StoreResult<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    fn variant(key: &str) -> NormalizedRecord {
        NormalizedRecord::Product(ProductRecord {
            key: RecordKey::new(key).unwrap(),
            display_name: key.into(),
            price: Price::parse("1").unwrap(),
            quantity_on_hand: Some(1),
            in_stock: true,
            status: ProductStatus::Enabled,
            visibility: ProductVisibility::CatalogAndSearch,
            attribute_set_id: 4,
            description: None,
        })
    }

    fn order(key: &str) -> NormalizedRecord {
        NormalizedRecord::Order(OrderRecord {
            key: RecordKey::new(key).unwrap(),
            display_name: format!("Order {key}"),
            email: None,
            fulfillment_status: "unfulfilled".into(),
            line_items: vec![LineItemRecord {
                title: "Mug".into(),
                quantity: 1,
                price: Price::parse("3").unwrap(),
            }],
            total: Price::parse("3").unwrap(),
            shipping: None,
            billing: None,
        })
    }

    fn records(keys: &[&str]) -> Vec<NormalizedRecord> {
        keys.iter().map(|k| variant(k)).collect()
    }

    #[tokio::test]
    async fn failing_record_does_not_block_siblings() {
        let store = Arc::new(FakeStore {
            fail_create: HashSet::from(["tee-M".to_string()]),
            ..Default::default()
        });
        let reconciler = Reconciler::new(store.clone());

        let outcome = reconciler.reconcile(records(&["tee-S", "tee-M", "tee-L"])).await;

        assert_eq!(outcome.attempted, 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].key, "tee-M");
        assert_eq!(outcome.failures[0].error_kind, ErrorKind::RemoteCallError);
        assert_eq!(store.count(|c| matches!(c, Call::Create(_))), 3);
    }

    #[tokio::test]
    async fn second_run_goes_through_update() {
        let store = Arc::new(FakeStore::default());
        let reconciler = Reconciler::new(store.clone());
        let keys = ["tee-S", "tee-M", "tee-L"];

        let first = reconciler.reconcile(records(&keys)).await;
        assert_eq!(first.succeeded, 3);

        let second = reconciler.reconcile(records(&keys)).await;
        assert_eq!(second.succeeded, 3);

        assert_eq!(store.count(|c| matches!(c, Call::Create(_))), 3);
        let updates: HashSet<_> = store
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update(key, remote_id) => Some((key, remote_id)),
                _ => None,
            })
            .collect();
        assert_eq!(updates.len(), 3);
        assert!(updates.contains(&("tee-S".to_string(), "remote-tee-S".to_string())));
    }

    #[tokio::test]
    async fn exactly_one_dispatch_per_record() {
        let store = Arc::new(FakeStore {
            resources: Mutex::new(HashMap::from([("b".to_string(), "rb".to_string())])),
            ..Default::default()
        });
        let reconciler = Reconciler::new(store.clone()).with_max_concurrency(2);

        let outcome = reconciler.reconcile(records(&["a", "b", "c", "d", "e"])).await;
        assert_eq!(outcome.succeeded, 5);

        for key in ["a", "b", "c", "d", "e"] {
            let dispatches = store.count(|c| match c {
                Call::Create(k) | Call::Update(k, _) => k == key,
                Call::Lookup(_) => false,
            });
            assert_eq!(dispatches, 1, "record {key}");
        }
    }

    #[tokio::test]
    async fn lookup_failure_skips_dispatch() {
        let store = Arc::new(FakeStore {
            fail_lookup: HashSet::from(["x".to_string()]),
            ..Default::default()
        });
        let outcome = Reconciler::new(store.clone())
            .reconcile(records(&["x", "y"]))
            .await;

        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failures[0].key, "x");
        // decode failures keep their own kind even during lookup
        assert_eq!(outcome.failures[0].error_kind, ErrorKind::DecodeError);
        assert_eq!(store.count(|c| matches!(c, Call::Create(k) if k == "x")), 0);
    }

    #[tokio::test]
    async fn panicking_record_is_reported_as_failure() {
        let store = Arc::new(FakeStore {
            panic_on: HashSet::from(["bad".to_string()]),
            ..Default::default()
        });
        let outcome = Reconciler::new(store)
            .reconcile(records(&["ok-1", "bad", "ok-2"]))
            .await;

        assert_eq!(outcome.attempted, 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failures[0].key, "bad");
    }

    #[tokio::test]
    async fn panic_on_a_lone_record_is_reported_as_failure() {
        let store = Arc::new(FakeStore {
            search: true,
            panic_on: HashSet::from(["1001".to_string()]),
            ..Default::default()
        });
        let outcome = Reconciler::new(store).reconcile(vec![order("1001")]).await;

        assert_eq!(outcome.attempted, 1);
        assert_eq!(outcome.succeeded, 0);
        assert_eq!(outcome.failures[0].key, "1001");
        assert_eq!(outcome.failures[0].error_kind, ErrorKind::RemoteCallError);
    }

    #[tokio::test]
    async fn empty_input_attempts_nothing() {
        let store = Arc::new(FakeStore::default());
        let outcome = Reconciler::new(store.clone()).reconcile(Vec::new()).await;
        assert_eq!(outcome, SyncOutcome::new());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn new_order_is_created_once() {
        let store = Arc::new(FakeStore {
            search: true,
            ..Default::default()
        });
        let reconciler = Reconciler::new(store.clone())
            .with_fulfillment(Arc::new(FixedStatus(Some("processing"))));

        let outcome = reconciler.reconcile(vec![order("1001")]).await;

        assert_eq!(outcome.succeeded, 1);
        assert_eq!(
            store.calls(),
            vec![Call::Lookup("1001".into()), Call::Create("1001".into())]
        );
    }

    #[tokio::test]
    async fn existing_order_update_carries_backoffice_status() {
        let store = Arc::new(FakeStore {
            search: true,
            resources: Mutex::new(HashMap::from([("1001".to_string(), "555".to_string())])),
            ..Default::default()
        });
        let reconciler = Reconciler::new(store.clone())
            .with_fulfillment(Arc::new(FixedStatus(Some("complete"))));

        let outcome = reconciler.reconcile(vec![order("1001")]).await;

        assert_eq!(outcome.succeeded, 1);
        assert_eq!(
            store.calls().last(),
            Some(&Call::Update("1001".into(), "555".into()))
        );
        assert_eq!(*store.updated_status.lock().unwrap(), vec!["complete".to_string()]);
    }

    #[tokio::test]
    async fn existing_order_without_status_is_a_lookup_error() {
        let store = Arc::new(FakeStore {
            search: true,
            resources: Mutex::new(HashMap::from([("1001".to_string(), "555".to_string())])),
            ..Default::default()
        });
        let reconciler =
            Reconciler::new(store.clone()).with_fulfillment(Arc::new(FixedStatus(None)));

        let outcome = reconciler.reconcile(vec![order("1001")]).await;

        assert_eq!(outcome.failures[0].error_kind, ErrorKind::LookupError);
        assert_eq!(store.count(|c| matches!(c, Call::Update(..))), 0);
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let reconciler = Reconciler::new(Arc::new(FakeStore::default())).with_max_concurrency(0);
        assert_eq!(reconciler.max_concurrency(), 1);
    }
}
