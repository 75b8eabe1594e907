//! Event synchronization: map, resolve, dispatch, aggregate

pub mod reconciler;
pub mod resolver;

pub use reconciler::{DEFAULT_MAX_CONCURRENCY, Dispatch, Reconciler};
pub use resolver::{ExistenceResolver, LookupStrategy};

use crate::mapper::SchemaMapper;
use shared::{SourceEvent, SyncOutcome};

/// Run one source event through the mapper and the reconciler
///
/// Mapping warnings are folded into the outcome as mapping failures, so the
/// outcome accounts for every element of the event.
pub async fn sync_event(
    mapper: &SchemaMapper,
    reconciler: &Reconciler,
    event: &SourceEvent,
) -> SyncOutcome {
    let mapped = mapper.map(event);
    let mut outcome = SyncOutcome::new();

    for warning in &mapped.warnings {
        tracing::warn!(
            key = %warning.key,
            kind = event.kind(),
            reason = %warning.reason,
            "Source element dropped during mapping"
        );
        outcome.record_failure(warning.key.as_str(), &warning.to_error());
    }

    tracing::debug!(
        kind = event.kind(),
        records = mapped.records.len(),
        dropped = mapped.warnings.len(),
        "Event mapped"
    );

    outcome.merge(reconciler.reconcile(mapped.records).await);
    outcome
}
