//! Persistence seam for screening results.
//!
//! Scoring is local and synchronous; only the hand-off to storage is async.
//! Implementations live outside the core, except for the in-memory store
//! in `memory`.

use async_trait::async_trait;

use crate::error::SubmitError;
use crate::questionnaire::QuestionnaireSession;
use crate::report::ScreeningRecord;
use crate::scoring::ScoringEngine;

/// Trait for backends that persist screening records.
#[async_trait]
pub trait ScreeningStore: Send + Sync {
    /// Human-readable store name (e.g. "memory").
    fn name(&self) -> &str;

    /// Append a record. Records are never overwritten.
    async fn save_screening(&self, record: &ScreeningRecord) -> anyhow::Result<()>;

    /// Every record stored for a child, oldest first.
    async fn screenings_for(&self, child_id: &str) -> anyhow::Result<Vec<ScreeningRecord>>;
}

/// Score `session` and persist the result.
///
/// An incomplete session fails before the store is called. If the store
/// fails, its error is returned as `SubmitError::Persistence` and the
/// session is untouched, so the same submission can be retried.
pub async fn submit_screening(
    session: &QuestionnaireSession,
    engine: &ScoringEngine,
    store: &dyn ScreeningStore,
    child_id: &str,
) -> Result<ScreeningRecord, SubmitError> {
    let result = session.submit(engine)?;
    let record = ScreeningRecord::new(
        child_id,
        engine.instrument().id.clone(),
        session.answers().clone(),
        result,
    );

    store
        .save_screening(&record)
        .await
        .map_err(SubmitError::Persistence)?;

    tracing::info!(
        store = store.name(),
        child = child_id,
        record = %record.id,
        risk = %record.result.risk_level,
        "screening saved"
    );
    Ok(record)
}
