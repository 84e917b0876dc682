use tracing::{info, warn};

use super::EntityService;
use crate::entity::{ExecutionRecord, TestCase, TestCasePatch};
use crate::error::Result;
use crate::store::DataClient;
use crate::types::{EntityId, ExecutionResult, Timestamp};

/// How many times `execute` re-reads after losing a version race
pub const EXECUTE_ATTEMPTS: usize = 3;

impl<C: DataClient<TestCase>> EntityService<TestCase, C> {
    /// Record one run of a test case.
    ///
    /// Appends an [`ExecutionRecord`], sets the status to the result and
    /// stamps `last_executed`. Runs for the same id are serialized, and the
    /// write is conditional on the version that was read, so a writer outside
    /// this service cannot make a record disappear either.
    pub async fn execute(
        &self,
        id: &EntityId,
        result: ExecutionResult,
        notes: Option<String>,
        executed_by: &str,
    ) -> Result<TestCase> {
        let _guard = self.locks.lock(id).await;

        let mut attempt = 1;
        loop {
            let current = self.client.fetch(id).await?;
            let now = Timestamp::now();

            let mut history = current.execution_history.clone();
            history.push(ExecutionRecord::new(
                result,
                notes.clone(),
                executed_by,
                now,
            ));
            let patch = TestCasePatch::execution(history, result.into(), now);

            match self.client.update(id, patch, Some(current.version)).await {
                Ok(updated) => {
                    info!(%id, %result, runs = updated.execution_history.len(), "test case executed");
                    return Ok(updated);
                }
                Err(err) if err.is_conflict() && attempt < EXECUTE_ATTEMPTS => {
                    warn!(%id, attempt, "execution raced another write, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
