//! Batched mutation execution
//!
//! Calls are cut into batches of at most `batch_size`. Calls inside a batch
//! are issued concurrently; batches run one after another. A failed call is
//! recorded and never stops the rest.

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{CanvasMutator, MutationCall};

/// One call that did not go through
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationFailure {
    pub element_id: String,
    pub op: String,
    pub message: String,
}

/// Tally of an executed batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub success_count: usize,
    pub failed_count: usize,
    pub errors: Vec<MutationFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.success_count + self.failed_count
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_count == 0
    }
}

/// Apply every call, `batch_size` at a time. A size of 0 is treated as 1.
pub async fn execute_batches<M>(
    mutator: &M,
    calls: &[MutationCall],
    batch_size: usize,
) -> BatchReport
where
    M: CanvasMutator + ?Sized,
{
    let batch_size = batch_size.max(1);
    let mut report = BatchReport::default();

    for (index, batch) in calls.chunks(batch_size).enumerate() {
        let outcomes = join_all(batch.iter().map(|call| mutator.apply(call))).await;
        for (call, outcome) in batch.iter().zip(outcomes) {
            match outcome {
                Ok(()) => report.success_count += 1,
                Err(err) => {
                    warn!(
                        element_id = call.element_id(),
                        op = call.op_name(),
                        error = %err,
                        "mutation failed"
                    );
                    report.failed_count += 1;
                    report.errors.push(MutationFailure {
                        element_id: call.element_id().to_string(),
                        op: call.op_name().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }
        debug!(batch = index, size = batch.len(), "batch applied");
    }

    info!(
        succeeded = report.success_count,
        failed = report.failed_count,
        "mutations executed"
    );
    report
}
