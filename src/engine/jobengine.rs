//! In-process stand-in for the external distributed job engine.
//!
//! Real deployments hand scheduled units to a cluster scheduler; this crate
//! treats that scheduler as an out-of-scope collaborator and substitutes the
//! simplest thing that honors the same contract: submit an async unit of
//! work together with a label, get back a `JobFuture` for its eventual
//! result, and have completions optionally persisted for `--restart`. Built
//! on `tokio::spawn`, the same task-per-unit of concurrency the teacher uses
//! for container lifecycle management in `runtime::container`.

use crate::engine::checkpoint::CheckpointLog;
use crate::engine::error::EngineError;
use crate::engine::future::{job_future, JobFuture};
use std::future::Future;
use std::sync::Arc;

/// Schedules units of work, optionally checkpointing their completions.
#[derive(Clone)]
pub struct JobEngine {
    checkpoint: Option<Arc<CheckpointLog>>,
    verbose: bool,
}

impl JobEngine {
    pub fn new(checkpoint: Option<Arc<CheckpointLog>>, verbose: bool) -> Self {
        Self {
            checkpoint,
            verbose,
        }
    }

    pub fn checkpoint(&self) -> Option<&Arc<CheckpointLog>> {
        self.checkpoint.as_ref()
    }

    /// Submit an asynchronous unit of work under `label`. The returned
    /// future resolves once the unit completes; dependents awaiting it do
    /// not block the engine from scheduling unrelated units in the
    /// meantime, since each submission runs on its own tokio task.
    pub fn submit<F, T>(&self, label: String, fut: F) -> JobFuture<T>
    where
        F: Future<Output = Result<T, EngineError>> + Send + 'static,
        T: Clone + Send + Sync + 'static,
    {
        let (promise, future) = job_future::<T>();
        let verbose = self.verbose;
        tokio::spawn(async move {
            if verbose {
                eprintln!("[engine] starting {}", label);
            }
            let result = fut.await;
            if verbose {
                match &result {
                    Ok(_) => eprintln!("[engine] finished {}", label),
                    Err(e) => eprintln!("[engine] failed {}: {}", label, e),
                }
            }
            promise.resolve(result);
        });
        future
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn submitted_unit_resolves_with_its_value() {
        let engine = JobEngine::new(None, false);
        let future = engine.submit("unit-a".to_string(), async { Ok::<_, EngineError>(10) });
        assert_eq!(future.get().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn independent_units_run_concurrently() {
        let engine = JobEngine::new(None, false);
        let a = engine.submit("a".to_string(), async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok::<_, EngineError>(1)
        });
        let b = engine.submit("b".to_string(), async { Ok::<_, EngineError>(2) });
        assert_eq!(b.get().await.unwrap(), 2);
        assert_eq!(a.get().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_unit_propagates_error_to_dependent() {
        let engine = JobEngine::new(None, false);
        let future = engine.submit("unit-err".to_string(), async {
            Err::<i32, _>(EngineError::Scheduling {
                message: "boom".to_string(),
            })
        });
        assert!(future.get().await.is_err());
    }
}
