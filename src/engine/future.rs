//! Forward-reference futures ("return references") between scheduled units.
//!
//! A job that has not run yet can still hand out a handle to its eventual
//! result — the same role `.rv()` plays on a Toil Job. `JobFuture<T>` wraps
//! a `tokio::sync::oneshot` receiver in a `futures::future::Shared` clone so
//! many dependents can each await the same producer without consuming it.

use futures::future::{FutureExt, Shared};
use std::fmt;
use tokio::sync::oneshot;

use crate::engine::error::EngineError;

type BoxedSharedResult<T> = Shared<
    futures::future::BoxFuture<'static, Result<T, SharedEngineError>>,
>;

/// `EngineError` isn't `Clone` (it wraps trait-object errors), so a `Shared`
/// future clones a lightweight string-based stand-in instead.
#[derive(Clone, Debug)]
pub struct SharedEngineError(pub String);

impl fmt::Display for SharedEngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SharedEngineError {}

impl From<EngineError> for SharedEngineError {
    fn from(e: EngineError) -> Self {
        SharedEngineError(e.to_string())
    }
}

/// A cloneable, awaitable reference to a value another scheduled unit will
/// eventually produce.
#[derive(Clone)]
pub struct JobFuture<T: Clone + Send + Sync + 'static> {
    inner: BoxedSharedResult<T>,
}

/// The sending half, held by the producing job until it finishes.
pub struct JobPromise<T> {
    sender: Option<oneshot::Sender<Result<T, SharedEngineError>>>,
}

impl<T: Clone + Send + Sync + 'static> JobPromise<T> {
    /// Resolve the future with either the produced value or the error that
    /// prevented production. Dependents awaiting the paired `JobFuture` see
    /// the same outcome.
    pub fn resolve(mut self, result: Result<T, EngineError>) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(result.map_err(SharedEngineError::from));
        }
    }
}

impl<T> Drop for JobPromise<T> {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Err(SharedEngineError(
                "producing job was dropped before resolving its result".to_string(),
            )));
        }
    }
}

/// Create a linked `(JobPromise, JobFuture)` pair, analogous to scheduling a
/// unit and immediately being handed its return reference.
pub fn job_future<T: Clone + Send + Sync + 'static>() -> (JobPromise<T>, JobFuture<T>) {
    let (tx, rx) = oneshot::channel::<Result<T, SharedEngineError>>();
    let shared = rx
        .map(|res| {
            res.unwrap_or_else(|_| {
                Err(SharedEngineError(
                    "producing job's promise was dropped".to_string(),
                ))
            })
        })
        .boxed()
        .shared();
    (JobPromise { sender: Some(tx) }, JobFuture { inner: shared })
}

impl<T: Clone + Send + Sync + 'static> JobFuture<T> {
    /// Await the value, translating a dropped-producer or producer-error
    /// outcome back into an `EngineError`.
    pub async fn get(&self) -> Result<T, EngineError> {
        self.inner
            .clone()
            .await
            .map_err(|e| EngineError::Scheduling { message: e.0 })
    }

    /// An already-resolved future, useful for wrapping values computed
    /// eagerly (e.g. the workflow's seed environment) behind the same
    /// interface as a scheduled unit's output.
    pub fn ready(value: T) -> Self {
        let fut = futures::future::ready(Ok(value)).boxed().shared();
        JobFuture { inner: fut }
    }
}
