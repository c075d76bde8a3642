//! # Mock Client
//!
//! `MockClient<F>` hands out a real [`ReconcileClient<F>`] whose requests are answered from
//! a queue of scripted expectations instead of a reconciler. It is meant for unit-testing
//! code that wraps a client (resource-specific clients, orchestration) without a remote API.
//!
//! | | MockClient | Real actor |
//! |---|---|---|
//! | **Remote API** | none | in-memory or real |
//! | **Determinism** | fully scripted | depends on the API fake |
//! | **Error injection** | `return_err` | fault injection in the API fake |
//!
//! ```rust,ignore
//! let mut mock = MockClient::<Namespace>::new();
//! mock.expect_delete("123456789012,sales").return_ok(());
//! mock.expect_read("123456789012,sales").return_ok(Observed::Absent);
//!
//! let client = NamespaceClient::new(mock.client());
//! client.delete("123456789012,sales".into()).await?;
//! mock.verify();
//! ```
//!
//! Requests are matched strictly in order. A request that does not match the next
//! expectation (wrong operation or wrong id) fails the mock task, and the caller sees
//! [`ReconcileError::ActorDropped`].

use crate::client::ReconcileClient;
use crate::error::ReconcileError;
use crate::family::ResourceFamily;
use crate::message::ReconcileRequest;
use crate::reconciler::{Observed, ResourceState};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::error;

// =============================================================================
// EXPECTATIONS
// =============================================================================

enum Expectation {
    Create(Result<ResourceState, ReconcileError>),
    Read(String, Result<Observed, ReconcileError>),
    Update(String, Result<Observed, ReconcileError>),
    Delete(String, Result<(), ReconcileError>),
    Import(String, Result<Observed, ReconcileError>),
}

type Queue = Arc<Mutex<VecDeque<Expectation>>>;

fn lock(queue: &Queue) -> MutexGuard<'_, VecDeque<Expectation>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripted stand-in for a [`ReconcileActor`](crate::actor::ReconcileActor).
pub struct MockClient<F: ResourceFamily> {
    client: ReconcileClient<F>,
    expectations: Queue,
    _handle: tokio::task::JoinHandle<()>,
}

impl<F: ResourceFamily> Default for MockClient<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ResourceFamily> MockClient<F> {
    /// Must be called inside a tokio runtime: the responder runs as a task.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ReconcileRequest>(100);
        let expectations: Queue = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = lock(&queue).pop_front();
                let operation = request.operation();
                let answered = match (request, expectation) {
                    (ReconcileRequest::Create { respond_to, .. }, Some(Expectation::Create(r))) => {
                        respond_to.send(r).is_ok()
                    }
                    (ReconcileRequest::Read { id, respond_to, .. }, Some(Expectation::Read(want, r)))
                        if id == want =>
                    {
                        respond_to.send(r).is_ok()
                    }
                    (
                        ReconcileRequest::Update { id, respond_to, .. },
                        Some(Expectation::Update(want, r)),
                    ) if id == want => respond_to.send(r).is_ok(),
                    (ReconcileRequest::Delete { id, respond_to }, Some(Expectation::Delete(want, r)))
                        if id == want =>
                    {
                        respond_to.send(r).is_ok()
                    }
                    (ReconcileRequest::Import { id, respond_to }, Some(Expectation::Import(want, r)))
                        if id == want =>
                    {
                        respond_to.send(r).is_ok()
                    }
                    _ => {
                        error!(operation, family = F::TYPE_NAME, "Unexpected request");
                        panic!("unexpected {operation} request for {}", F::TYPE_NAME);
                    }
                };
                if !answered {
                    error!(operation, "Caller went away before the response");
                }
            }
        });

        Self {
            client: ReconcileClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    pub fn client(&self) -> ReconcileClient<F> {
        self.client.clone()
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<ResourceState> {
        ExpectationBuilder::new(&self.expectations, Box::new(Expectation::Create))
    }

    pub fn expect_read(&mut self, id: impl Into<String>) -> ExpectationBuilder<Observed> {
        let id = id.into();
        ExpectationBuilder::new(&self.expectations, Box::new(move |r| Expectation::Read(id, r)))
    }

    pub fn expect_update(&mut self, id: impl Into<String>) -> ExpectationBuilder<Observed> {
        let id = id.into();
        ExpectationBuilder::new(&self.expectations, Box::new(move |r| Expectation::Update(id, r)))
    }

    pub fn expect_delete(&mut self, id: impl Into<String>) -> ExpectationBuilder<()> {
        let id = id.into();
        ExpectationBuilder::new(&self.expectations, Box::new(move |r| Expectation::Delete(id, r)))
    }

    pub fn expect_import(&mut self, id: impl Into<String>) -> ExpectationBuilder<Observed> {
        let id = id.into();
        ExpectationBuilder::new(&self.expectations, Box::new(move |r| Expectation::Import(id, r)))
    }

    /// Panics if any expectation was not consumed.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

type Make<T> = Box<dyn FnOnce(Result<T, ReconcileError>) -> Expectation + Send>;

/// Completes an expectation with the response to send back.
pub struct ExpectationBuilder<T> {
    expectations: Queue,
    make: Make<T>,
}

impl<T> ExpectationBuilder<T> {
    fn new(expectations: &Queue, make: Make<T>) -> Self {
        Self {
            expectations: expectations.clone(),
            make,
        }
    }

    pub fn return_ok(self, value: T) {
        let expectation = (self.make)(Ok(value));
        lock(&self.expectations).push_back(expectation);
    }

    pub fn return_err(self, error: ReconcileError) {
        let expectation = (self.make)(Err(error));
        lock(&self.expectations).push_back(expectation);
    }
}
