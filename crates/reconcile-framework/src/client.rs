//! # Reconcile Client
//!
//! The cloneable handle for one family's [`ReconcileActor`](crate::actor::ReconcileActor).

use crate::error::ReconcileError;
use crate::family::ResourceFamily;
use crate::message::ReconcileRequest;
use crate::reconciler::{Observed, ResourceState};
use crate::value::Value;
use std::marker::PhantomData;
use tokio::sync::{mpsc, oneshot};

/// Sends requests over an mpsc channel and awaits the reply on a oneshot channel.
///
/// The family parameter only exists at the type level: a `ReconcileClient<DataSet>` can
/// only be obtained from a `ReconcileActor<DataSet>`.
pub struct ReconcileClient<F: ResourceFamily> {
    sender: mpsc::Sender<ReconcileRequest>,
    _family: PhantomData<fn() -> F>,
}

impl<F: ResourceFamily> Clone for ReconcileClient<F> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            _family: PhantomData,
        }
    }
}

impl<F: ResourceFamily> ReconcileClient<F> {
    pub fn new(sender: mpsc::Sender<ReconcileRequest>) -> Self {
        Self {
            sender,
            _family: PhantomData,
        }
    }

    async fn call<T>(
        &self,
        request: impl FnOnce(oneshot::Sender<Result<T, ReconcileError>>) -> ReconcileRequest,
    ) -> Result<T, ReconcileError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| ReconcileError::ActorClosed)?;
        response.await.map_err(|_| ReconcileError::ActorDropped)?
    }

    pub async fn create(&self, declared: Value) -> Result<ResourceState, ReconcileError> {
        self.call(|respond_to| ReconcileRequest::Create {
            declared,
            respond_to,
        })
        .await
    }

    pub async fn read(&self, id: String, prior: Value) -> Result<Observed, ReconcileError> {
        self.call(|respond_to| ReconcileRequest::Read {
            id,
            prior,
            respond_to,
        })
        .await
    }

    pub async fn update(
        &self,
        id: String,
        declared: Value,
        prior: Value,
    ) -> Result<Observed, ReconcileError> {
        self.call(|respond_to| ReconcileRequest::Update {
            id,
            declared,
            prior,
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, id: String) -> Result<(), ReconcileError> {
        self.call(|respond_to| ReconcileRequest::Delete { id, respond_to })
            .await
    }

    pub async fn import(&self, id: String) -> Result<Observed, ReconcileError> {
        self.call(|respond_to| ReconcileRequest::Import { id, respond_to })
            .await
    }
}
