//! Namespace resource family and its actor.

pub mod error;
pub mod family;

pub use error::*;
pub use family::Namespace;

use crate::clients::NamespaceClient;
use reconcile_framework::{ReconcileActor, ReconcilerConfig};

/// Creates a new namespace actor and its client.
pub fn new(buffer_size: usize, config: ReconcilerConfig) -> (ReconcileActor<Namespace>, NamespaceClient) {
    let (actor, generic_client) = ReconcileActor::new(buffer_size, config);
    (actor, NamespaceClient::new(generic_client))
}
