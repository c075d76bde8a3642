//! Ingestion resource family and its actor.

pub mod error;
pub mod family;

pub use error::*;
pub use family::IngestionFamily;

use crate::clients::IngestionClient;
use reconcile_framework::{ReconcileActor, ReconcilerConfig};

/// Creates a new ingestion actor and its client.
pub fn new(
    buffer_size: usize,
    config: ReconcilerConfig,
) -> (ReconcileActor<IngestionFamily>, IngestionClient) {
    let (actor, generic_client) = ReconcileActor::new(buffer_size, config);
    (actor, IngestionClient::new(generic_client))
}
