//! VPC connection resource family and its actor.

pub mod error;
pub mod family;

pub use error::*;
pub use family::VpcConnectionFamily;

use crate::clients::VpcConnectionClient;
use reconcile_framework::{ReconcileActor, ReconcilerConfig};

/// Creates a new VPC connection actor and its client.
pub fn new(
    buffer_size: usize,
    config: ReconcilerConfig,
) -> (ReconcileActor<VpcConnectionFamily>, VpcConnectionClient) {
    let (actor, generic_client) = ReconcileActor::new(buffer_size, config);
    (actor, VpcConnectionClient::new(generic_client))
}
