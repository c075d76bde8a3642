//! Data set resource family and its actor.

pub mod error;
pub mod family;
pub mod schema;

pub use error::*;
pub use family::{DataSet, DataSetInput, DataSetState};

use crate::clients::DataSetClient;
use reconcile_framework::{ReconcileActor, ReconcilerConfig};

/// Creates a new data set actor and its client.
pub fn new(buffer_size: usize, config: ReconcilerConfig) -> (ReconcileActor<DataSet>, DataSetClient) {
    let (actor, generic_client) = ReconcileActor::new(buffer_size, config);
    (actor, DataSetClient::new(generic_client))
}
