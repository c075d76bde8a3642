//! Data source resource family and its actor.

pub mod error;
pub mod family;
pub mod schema;

pub use error::*;
pub use family::{DataSource, DataSourceInput, DataSourceState};

use crate::clients::DataSourceClient;
use reconcile_framework::{ReconcileActor, ReconcilerConfig};

/// Creates a new data source actor and its client.
pub fn new(
    buffer_size: usize,
    config: ReconcilerConfig,
) -> (ReconcileActor<DataSource>, DataSourceClient) {
    let (actor, generic_client) = ReconcileActor::new(buffer_size, config);
    (actor, DataSourceClient::new(generic_client))
}
