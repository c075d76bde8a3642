use crate::api::SharedApi;
use crate::clients::{
    DataSetClient, DataSourceClient, IngestionClient, NamespaceClient, VpcConnectionClient,
};
use reconcile_framework::{Reconciler, ReconcilerConfig, ResourceFamily};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Settings shared by every family actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub reconciler: ReconcilerConfig,
    /// Request channel capacity per actor.
    pub channel_buffer: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            reconciler: ReconcilerConfig::default(),
            channel_buffer: 32,
        }
    }
}

impl SystemConfig {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            reconciler: ReconcilerConfig::new(account_id),
            ..Self::default()
        }
    }

    /// Reads a configuration document; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The runtime orchestrator: one actor per QuickSight resource family.
pub struct ReconcileSystem {
    pub namespace_client: NamespaceClient,
    pub vpc_connection_client: VpcConnectionClient,
    pub data_source_client: DataSourceClient,
    pub data_set_client: DataSetClient,
    pub ingestion_client: IngestionClient,

    cancel: CancellationToken,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

/// A reconciler bound to the shared API whose waits stop when `cancel` fires.
fn reconciler<F>(
    api: &SharedApi,
    config: &ReconcilerConfig,
    cancel: &CancellationToken,
) -> Reconciler<F>
where
    F: ResourceFamily<Context = SharedApi>,
{
    Reconciler::new(api.clone(), config.clone()).with_cancellation(cancel.child_token())
}

impl ReconcileSystem {
    /// Spawns every actor. Must be called inside a tokio runtime.
    pub fn new(api: SharedApi, config: SystemConfig) -> Self {
        let SystemConfig {
            reconciler: config,
            channel_buffer,
        } = config;
        let cancel = CancellationToken::new();

        let (namespace_actor, namespace_client) =
            crate::namespace::new(channel_buffer, config.clone());
        let (vpc_connection_actor, vpc_connection_client) =
            crate::vpc_connection::new(channel_buffer, config.clone());
        let (data_source_actor, data_source_client) =
            crate::data_source::new(channel_buffer, config.clone());
        let (data_set_actor, data_set_client) =
            crate::data_set::new(channel_buffer, config.clone());
        let (ingestion_actor, ingestion_client) =
            crate::ingestion::new(channel_buffer, config.clone());

        let handles = vec![
            tokio::spawn(namespace_actor.run_with(reconciler(&api, &config, &cancel))),
            tokio::spawn(vpc_connection_actor.run_with(reconciler(&api, &config, &cancel))),
            tokio::spawn(data_source_actor.run_with(reconciler(&api, &config, &cancel))),
            tokio::spawn(data_set_actor.run_with(reconciler(&api, &config, &cancel))),
            tokio::spawn(ingestion_actor.run_with(reconciler(&api, &config, &cancel))),
        ];
        info!(account_id = %config.account_id, actors = handles.len(), "System started");

        Self {
            namespace_client,
            vpc_connection_client,
            data_source_client,
            data_set_client,
            ingestion_client,
            cancel,
            handles,
        }
    }

    /// Interrupts every wait in progress. Requests keep being accepted.
    pub fn cancel(&self) {
        info!("Cancelling in-flight waits");
        self.cancel.cancel();
    }

    /// Drops all clients and waits for every actor to exit.
    ///
    /// Fails if an actor task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        // Dropping the clients closes the channels; each actor sees `None` and exits.
        drop(self.namespace_client);
        drop(self.vpc_connection_client);
        drop(self.data_source_client);
        drop(self.data_set_client);
        drop(self.ingestion_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_config_defaults_fill_missing_keys() {
        let config = SystemConfig::from_json(
            r#"{"reconciler": {"account_id": "123456789012", "min_poll_interval_ms": 250}}"#,
        )
        .unwrap();

        assert_eq!(config.channel_buffer, 32);
        assert_eq!(config.reconciler.account_id, "123456789012");
        assert_eq!(config.reconciler.min_poll_interval(), Duration::from_millis(250));
        assert_eq!(config.reconciler.retry.budget(), Duration::from_secs(120));
    }
}
