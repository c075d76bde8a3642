//! # System Lifecycle & Orchestration
//!
//! Starts one [`ReconcileActor`](reconcile_framework::ReconcileActor) per resource family,
//! binds each to the shared [`QuickSightApi`](crate::api::QuickSightApi), and shuts them
//! down together.
//!
//! ```rust,ignore
//! let api: SharedApi = Arc::new(InMemoryQuickSight::new());
//! let system = ReconcileSystem::new(api, SystemConfig::default());
//!
//! let state = system.namespace_client.create_namespace(&declaration).await?;
//! system.data_set_client.read(state.id, state.attributes).await?;
//!
//! system.shutdown().await?;
//! ```
//!
//! ## Shutdown
//!
//! Dropping the clients closes every request channel; each actor finishes the request it
//! is working on and exits its loop. [`ReconcileSystem::cancel`] additionally interrupts
//! waits that are in progress, which then fail with `Cancelled`.

pub mod reconcile_system;
pub mod tracing;

pub use reconcile_system::*;
