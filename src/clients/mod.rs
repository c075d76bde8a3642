//! Type-safe wrappers around [`ReconcileClient`](reconcile_framework::ReconcileClient).
//!
//! `read`, `delete` and `import` come from [`FamilyClient`](reconcile_framework::FamilyClient);
//! each client adds typed `create`/`update` calls and maps errors to its family's error type.

pub mod data_set_client;
pub mod data_source_client;
pub mod ingestion_client;
pub mod namespace_client;
pub mod vpc_connection_client;

pub use data_set_client::*;
pub use data_source_client::*;
pub use ingestion_client::*;
pub use namespace_client::*;
pub use vpc_connection_client::*;
