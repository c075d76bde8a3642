//! # QuickSight Reconciler
//!
//! Keeps declared QuickSight resources in sync with the live account, built on the
//! generic engine in `reconcile_framework`.
//!
//! ## Resources
//!
//! | Family | Identity | Create | Update | Delete |
//! |---|---|---|---|---|
//! | [`namespace`] | `account,namespace` | waits for `CREATED` | recorded locally | waits until gone |
//! | [`vpc_connection`] | `account,vpc_connection_id` | waits, retried while the role propagates | waits | waits for `DELETED` |
//! | [`data_source`] | `account,data_source_id` | waits for `CREATION_SUCCESSFUL` | waits, type is fixed | synchronous |
//! | [`data_set`] | `account,data_set_id` | synchronous | synchronous, split per sub-resource | synchronous |
//! | [`ingestion`] | `account,data_set_id,ingestion_id` | waits for `COMPLETED` | not supported | cancels |
//!
//! ## Module Tour
//!
//! ### 1. The Remote API ([`api`])
//! The [`QuickSightApi`](api::QuickSightApi) trait is the only way the families reach the
//! service. [`InMemoryQuickSight`](api::InMemoryQuickSight) implements it with status
//! progression, fault injection and call counting for tests and the demo.
//!
//! ### 2. The Families ([`namespace`], [`vpc_connection`], [`data_source`], [`data_set`], [`ingestion`])
//! Each implements `ResourceFamily`: schema, identity, lifecycle statuses, retry rules,
//! and the describe/create/update/delete calls. Each also defines its error type and a
//! `new(buffer, config)` constructor returning the actor and its client. Grant/revoke
//! diffing shared by the data source and data set families lives in [`permissions`].
//!
//! ### 3. The Interface ([`clients`], [`model`])
//! Typed declarations in [`model`] build the declared value trees; the clients in
//! [`clients`] send them to the actors.
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! [`ReconcileSystem`](lifecycle::ReconcileSystem) spawns one actor per family and shuts
//! them down together. See [`lifecycle::tracing`] for log output.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod api;
pub mod clients;
pub mod data_set;
pub mod data_source;
pub mod ingestion;
pub mod lifecycle;
pub mod model;
pub mod namespace;
pub mod permissions;
pub mod vpc_connection;
