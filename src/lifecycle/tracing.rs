//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing` subscriber filtered by `RUST_LOG`.
//! Module paths are hidden (`with_target(false)`); every framework event carries a
//! `family` field instead, so lines stay short and still say which resource they concern.
//!
//! ```bash
//! # Lifecycle events only
//! RUST_LOG=info cargo run
//!
//! # Request payloads, retries and every waiter poll
//! RUST_LOG=debug cargo run
//!
//! # Only the framework
//! RUST_LOG=reconcile_framework=debug cargo run
//! ```
//!
//! ## What a create looks like
//!
//! **`RUST_LOG=info`**:
//!
//! ```text
//! INFO Actor started family="quicksight_namespace"
//! INFO provision:create_namespace: Create requested family="quicksight_namespace" id="123456789012,analytics"
//! INFO provision:create_namespace: Created family="quicksight_namespace" id="123456789012,analytics"
//! ```
//!
//! **`RUST_LOG=debug`** adds the payload once at the client and one line per poll:
//!
//! ```text
//! DEBUG provision:create_namespace: Sending request namespace=analytics
//! DEBUG provision:create_namespace: Still waiting status=CREATING target_seen=0
//! ```
//!
//! Retries of transient errors log at `warn`, including the error that triggered them, so
//! a slow IAM propagation is visible without turning on `debug`.

/// Installs the global subscriber. Call once, at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // `family` field identifies the source
        .compact() // spans inline, e.g. "provision:create_namespace"
        .init();
}
