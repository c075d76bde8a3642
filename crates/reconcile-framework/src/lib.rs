//! # Reconcile Framework
//!
//! Building blocks for keeping a declared description of a remote management-plane object
//! in sync with the live object behind a remote API, across create, read, update and
//! delete.
//!
//! ## Architecture Overview
//!
//! Leaf to root:
//!
//! 1. **Identity** ([`IdentityCodec`]): packs and parses composite keys such as
//!    `123456789012,sales`.
//! 2. **Transcoding** ([`transcode`]): *expand* turns the declared [`Value`] tree into the
//!    remote input shape, *flatten* turns the remote output back into the declared shape.
//!    Both are driven by an [`ObjectSchema`], which also carries the per-field null/empty
//!    collection policy and the exactly-one-of variant nodes.
//! 3. **Retry** ([`RetryClassifier`]): sorts remote errors into transient and permanent.
//! 4. **Waiting** ([`AsyncWaiter`]): polls an object until it reaches a target status.
//! 5. **Reconciling** ([`Reconciler`]): orchestrates the four above for one
//!    [`ResourceFamily`].
//!
//! On top sits a service layer:
//!
//! - [`ReconcileActor`] owns a reconciler and processes requests sequentially.
//! - [`ReconcileClient`] is the cloneable, typed handle to it.
//! - [`FamilyClient`] gives resource clients `read`, `delete` and `import` for free.
//! - [`mock::MockClient`] scripts a client for unit tests.
//!
//! ```text
//!   NamespaceClient ──▶ ReconcileClient<Namespace> ──mpsc──▶ ReconcileActor<Namespace>
//!                                                              │
//!                                                              ▼
//!                                                     Reconciler<Namespace>
//!                                               ┌────────┬─────┴─────┬───────────┐
//!                                          IdentityCodec transcode  RetryClassifier AsyncWaiter
//! ```
//!
//! ## Identity
//!
//! ```rust
//! use reconcile_framework::IdentityCodec;
//!
//! const DATA_SET: IdentityCodec = IdentityCodec::new(',', &["aws_account_id", "data_set_id"]);
//!
//! let id = DATA_SET.pack(&["123456789012", "sales"]).unwrap();
//! assert_eq!(id, "123456789012,sales");
//! assert_eq!(DATA_SET.parse(&id).unwrap(), vec!["123456789012", "sales"]);
//! assert!(DATA_SET.parse("sales").is_err());
//! ```
//!
//! ## Concurrency Model
//!
//! - One actor task per family; requests are handled one at a time.
//! - A [`Reconciler`] used directly is safe to share: operations on the same identity are
//!   serialized by a per-key mutex, different identities proceed in parallel.
//! - Waits are cooperative sleeps; cancellation is checked before every sleep.
//! - Nothing is cached between operations. Every read goes to the remote API.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod config;
pub mod diff;
pub mod error;
pub mod family;
pub mod identity;
pub mod message;
pub mod mock;
pub mod reconciler;
pub mod remote;
pub mod retry;
pub mod schema;
pub mod transcode;
pub mod value;
pub mod waiter;

// Re-export core types for convenience
pub use actor::ReconcileActor;
pub use client::ReconcileClient;
pub use client_trait::FamilyClient;
pub use config::{ReconcilerConfig, RetryPolicy, TimeoutOverrides, Timeouts};
pub use diff::{diff, ChangeSet};
pub use error::ReconcileError;
pub use family::{Lifecycle, ResourceFamily, ACCOUNT_FIELD};
pub use identity::{IdentityCodec, IdentityError};
pub use message::{ReconcileRequest, Response};
pub use reconciler::{Observed, Reconciler, ResourceState};
pub use remote::{ErrorKind, RemoteError};
pub use retry::{retry_transient, ErrorClass, RetryClassifier, RetryRule};
pub use schema::{AttributeNode, CollectionPolicy, Field, FieldMode, ObjectSchema, ScalarType};
pub use transcode::{expand, expand_typed, flatten, flatten_typed, TranscodeError};
pub use value::Value;
pub use waiter::{AsyncWaiter, WaitError, WaitSpec};
