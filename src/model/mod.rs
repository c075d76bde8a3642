//! Typed declarations that build the declared [`Value`](reconcile_framework::Value) trees
//! the clients send.
//!
//! A declaration only sets what the caller set; everything else stays null so the service
//! default applies.

pub mod data_set;
pub mod data_source;
pub mod ingestion;
pub mod namespace;
pub mod vpc_connection;

pub use data_set::*;
pub use data_source::*;
pub use ingestion::*;
pub use namespace::*;
pub use vpc_connection::*;

use reconcile_framework::Value;

fn optional(value: &Option<String>) -> Value {
    value.as_deref().map_or(Value::Null, Value::from)
}
