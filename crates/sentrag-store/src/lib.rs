//! sentrag-store
//!
//! Client for a document store that exposes insert and search over HTTP under
//! `/databases/{db}/tables/{table}/docs`. Search rows come back in the store's
//! nested column shape; `response` flattens them into [`SearchHit`]s so
//! nothing outside this crate sees that shape.
//!
//! [`SearchHit`]: sentrag_core::types::SearchHit

pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod schema;

pub use client::InfinityStore;
pub use error::StoreError;
pub use request::{FusionMethod, MatchClause, MetricType, SearchRequest};
