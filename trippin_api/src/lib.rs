//! Minimal typed client for the TripPin OData V4 sample service.
//!
//! Queries are plain values built with [`EntitySetQuery`] and validated
//! against each entity's property table before any request is sent. The
//! [`Client`] turns them into HTTP requests, single or batched, and
//! materializes the typed records in [`types`].

mod batch;
mod client;
mod errors;
mod query;
pub mod types;
pub use self::batch::{BatchRequest, BatchResponse, BatchSlot, PartResponse};
pub use self::client::{Client, DEFAULT_SERVICE_ROOT};
pub use self::errors::Error;
pub use self::query::{EntitySetQuery, Filter, OrderKey, Query, SortDirection, Value};
