//! Library layer for the TripPin demo: configured client, retry policy,
//! local query evaluation, and the demonstration scenarios.
//!
//! Wraps the `trippin_api` crate with configuration read from the
//! environment and an opt-in retry policy. Nothing here talks to the network
//! except through [`TripPinClient`].

pub mod client;
pub mod config;
pub mod error;
pub mod local;
pub mod retry;
pub mod scenarios;
pub mod validation;

pub use trippin_api;
pub use trippin_api::types;
pub use trippin_api::{
    BatchRequest, BatchResponse, BatchSlot, EntitySetQuery, Filter, OrderKey, Query,
    SortDirection, Value,
};

pub use client::TripPinClient;
pub use config::ClientConfig;
pub use error::TripPinError;
pub use retry::RetryPolicy;
