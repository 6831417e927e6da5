//! cinebook HTTP client
//!
//! Typed access to the booking service's REST API, with a persistent token
//! store and transparent access-token refresh on authorization failures.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod token_store;
pub mod types;
pub mod validation;

pub use client::{BookingClient, BookingClientBuilder, PendingRequest, Routes};
pub use client::error::{ApiError, ClientError};
pub use token_store::{AuthChange, TokenStore, TokenStoreError};
pub use types::TokenPair;
pub use validation::ValidationError;
