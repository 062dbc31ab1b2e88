//! JIRA API client and types.
//!
//! This module provides the interface for communicating with the JIRA REST API.

mod auth;
mod client;
mod error;
mod transport;
pub mod types;

pub use auth::Auth;
pub(crate) use client::ALL_FIELDS;
pub use client::{Client, RequestOptions};
pub use error::{ApiError, BoxError, Result};
pub use transport::{Body, HttpRequest, HttpResponse, HttpTransport, Transport};
