//! jirakit - a small client for the JIRA REST API.
//!
//! ```no_run
//! use jirakit::{Client, ClientConfig};
//!
//! # async fn demo() -> jirakit::Result<()> {
//! let config = ClientConfig::builder("https://jira.example.com/rest/api/2")
//!     .credentials("alice", "secret")
//!     .custom_field("points", "customfield_10002")
//!     .build()?;
//! let client = Client::new(config)?;
//!
//! for issue in client.search().where_eq("assignee", "alice").run().await? {
//!     println!("{}", issue.format("%(id)-10s %(points)3s %(summary)s")?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod issue;
pub mod logging;
pub mod search;

pub use api::{ApiError, Client, HttpTransport, RequestOptions, Transport};
pub use config::{ClientConfig, FieldRule, Profile};
pub use error::{Error, Result};
pub use issue::{Issue, WorkLog};
pub use search::{quote, JqlValue, Search};
