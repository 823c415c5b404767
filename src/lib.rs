//! Client library for the Flowdock team chat API.
//!
//! Typed REST operations over flows, messages, users, organizations and
//! the team inbox, an SSE consumer for live flow events, and an OAuth2
//! helper with a JSON token cache.
//!
//! # Example
//!
//! ```no_run
//! use flowdock::{FlowdockClient, MessagesListOptions, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = FlowdockClient::builder().access_token("token").build()?;
//!
//! let opts = MessagesListOptions {
//!     limit: Some(20),
//!     ..Default::default()
//! };
//! let (messages, _) = client.messages().list("org", "flow", Some(&opts)).await?;
//! for msg in &messages {
//!     println!("{}", msg.content()?);
//! }
//!
//! let mut stream = client.messages().stream("token", "org", "flow").await?;
//! while let Some(msg) = stream.recv().await {
//!     println!("{}", msg?.content()?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod error;
pub mod models;

pub use api::*;
pub use error::{Error, ErrorResponse, Result};
pub use models::*;
