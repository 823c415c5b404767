//! Flowdock REST and streaming endpoints

pub mod client;
mod flows;
mod inbox;
mod messages;
mod organizations;
mod stream;
mod users;

pub use client::{ClientBuilder, FlowdockClient, RawResponse};
pub use flows::{FlowsApi, FlowsCreateOptions, FlowsListOptions};
pub use inbox::{InboxApi, InboxCreateOptions};
pub use messages::{MessagesApi, MessagesCreateOptions, MessagesListOptions};
pub use organizations::{OrganizationUpdateOptions, OrganizationsApi};
pub use stream::MessageStream;
pub use users::{UserUpdateOptions, UsersApi};

/// Tags go over the wire as one comma-separated value.
fn serialize_tags<S: serde::Serializer>(tags: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&tags.join(","))
}
