//! Data models for Flowdock entities

mod content;
mod flow;
mod message;
mod organization;
mod user;

pub use content::*;
pub use flow::*;
pub use message::*;
pub use organization::*;
pub use user::*;
