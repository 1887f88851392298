//! Wit.ai adapters
//!
//! `message` and `converse` share one [`WitClient`], which handles auth,
//! versioning and timezone injection.

pub mod client;
pub mod converse;
pub mod message;

pub use self::{
    client::{Operation, WitClient},
    converse::WitConverse,
    message::WitMessage,
};
