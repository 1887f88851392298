//! servicekit: thin async clients for natural-language cloud APIs
//!
//! Each adapter takes text plus optional context, makes one vendor call and
//! hands back the vendor's JSON (or a corrected string, for spell checking).
//! Failures surface as [`ServiceKitError`].

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

pub mod cli;
pub mod config;
pub mod error;
pub mod services;

// Re-exports for convenience
pub use error::{Result, ServiceKitError};
