//! Core types and configuration for the Rustack storage client layers.
//!
//! This crate provides the pieces shared by the marshalling crates: the
//! environment-driven configuration, the core error type, and the
//! transport-facing response and header types the XML layer consumes.

mod config;
mod error;
mod types;

pub use config::{BodyPolicy, RustackConfig};
pub use error::RustackError;
pub use types::{HeaderDict, HttpResponse};
