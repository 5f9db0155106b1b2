//! `caregate-core`: shared building blocks for the caregate workspace.
//!
//! This crate contains **pure** primitives (no HTTP, no storage).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::SubjectId;
