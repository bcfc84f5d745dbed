//! Shared types for the price oracle proxy.
//!
//! Everything that crosses a crate boundary lives here: identifiers and the
//! fixed-point price unit, the error types returned by mutating operations,
//! the collaborator traits consumed by the resolver and the adapter
//! configuration shape used to build them.

pub mod common;
pub mod configs;
pub mod errors;
pub mod feeds;

pub use common::*;
pub use configs::*;
pub use errors::*;
pub use feeds::*;
