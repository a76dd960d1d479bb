//! Types Module
//!
//! Canonical data model shared by the decoder pipeline, the vendor mappers
//! and callers.

pub mod common;
pub mod delta;
pub mod response;
pub mod streaming;
pub mod tools;

pub use common::*;
pub use delta::*;
pub use response::*;
pub use streaming::*;
pub use tools::*;
