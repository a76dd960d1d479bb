//! Error Handling Module
//!
//! - Core error type [`LlmError`] and its [`ErrorCategory`]
//! - [`StreamErrorKind`], the per-stream failure taxonomy
//! - Conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use chatflux::error::{LlmError, ErrorCategory};
//!
//! let error = LlmError::api_error(404, "Not found");
//! assert_eq!(error.category(), ErrorCategory::Client);
//! assert!(!error.is_retryable());
//! ```

mod conversions;
pub mod types;

pub use types::*;
