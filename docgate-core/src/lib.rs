//! Core types for docgate
//!
//! This crate provides the error taxonomy, the JSON response envelope and
//! request identifiers used by the HTTP layer.

pub mod error;
pub mod request_id;

pub use error::{ApiError, ApiResponse};
pub use request_id::{RequestId, REQUEST_ID_HEADER};
