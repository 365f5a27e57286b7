//! Document gateway endpoints for docgate
//!
//! This crate provides the upload/delete handlers and the object storage
//! backends they write to.

pub mod handlers;
pub mod policy;
pub mod storage;

pub use handlers::{routes, DocumentState};
pub use policy::{KeyRule, UploadPolicy};
