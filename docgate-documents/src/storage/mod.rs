//! Object storage backends

mod ephemeral;
mod s3;
mod traits;

#[cfg(test)]
mod tests;

pub use ephemeral::EphemeralStorage;
pub use s3::{S3Config, S3Storage};
pub use traits::{public_url, DocumentStorage, StorageError, DEFAULT_STORAGE_HOST};
