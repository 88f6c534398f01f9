//! # Ascend Core Storage
//!
//! Narrow filesystem seam used by the configuration subsystem. The
//! [`StorageProvider`] trait abstracts the handful of file operations the
//! config parser and loader need; [`LocalStorageProvider`] implements them
//! over `std::fs`.
pub mod provider;
pub mod local;
pub mod error;

pub use provider::StorageProvider;
pub use local::LocalStorageProvider;
pub use error::StorageSystemError;

#[cfg(test)]
mod tests;
