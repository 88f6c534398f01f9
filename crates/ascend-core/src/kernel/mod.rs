//! # Ascend Core Kernel
//!
//! The small nucleus tying the subsystems together: framework constants,
//! the aggregated error type, and [`bootstrap::Application`], the explicit
//! owner of the config loader and plugin manager.

pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
pub use error::{Error, Result};
