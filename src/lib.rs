//! SHELF Application Library
//!
//! This library provides the application modules for the SHELF book service.

pub mod modules;

/// Re-export commonly used types
pub use modules::*;
