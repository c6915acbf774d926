//! Foundation module - Core utilities and types
//!
//! - Math types and operations
//! - Collections
//! - Time management
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
