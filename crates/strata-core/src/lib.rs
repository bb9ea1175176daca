//! Strata Core — shared keys and errors.
//!
//! This crate provides the foundational types used across all Strata crates.
//! It has no internal Strata dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`ids`]: Key newtypes for categories, content, groups and users

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod ids;

// Re-export key types at crate root for convenience
pub use error::{EntityKind, Error, Result};
pub use ids::{CategoryKey, ContentKey, GroupKey, UserKey};
