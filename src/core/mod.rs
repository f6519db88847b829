//! # Core Module
//!
//! Shared-ownership primitives used by the rest of the engine.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking

/// Shared chunk handles.
pub mod mt_resource;

pub use mt_resource::MtResource;
