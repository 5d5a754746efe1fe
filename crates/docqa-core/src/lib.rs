//! docqa-core - Core types and traits for the docqa retrieval pipeline
//!
//! This crate provides the foundational types, capability traits, and error
//! handling used throughout the docqa system.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::{QaError, Result};
pub use traits::*;
pub use types::*;
