//! af-core: Shared types and traits for AnimForge
//!
//! This crate provides the foundational pieces used across AnimForge:
//! the skeletal evaluator abstraction, stable name→handle resolution,
//! and the core error type.

mod error;
mod evaluator;
mod handle;

pub use error::*;
pub use evaluator::*;
pub use handle::*;
