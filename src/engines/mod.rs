//! Search backend module
//!
//! Defines the Engine trait and provides a registry for the specialized
//! and general search backends.

mod loader;
mod registry;
mod traits;

// Engine implementations
pub mod factbase;
pub mod google_cse;

pub use loader::EngineLoader;
pub use registry::EngineRegistry;
pub use traits::*;
