//! Core library for building database type-generation plugins.
//!
//! Provides:
//! - `plugin`: wire format for the generator protocol
//! - `runtime`: helper functions for running generator plugins
//! - `schema`: SQL DDL ingestion
//! - `model`: normalized schema objects
//! - `generate`: the type-description generator

pub mod generate;
pub mod model;
pub mod plugin;
pub mod runtime;
pub mod schema;

pub mod prelude {
    pub use crate::plugin::*;
    pub use crate::runtime::*;
    pub use prost::Message;
}
