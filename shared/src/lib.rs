//! Shared types and computation for the dengue risk service
//!
//! This crate holds everything that does not touch the network or the
//! filesystem: domain models, forecast resampling, feature normalization,
//! model inference and the registries built from loaded artifacts.

pub mod inference;
pub mod models;
pub mod normalizer;
pub mod registry;
pub mod resampler;
pub mod rules;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
