//! HTTP request handlers

pub mod health;
pub mod prediction;
pub mod risk;

pub use health::*;
pub use prediction::*;
pub use risk::*;
