//! Domain models for the dengue risk service

mod horizon;
mod neighborhood;
mod risk;
mod weather;

pub use horizon::*;
pub use neighborhood::*;
pub use risk::*;
pub use weather::*;
