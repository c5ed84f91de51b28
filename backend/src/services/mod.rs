//! Business logic services for the dengue risk service

pub mod alert;
pub mod prediction;
pub mod risk;

pub use alert::AlertService;
pub use prediction::PredictionService;
pub use risk::RiskService;
