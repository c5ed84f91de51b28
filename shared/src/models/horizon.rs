//! Analysis horizons

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Spacing between consecutive forecast steps, in hours
pub const STEP_HOURS: usize = 3;

/// Forecast lookahead window analysed by one of the sequence models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "1")]
    OneDay,
    #[serde(rename = "3")]
    ThreeDays,
    #[serde(rename = "5")]
    FiveDays,
}

/// Requested horizon identifier is not one of "1", "3" or "5"
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid analysis period '{0}', expected one of '1', '3' or '5'")]
pub struct InvalidHorizon(pub String);

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::OneDay, Horizon::ThreeDays, Horizon::FiveDays];

    /// Resolve a horizon from its request identifier
    pub fn resolve(id: &str) -> Result<Self, InvalidHorizon> {
        match id {
            "1" => Ok(Horizon::OneDay),
            "3" => Ok(Horizon::ThreeDays),
            "5" => Ok(Horizon::FiveDays),
            other => Err(InvalidHorizon(other.to_string())),
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Horizon::OneDay => "1",
            Horizon::ThreeDays => "3",
            Horizon::FiveDays => "5",
        }
    }

    /// Number of calendar days covered
    pub fn days(&self) -> usize {
        match self {
            Horizon::OneDay => 1,
            Horizon::ThreeDays => 3,
            Horizon::FiveDays => 5,
        }
    }

    /// Number of 3-hour forecast steps the horizon's model consumes
    pub fn sequence_length(&self) -> usize {
        self.days() * 24 / STEP_HOURS
    }

    /// Human readable period, e.g. "3 dia(s)"
    pub fn label(&self) -> String {
        format!("{} dia(s)", self.id())
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
