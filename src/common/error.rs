//! Game-specific error types.
//!
//! Construction of the hull core and loading of tunables report failures through
//! [`ShipError`]. Systems that can fail return `Result<(), BevyError>` and use `?`.

use std::fmt;

#[derive(Debug)]
pub enum ShipError {
    /// Hex size must be a finite, strictly positive number.
    InvalidHexSize {
        value: f32,
    },

    /// Level thresholds must strictly increase from one level to the next.
    NonIncreasingThreshold {
        /// 1-based level whose threshold broke the ordering.
        level: usize,
        threshold: usize,
        previous: usize,
    },

    /// A collaborator the hull needs was not wired at setup.
    MissingCollaborator {
        context: &'static str,
    },

    /// Tunables file existed but could not be parsed.
    ConfigParse {
        path: String,
        message: String,
    },
}

impl fmt::Display for ShipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShipError::InvalidHexSize { value } => {
                write!(f, "hex size must be finite and > 0, got {value}")
            }
            ShipError::NonIncreasingThreshold {
                level,
                threshold,
                previous,
            } => write!(
                f,
                "level {level} threshold {threshold} does not exceed previous threshold {previous}"
            ),
            ShipError::MissingCollaborator { context } => {
                write!(f, "missing collaborator: {context}")
            }
            ShipError::ConfigParse { path, message } => {
                write!(f, "failed to parse {path}: {message}")
            }
        }
    }
}

impl std::error::Error for ShipError {}

pub type ShipResult<T> = Result<T, ShipError>;
