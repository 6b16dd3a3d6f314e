//! Error types for the fire model.
//!
//! Mirrors the teacher crate's hand-rolled error style
//! (`simulation::persistence::PersistenceError`): a flat enum with a
//! `Display` impl and `std::error::Error`, no `thiserror`/`anyhow`.

use std::fmt;

/// Failure classes raised by the fire model (spec.md §7).
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A construction-time invariant was violated (non-positive width,
    /// `ht < he`, negative moisture, blank species name, ...).
    InvalidInput { field: String, reason: String },

    /// `Line::origin_on_line` was asked for a ray angle parallel to the
    /// line, or another geometrically impossible configuration arose.
    GeometryFailure { detail: String },

    /// A required parameter key was absent from both the supplied
    /// parameters and the fallback provider.
    MissingFallback { key: String },

    /// A violated internal invariant (non-monotonic segment time steps,
    /// pre-ignition data recorded after ignition). These indicate a bug
    /// in the simulator itself rather than bad input.
    Internal { detail: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidInput { field, reason } => {
                write!(f, "invalid input for `{field}`: {reason}")
            }
            ModelError::GeometryFailure { detail } => write!(f, "geometry failure: {detail}"),
            ModelError::MissingFallback { key } => {
                write!(f, "no value or fallback for parameter `{key}`")
            }
            ModelError::Internal { detail } => write!(f, "internal invariant violated: {detail}"),
        }
    }
}

impl std::error::Error for ModelError {}
