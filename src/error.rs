//! Unified error handling for the pindrop library.
//!
//! Route-lookup failure is the only failure class the interaction core
//! reacts to, and it is non-fatal by contract: handlers log the error and
//! leave all map state untouched. Everything else here guards the crate's
//! own constructors and the HTTP client.

use std::fmt;

use crate::GpsPoint;

/// Unified error type for pindrop operations.
#[derive(Debug, Clone)]
pub enum NavError {
    /// A polyline had too few valid points to form a route
    EmptyPolyline {
        point_count: usize,
        minimum_required: usize,
    },
    /// A coordinate was outside the valid lat/lng range
    InvalidCoordinates { message: String },
    /// The directions service found no route between the endpoints
    NoRouteFound { from: GpsPoint, to: GpsPoint },
    /// Network or HTTP failure from the directions service
    DirectionsFailed {
        message: String,
        status_code: Option<u16>,
    },
    /// Generic internal error
    Internal { message: String },
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::EmptyPolyline {
                point_count,
                minimum_required,
            } => {
                write!(
                    f,
                    "Polyline has {} valid points, minimum {} required",
                    point_count, minimum_required
                )
            }
            NavError::InvalidCoordinates { message } => {
                write!(f, "Invalid coordinates: {}", message)
            }
            NavError::NoRouteFound { from, to } => {
                write!(
                    f,
                    "No route found from ({:.5}, {:.5}) to ({:.5}, {:.5})",
                    from.latitude, from.longitude, to.latitude, to.longitude
                )
            }
            NavError::DirectionsFailed {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "Directions lookup failed ({}): {}", code, message)
                } else {
                    write!(f, "Directions lookup failed: {}", message)
                }
            }
            NavError::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for NavError {}

/// Result type alias for pindrop operations.
pub type Result<T> = std::result::Result<T, NavError>;
