//! # Pindrop
//!
//! Platform-independent interaction core for a single-screen map app:
//! live-location follow mode plus long-press destination routing.
//!
//! The crate owns no widgets and performs no rendering. The platform shell
//! feeds user and location events into a [`MapSession`] and drains a stream
//! of [`MapCommand`] values that it executes against the native map view
//! (center camera, add annotation, draw overlay, pause location updates).
//! The driving-route computation itself is delegated to an external
//! directions service; an OSRM-compatible client ships behind the `http`
//! feature.
//!
//! ## Features
//!
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`http`** - Enable the async directions client
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use pindrop::{GpsPoint, MapEvent, MapSession};
//!
//! let mut session = MapSession::new();
//!
//! // A location fix arrives, then the user long-presses a destination.
//! session.handle(MapEvent::LocationUpdated(GpsPoint::new(51.5074, -0.1278)));
//! session.handle(MapEvent::LongPress(GpsPoint::new(51.5007, -0.1246)));
//!
//! // The shell executes the resulting commands against the native map.
//! for command in session.take_commands() {
//!     println!("{command:?}");
//! }
//! ```

use geo::{algorithm::simplify::Simplify, Coord, LineString};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{NavError, Result};

// Geographic utilities (distance calculations)
pub mod geo_utils;

// Map display command stream drained by the platform shell
pub mod commands;
pub use commands::{CommandQueue, MapCommand, OverlayId};

// Follow-mode controller (camera tracking state machine)
pub mod follow;
pub use follow::{FollowController, FollowIcon, FollowState};

// Route session (destination pick, lookup lifecycle, clear)
pub mod route;
pub use route::{RoutePhase, RouteSession, CAMERA_FIT_PADDING, DESTINATION_TITLE};

// Event dispatch, session singleton and FFI surface
pub mod session;
pub use session::{with_session, MapEvent, MapSession, SessionStats, SESSION};

// HTTP directions client (OSRM-compatible)
#[cfg(feature = "http")]
pub mod directions;
#[cfg(feature = "http")]
pub use directions::DirectionsClient;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("PindropRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use pindrop::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding region of a route, used to fit the camera after a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Expand the bounds by a fraction of their span on every side,
    /// so a fitted route does not touch the screen edges.
    pub fn padded(&self, fraction: f64) -> Self {
        let lat_pad = (self.max_lat - self.min_lat) * fraction;
        let lng_pad = (self.max_lng - self.min_lng) * fraction;
        Self {
            min_lat: (self.min_lat - lat_pad).max(-90.0),
            max_lat: (self.max_lat + lat_pad).min(90.0),
            min_lng: (self.min_lng - lng_pad).max(-180.0),
            max_lng: (self.max_lng + lng_pad).min(180.0),
        }
    }
}

/// Transport mode requested from the directions service.
///
/// The app itself only ever requests [`TravelMode::Driving`]; the other
/// modes exist because the external contract supports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum TravelMode {
    Driving,
    Walking,
    Cycling,
}

impl TravelMode {
    /// Profile name understood by OSRM-compatible endpoints.
    pub fn profile(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Cycling => "cycling",
        }
    }
}

/// A computed route returned by the directions service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Route {
    /// Ordered polyline from source to destination.
    pub polyline: Vec<GpsPoint>,
    /// Total distance in meters.
    pub distance_m: f64,
    /// Expected travel time in seconds.
    pub duration_s: f64,
    /// Pre-computed bounding region for camera fitting.
    pub bounds: Bounds,
}

impl Route {
    /// Build a route from a raw polyline, filtering invalid points.
    ///
    /// Returns an error if fewer than 2 valid points remain.
    pub fn from_polyline(points: Vec<GpsPoint>, distance_m: f64, duration_s: f64) -> Result<Self> {
        let polyline: Vec<GpsPoint> = points.into_iter().filter(|p| p.is_valid()).collect();

        if polyline.len() < 2 {
            return Err(NavError::EmptyPolyline {
                point_count: polyline.len(),
                minimum_required: 2,
            });
        }

        let bounds = Bounds::from_points(&polyline).ok_or_else(|| NavError::Internal {
            message: "bounds of non-empty polyline".to_string(),
        })?;

        Ok(Self {
            polyline,
            distance_m,
            duration_s,
            bounds,
        })
    }

    /// Douglas-Peucker simplification of the polyline for overlay
    /// rendering. Tolerance is in degrees (0.0001 is roughly 11 meters).
    pub fn simplified_polyline(&self, tolerance: f64) -> Vec<GpsPoint> {
        let coords: Vec<Coord> = self
            .polyline
            .iter()
            .map(|p| Coord {
                x: p.longitude,
                y: p.latitude,
            })
            .collect();

        let line = LineString::new(coords);
        let simplified = line.simplify(&tolerance);

        simplified.0.iter().map(|c| GpsPoint::new(c.y, c.x)).collect()
    }

    /// Total length of the polyline in meters, computed point-to-point.
    ///
    /// Usually close to `distance_m` but not identical: the service
    /// reports road distance, this measures the drawn geometry.
    pub fn polyline_length(&self) -> f64 {
        geo_utils::track_length(&self.polyline)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_polyline() -> Vec<GpsPoint> {
        vec![
            GpsPoint::new(51.5074, -0.1278),
            GpsPoint::new(51.5080, -0.1290),
            GpsPoint::new(51.5090, -0.1300),
            GpsPoint::new(51.5100, -0.1310),
            GpsPoint::new(51.5110, -0.1320),
        ]
    }

    #[test]
    fn test_gps_point_validation() {
        assert!(GpsPoint::new(51.5074, -0.1278).is_valid());
        assert!(!GpsPoint::new(91.0, 0.0).is_valid());
        assert!(!GpsPoint::new(0.0, 181.0).is_valid());
        assert!(!GpsPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = Bounds::from_points(&sample_polyline()).unwrap();
        assert_eq!(bounds.min_lat, 51.5074);
        assert_eq!(bounds.max_lat, 51.5110);
        assert_eq!(bounds.min_lng, -0.1320);
        assert_eq!(bounds.max_lng, -0.1278);

        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_padding() {
        let bounds = Bounds::from_points(&sample_polyline()).unwrap();
        let padded = bounds.padded(0.1);
        assert!(padded.min_lat < bounds.min_lat);
        assert!(padded.max_lat > bounds.max_lat);
        assert!(padded.min_lng < bounds.min_lng);
        assert!(padded.max_lng > bounds.max_lng);

        let center = bounds.center();
        let padded_center = padded.center();
        assert!((center.latitude - padded_center.latitude).abs() < 1e-9);
        assert!((center.longitude - padded_center.longitude).abs() < 1e-9);
    }

    #[test]
    fn test_route_from_polyline() {
        let route = Route::from_polyline(sample_polyline(), 520.0, 95.0).unwrap();
        assert_eq!(route.polyline.len(), 5);
        assert_eq!(route.distance_m, 520.0);
        assert!(route.polyline_length() > 0.0);
    }

    #[test]
    fn test_route_rejects_degenerate_polyline() {
        let result = Route::from_polyline(vec![GpsPoint::new(51.5, -0.1)], 0.0, 0.0);
        assert!(matches!(result, Err(NavError::EmptyPolyline { .. })));

        // Invalid points are filtered before the length check
        let result = Route::from_polyline(
            vec![GpsPoint::new(51.5, -0.1), GpsPoint::new(f64::NAN, 0.0)],
            0.0,
            0.0,
        );
        assert!(matches!(
            result,
            Err(NavError::EmptyPolyline {
                point_count: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_route_simplification_keeps_endpoints() {
        let route = Route::from_polyline(sample_polyline(), 520.0, 95.0).unwrap();
        let simplified = route.simplified_polyline(0.001);
        assert!(simplified.len() >= 2);
        assert_eq!(simplified.first(), route.polyline.first());
        assert_eq!(simplified.last(), route.polyline.last());
    }

    #[test]
    fn test_travel_mode_profiles() {
        assert_eq!(TravelMode::Driving.profile(), "driving");
        assert_eq!(TravelMode::Walking.profile(), "walking");
        assert_eq!(TravelMode::Cycling.profile(), "cycling");
    }
}
