//! HTTP directions client for OSRM-compatible route endpoints.
//!
//! Implements the Directions Lookup collaborator: given a source, a
//! destination and a travel mode, fetch candidate routes and decode the
//! polyline geometry. No retries are performed; a failed lookup is
//! reported to the caller and the session leaves map state untouched.

use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{NavError, Result};
use crate::{GpsPoint, Route, TravelMode};

/// Public OSRM demo endpoint. Production apps should self-host.
pub const DEFAULT_ENDPOINT: &str = "https://router.project-osrm.org";

/// Precision of OSRM's default encoded polyline geometry.
const POLYLINE_PRECISION: u32 = 5;

/// Async directions client over an OSRM-compatible HTTP API.
pub struct DirectionsClient {
    client: Client,
    base_url: String,
}

impl DirectionsClient {
    /// Create a client against the public demo endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Create a client against a custom endpoint.
    pub fn with_endpoint(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Request candidate routes from `source` to `destination`.
    ///
    /// Returns routes ordered by the service's preference; the session
    /// uses only the first. Alternatives are requested so the contract
    /// mirrors what platform directions APIs return.
    pub async fn request_route(
        &self,
        source: GpsPoint,
        destination: GpsPoint,
        mode: TravelMode,
    ) -> Result<Vec<Route>> {
        if !source.is_valid() || !destination.is_valid() {
            return Err(NavError::InvalidCoordinates {
                message: format!(
                    "source ({}, {}) or destination ({}, {}) out of range",
                    source.latitude, source.longitude, destination.latitude, destination.longitude
                ),
            });
        }

        // OSRM takes lng,lat pairs
        let url = format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?alternatives=true&overview=full",
            self.base_url,
            mode.profile(),
            source.longitude,
            source.latitude,
            destination.longitude,
            destination.latitude,
        );
        debug!("[Directions] GET {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            NavError::DirectionsFailed {
                message: e.to_string(),
                status_code: e.status().map(|s| s.as_u16()),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("[Directions] endpoint returned {}", status);
            return Err(NavError::DirectionsFailed {
                message: format!("directions endpoint returned {}", status),
                status_code: Some(status.as_u16()),
            });
        }

        let body: OsrmRouteResponse =
            response
                .json()
                .await
                .map_err(|e| NavError::DirectionsFailed {
                    message: format!("unparseable response: {}", e),
                    status_code: None,
                })?;

        parse_response(source, destination, body)
    }
}

impl Default for DirectionsClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Encoded polyline (polyline5 with `overview=full`)
    geometry: String,
    /// Distance in meters
    distance: f64,
    /// Duration in seconds
    duration: f64,
}

/// Convert a decoded OSRM response into routes.
///
/// `code != "Ok"` means the service could not route between the
/// endpoints; candidates with undecodable or degenerate geometry are
/// skipped with a warning rather than failing the whole lookup.
fn parse_response(
    source: GpsPoint,
    destination: GpsPoint,
    body: OsrmRouteResponse,
) -> Result<Vec<Route>> {
    if body.code != "Ok" {
        return Err(NavError::NoRouteFound {
            from: source,
            to: destination,
        });
    }

    let mut routes = Vec::with_capacity(body.routes.len());
    for candidate in body.routes {
        match decode_route(&candidate) {
            Ok(route) => routes.push(route),
            Err(e) => warn!("[Directions] skipping candidate: {}", e),
        }
    }

    if routes.is_empty() {
        return Err(NavError::NoRouteFound {
            from: source,
            to: destination,
        });
    }

    debug!("[Directions] {} candidate route(s)", routes.len());
    Ok(routes)
}

fn decode_route(candidate: &OsrmRoute) -> Result<Route> {
    let line = polyline::decode_polyline(&candidate.geometry, POLYLINE_PRECISION).map_err(|e| {
        NavError::Internal {
            message: format!("polyline decode: {}", e),
        }
    })?;

    // polyline decodes to geo coords with x = lng, y = lat
    let points: Vec<GpsPoint> = line.0.iter().map(|c| GpsPoint::new(c.y, c.x)).collect();

    Route::from_polyline(points, candidate.distance, candidate.duration)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, LineString};

    fn endpoints() -> (GpsPoint, GpsPoint) {
        (
            GpsPoint::new(51.5074, -0.1278),
            GpsPoint::new(51.5007, -0.1246),
        )
    }

    fn encoded_geometry() -> String {
        let line = LineString::new(vec![
            Coord {
                x: -0.1278,
                y: 51.5074,
            },
            Coord {
                x: -0.1260,
                y: 51.5040,
            },
            Coord {
                x: -0.1246,
                y: 51.5007,
            },
        ]);
        polyline::encode_coordinates(line, POLYLINE_PRECISION).unwrap()
    }

    #[test]
    fn test_parse_ok_response() {
        let (from, to) = endpoints();
        let body = OsrmRouteResponse {
            code: "Ok".to_string(),
            routes: vec![OsrmRoute {
                geometry: encoded_geometry(),
                distance: 850.0,
                duration: 120.0,
            }],
        };

        let routes = parse_response(from, to, body).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].distance_m, 850.0);
        assert_eq!(routes[0].polyline.len(), 3);
        // Decoded endpoints survive within polyline5 precision
        assert!((routes[0].polyline[0].latitude - from.latitude).abs() < 1e-4);
        assert!((routes[0].polyline[2].longitude - to.longitude).abs() < 1e-4);
    }

    #[test]
    fn test_parse_no_route_code() {
        let (from, to) = endpoints();
        let body = OsrmRouteResponse {
            code: "NoRoute".to_string(),
            routes: vec![],
        };

        let result = parse_response(from, to, body);
        assert!(matches!(result, Err(NavError::NoRouteFound { .. })));
    }

    #[test]
    fn test_parse_skips_undecodable_candidates() {
        let (from, to) = endpoints();
        let body = OsrmRouteResponse {
            code: "Ok".to_string(),
            routes: vec![
                OsrmRoute {
                    // A single decoded point cannot form a route
                    geometry: polyline::encode_coordinates(
                        LineString::new(vec![Coord {
                            x: -0.1278,
                            y: 51.5074,
                        }]),
                        POLYLINE_PRECISION,
                    )
                    .unwrap(),
                    distance: 0.0,
                    duration: 0.0,
                },
                OsrmRoute {
                    geometry: encoded_geometry(),
                    distance: 850.0,
                    duration: 120.0,
                },
            ],
        };

        let routes = parse_response(from, to, body).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].distance_m, 850.0);
    }

    #[test]
    fn test_parse_ok_with_all_bad_candidates_is_no_route() {
        let (from, to) = endpoints();
        let body = OsrmRouteResponse {
            code: "Ok".to_string(),
            routes: vec![],
        };

        let result = parse_response(from, to, body);
        assert!(matches!(result, Err(NavError::NoRouteFound { .. })));
    }

    #[test]
    fn test_response_json_shape() {
        // json! escapes the encoded geometry, which may contain backslashes
        let json = serde_json::json!({
            "code": "Ok",
            "routes": [{
                "geometry": encoded_geometry(),
                "distance": 850.0,
                "duration": 120.0,
            }],
            "waypoints": [],
        })
        .to_string();
        let body: OsrmRouteResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(body.code, "Ok");
        assert_eq!(body.routes.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_rejected_before_network() {
        let client = DirectionsClient::with_endpoint("http://localhost:1");
        let result = client
            .request_route(
                GpsPoint::new(95.0, 0.0),
                GpsPoint::new(51.5, -0.12),
                TravelMode::Driving,
            )
            .await;
        assert!(matches!(result, Err(NavError::InvalidCoordinates { .. })));
    }
}
