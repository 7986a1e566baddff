//! Route session: the lifecycle from a long-press destination pick to a
//! drawn route overlay.
//!
//! At most one destination and one displayed route exist at a time.
//! Lookups are asynchronous and never cancelled; instead every request
//! carries a monotonically increasing sequence number, and a success
//! response is applied only when its sequence number is the latest one
//! issued. A failed lookup leaves all map state untouched.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::commands::{CommandQueue, MapCommand, OverlayId};
use crate::{GpsPoint, Route, TravelMode};

/// Annotation title placed at the picked destination.
pub const DESTINATION_TITLE: &str = "Destination";

/// Margin applied around a route's bounds when fitting the camera, as a
/// fraction of the bounds' span per side.
pub const CAMERA_FIT_PADDING: f64 = 0.05;

/// Where the session is in the pick/lookup/display lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum RoutePhase {
    /// No destination picked.
    Idle,
    /// Destination annotated, lookup in flight, no overlay yet.
    AwaitingRoute,
    /// A route overlay is displayed.
    HasRoute,
}

/// A route currently drawn on the map, keyed by its overlay handle.
#[derive(Debug, Clone)]
struct DisplayedRoute {
    overlay: OverlayId,
    route: Route,
}

/// Owns the destination, the displayed route, and the request fence.
#[derive(Debug)]
pub struct RouteSession {
    phase: RoutePhase,
    destination: Option<GpsPoint>,
    current: Option<DisplayedRoute>,

    // Request fencing: only the latest issued seq may apply its result.
    next_seq: u64,
    latest_seq: Option<u64>,
    next_overlay: OverlayId,

    // Counters surfaced through session stats
    lookups_issued: u32,
    lookups_applied: u32,
    lookups_discarded: u32,
}

impl RouteSession {
    pub fn new() -> Self {
        Self {
            phase: RoutePhase::Idle,
            destination: None,
            current: None,
            next_seq: 0,
            latest_seq: None,
            next_overlay: 0,
            lookups_issued: 0,
            lookups_applied: 0,
            lookups_discarded: 0,
        }
    }

    pub fn phase(&self) -> RoutePhase {
        self.phase
    }

    pub fn destination(&self) -> Option<GpsPoint> {
        self.destination
    }

    /// The route currently drawn on the map, if any.
    pub fn current_route(&self) -> Option<&Route> {
        self.current.as_ref().map(|d| &d.route)
    }

    pub fn lookups_issued(&self) -> u32 {
        self.lookups_issued
    }

    pub fn lookups_applied(&self) -> u32 {
        self.lookups_applied
    }

    pub fn lookups_discarded(&self) -> u32 {
        self.lookups_discarded
    }

    /// Record a long-pressed destination, annotate it, and issue a
    /// driving-route lookup from the user's current location.
    ///
    /// A new pick replaces the previous annotation, but any displayed
    /// overlay stays on the map until the new lookup succeeds. When no
    /// location fix exists yet, the pin is still placed and no lookup is
    /// issued.
    pub fn pick_destination(
        &mut self,
        coord: GpsPoint,
        user_location: Option<GpsPoint>,
        out: &mut CommandQueue,
    ) {
        if !coord.is_valid() {
            warn!(
                "[Route] ignoring destination with invalid coordinates ({}, {})",
                coord.latitude, coord.longitude
            );
            return;
        }

        if self.destination.take().is_some() {
            out.push(MapCommand::RemoveAllAnnotations);
        }
        self.destination = Some(coord);
        out.push(MapCommand::AddAnnotation {
            at: coord,
            title: DESTINATION_TITLE.to_string(),
        });

        let source = match user_location {
            Some(fix) => fix,
            None => {
                warn!("[Route] destination picked before any location fix; skipping lookup");
                return;
            }
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_seq = Some(seq);
        self.lookups_issued += 1;

        out.push(MapCommand::RequestRoute {
            seq,
            source,
            destination: coord,
            mode: TravelMode::Driving,
        });
        self.phase = RoutePhase::AwaitingRoute;
        debug!("[Route] lookup {} issued", seq);
    }

    /// Apply a successful lookup response.
    ///
    /// Responses for superseded requests are discarded. Only the first
    /// candidate route is used; an empty candidate list is treated as a
    /// failed lookup.
    pub fn on_lookup_succeeded(&mut self, seq: u64, routes: Vec<Route>, out: &mut CommandQueue) {
        if self.latest_seq != Some(seq) {
            debug!(
                "[Route] discarding stale lookup {} (latest is {:?})",
                seq, self.latest_seq
            );
            self.lookups_discarded += 1;
            return;
        }

        let route = match routes.into_iter().next() {
            Some(route) => route,
            None => {
                warn!("[Route] lookup {} succeeded with no candidates", seq);
                return;
            }
        };

        out.push(MapCommand::RemoveAllOverlays);

        let id = self.next_overlay;
        self.next_overlay += 1;
        out.push(MapCommand::AddOverlay {
            id,
            polyline: route.polyline.clone(),
        });
        out.push(MapCommand::SetVisibleRegion {
            region: route.bounds.padded(CAMERA_FIT_PADDING),
        });

        self.current = Some(DisplayedRoute { overlay: id, route });
        self.phase = RoutePhase::HasRoute;
        self.lookups_applied += 1;
        debug!("[Route] lookup {} applied", seq);
    }

    /// Record a failed lookup. Map state is left untouched.
    pub fn on_lookup_failed(&mut self, seq: u64, message: &str) {
        warn!("[Route] lookup {} failed: {}", seq, message);
    }

    /// Remove the displayed route and all annotations, returning to idle.
    ///
    /// An in-flight lookup is not cancelled and its seq stays the latest:
    /// a late success can still land and redraw. Clearing empties the
    /// map, it does not forget the request.
    pub fn clear(&mut self, out: &mut CommandQueue) {
        if let Some(displayed) = self.current.take() {
            out.push(MapCommand::RemoveOverlay {
                id: displayed.overlay,
            });
        }
        out.push(MapCommand::RemoveAllAnnotations);

        self.destination = None;
        self.phase = RoutePhase::Idle;
        debug!("[Route] cleared");
    }
}

impl Default for RouteSession {
    fn default() -> Self {
        Self::new()
    }
}
