//! Map display commands emitted by the session and drained by the
//! platform shell.
//!
//! The core never touches a widget. Every mutation of the visible map
//! (camera moves, annotations, overlays, the follow button icon) and every
//! request to the location source or directions service is expressed as a
//! [`MapCommand`] pushed onto a FIFO. The shell drains the queue after
//! each event and executes the commands against the native map view, in
//! order. Commands serialize to JSON for the FFI boundary.

use serde::{Deserialize, Serialize};

use crate::follow::FollowIcon;
use crate::{Bounds, GpsPoint, TravelMode};

/// Handle naming a displayed overlay, so a later `RemoveOverlay` can
/// target the exact polyline that was added.
pub type OverlayId = u64;

/// A single instruction for the platform shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapCommand {
    /// Center the camera on a coordinate (animated on most platforms).
    CenterCamera { at: GpsPoint },
    /// Fit the camera to a bounding region.
    SetVisibleRegion { region: Bounds },
    /// Drop an annotation pin.
    AddAnnotation { at: GpsPoint, title: String },
    /// Remove every annotation on the map.
    RemoveAllAnnotations,
    /// Draw a polyline overlay.
    AddOverlay {
        id: OverlayId,
        polyline: Vec<GpsPoint>,
    },
    /// Remove one overlay by its handle.
    RemoveOverlay { id: OverlayId },
    /// Remove every overlay on the map.
    RemoveAllOverlays,
    /// Swap the follow-toggle button icon.
    SetFollowIcon { icon: FollowIcon },
    /// Ask the location source to deliver updates.
    ResumeLocationUpdates,
    /// Ask the location source to stop delivering updates.
    PauseLocationUpdates,
    /// Perform an asynchronous route lookup and feed the result back as a
    /// `RouteResolved` / `RouteFailed` event carrying the same `seq`.
    RequestRoute {
        seq: u64,
        source: GpsPoint,
        destination: GpsPoint,
        mode: TravelMode,
    },
}

/// FIFO of pending commands, owned by the session.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<MapCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command to the queue.
    pub fn push(&mut self, command: MapCommand) {
        log::debug!("[CommandQueue] {:?}", command);
        self.pending.push(command);
    }

    /// Drain all pending commands in emission order.
    pub fn drain(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.pending)
    }

    /// Number of commands waiting to be drained.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending commands as JSON (for efficient FFI).
    pub fn drain_json(&mut self) -> String {
        let commands = self.drain();
        serde_json::to_string(&commands).unwrap_or_else(|_| "[]".to_string())
    }
}
