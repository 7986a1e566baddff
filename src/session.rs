//! # Map Session
//!
//! Event dispatch loop tying the follow-mode controller and the route
//! session together, plus the global singleton the FFI layer talks to.
//!
//! ## Architecture
//!
//! The platform shell translates every delegate callback (button tap,
//! gesture, location fix, directions completion) into a [`MapEvent`] and
//! feeds it to [`MapSession::handle`]. The session routes the event to
//! the owning component, which pushes [`MapCommand`]s onto a shared FIFO;
//! the shell drains the FIFO after each event and executes the commands
//! against the native map view.
//!
//! All callbacks are serialized by the platform's event loop, so the
//! session is single-threaded by contract. The singleton wraps it in a
//! `Mutex` only because the FFI boundary requires `Sync`.

use std::sync::Mutex;

use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::commands::{CommandQueue, MapCommand};
use crate::follow::{FollowController, FollowState};
use crate::route::{RoutePhase, RouteSession};
use crate::{GpsPoint, Route};

// ============================================================================
// Events
// ============================================================================

/// An external event fed into the session by the platform shell.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The follow-toggle button was tapped.
    FollowToggled,
    /// The location source delivered a fix.
    LocationUpdated(GpsPoint),
    /// A long-press gesture resolved to a map coordinate.
    LongPress(GpsPoint),
    /// The clear button was tapped.
    ClearTapped,
    /// A route lookup issued via `MapCommand::RequestRoute` resolved.
    RouteResolved { seq: u64, routes: Vec<Route> },
    /// A route lookup failed (network error or no route found).
    RouteFailed { seq: u64, message: String },
}

// ============================================================================
// Session
// ============================================================================

/// The stateful interaction core for one map screen.
pub struct MapSession {
    follow: FollowController,
    route: RouteSession,
    commands: CommandQueue,
}

impl MapSession {
    pub fn new() -> Self {
        Self {
            follow: FollowController::new(),
            route: RouteSession::new(),
            commands: CommandQueue::new(),
        }
    }

    /// Dispatch one event to the owning component.
    pub fn handle(&mut self, event: MapEvent) {
        debug!("[Session] {:?}", event);
        match event {
            MapEvent::FollowToggled => self.follow.toggle(&mut self.commands),
            MapEvent::LocationUpdated(fix) => {
                self.follow.on_location_update(fix, &mut self.commands)
            }
            MapEvent::LongPress(coord) => {
                let user_location = self.follow.last_fix();
                self.route
                    .pick_destination(coord, user_location, &mut self.commands)
            }
            MapEvent::ClearTapped => self.route.clear(&mut self.commands),
            MapEvent::RouteResolved { seq, routes } => {
                self.route
                    .on_lookup_succeeded(seq, routes, &mut self.commands)
            }
            MapEvent::RouteFailed { seq, message } => self.route.on_lookup_failed(seq, &message),
        }
    }

    /// Drain all pending commands in emission order.
    pub fn take_commands(&mut self) -> Vec<MapCommand> {
        self.commands.drain()
    }

    /// Drain pending commands as JSON (for efficient FFI).
    pub fn take_commands_json(&mut self) -> String {
        self.commands.drain_json()
    }

    pub fn follow_state(&self) -> FollowState {
        self.follow.state()
    }

    pub fn route_phase(&self) -> RoutePhase {
        self.route.phase()
    }

    /// Session statistics for shell-side debugging.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            follow_state: self.follow.state(),
            route_phase: self.route.phase(),
            pending_commands: self.commands.len() as u32,
            lookups_issued: self.route.lookups_issued(),
            lookups_applied: self.route.lookups_applied(),
            lookups_discarded: self.route.lookups_discarded(),
        }
    }
}

impl Default for MapSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Session statistics for monitoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct SessionStats {
    pub follow_state: FollowState,
    pub route_phase: RoutePhase,
    pub pending_commands: u32,
    pub lookups_issued: u32,
    pub lookups_applied: u32,
    pub lookups_discarded: u32,
}

// ============================================================================
// Global Singleton
// ============================================================================

/// Global session instance.
///
/// This singleton allows FFI calls to access a shared session without
/// passing state back and forth across the FFI boundary.
pub static SESSION: Lazy<Mutex<MapSession>> = Lazy::new(|| Mutex::new(MapSession::new()));

/// Get a lock on the global session.
pub fn with_session<F, R>(f: F) -> R
where
    F: FnOnce(&mut MapSession) -> R,
{
    let mut session = SESSION.lock().unwrap();
    f(&mut session)
}

// ============================================================================
// FFI Exports
// ============================================================================

#[cfg(feature = "ffi")]
pub mod session_ffi {
    use super::*;
    use log::{info, warn};

    /// Initialize the session (call once at app startup).
    #[uniffi::export]
    pub fn session_init() {
        crate::init_logging();
        info!("[MapSession] Initialized");
    }

    /// Follow-toggle button tapped.
    #[uniffi::export]
    pub fn session_toggle_follow() {
        with_session(|s| s.handle(MapEvent::FollowToggled));
    }

    /// Location source delivered a fix.
    #[uniffi::export]
    pub fn session_location_update(latitude: f64, longitude: f64) {
        with_session(|s| s.handle(MapEvent::LocationUpdated(GpsPoint::new(latitude, longitude))));
    }

    /// Long-press gesture resolved to a map coordinate.
    #[uniffi::export]
    pub fn session_long_press(latitude: f64, longitude: f64) {
        info!("[MapSession] Long press at ({}, {})", latitude, longitude);
        with_session(|s| s.handle(MapEvent::LongPress(GpsPoint::new(latitude, longitude))));
    }

    /// Clear button tapped.
    #[uniffi::export]
    pub fn session_clear() {
        info!("[MapSession] Clear");
        with_session(|s| s.handle(MapEvent::ClearTapped));
    }

    /// Route lookup resolved. `routes_json` is a JSON array of routes.
    #[uniffi::export]
    pub fn session_route_resolved_json(seq: u64, routes_json: String) {
        match serde_json::from_str::<Vec<Route>>(&routes_json) {
            Ok(routes) => with_session(|s| s.handle(MapEvent::RouteResolved { seq, routes })),
            Err(e) => warn!("[MapSession] Unparseable routes for lookup {}: {}", seq, e),
        }
    }

    /// Route lookup failed.
    #[uniffi::export]
    pub fn session_route_failed(seq: u64, message: String) {
        with_session(|s| s.handle(MapEvent::RouteFailed { seq, message }));
    }

    /// Drain pending map commands as a JSON array.
    #[uniffi::export]
    pub fn session_take_commands_json() -> String {
        with_session(|s| s.take_commands_json())
    }

    /// Get session statistics.
    #[uniffi::export]
    pub fn session_stats() -> SessionStats {
        with_session(|s| s.stats())
    }
}

// ============================================================================
// Tests
// ============================================================================
