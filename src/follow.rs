//! Follow-mode controller: the state machine deciding when the camera
//! tracks the user's location.
//!
//! The policy is `follow_recenter_once`: while following, a location fix
//! re-centers the camera exactly once and then pauses the location
//! stream, so the map stops fighting a user who pans away afterwards.
//! While *not* following, the stream is kept hot. The naming reads
//! inverted; it is deliberate policy, not a bug.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::commands::{CommandQueue, MapCommand};
use crate::GpsPoint;

/// Whether the camera currently tracks the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum FollowState {
    Following,
    NotFollowing,
}

/// The affordance shown on the follow-toggle button.
///
/// `TrackingOff` is what users tap to stop following; it is displayed
/// while the session is in [`FollowState::Following`], and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum FollowIcon {
    TrackingOn,
    TrackingOff,
}

/// Owns the follow flag, the button icon, and the last known fix.
///
/// Invariant: the icon always matches the state (`Following` shows
/// `TrackingOff`, `NotFollowing` shows `TrackingOn`).
#[derive(Debug)]
pub struct FollowController {
    state: FollowState,
    icon: FollowIcon,
    last_fix: Option<GpsPoint>,
}

impl FollowController {
    pub fn new() -> Self {
        Self {
            state: FollowState::NotFollowing,
            icon: FollowIcon::TrackingOn,
            last_fix: None,
        }
    }

    pub fn state(&self) -> FollowState {
        self.state
    }

    pub fn icon(&self) -> FollowIcon {
        self.icon
    }

    /// Most recent location fix, if any has arrived.
    pub fn last_fix(&self) -> Option<GpsPoint> {
        self.last_fix
    }

    /// Flip the follow flag in response to a button tap.
    ///
    /// Entering `Following` resumes the location stream (active just long
    /// enough for the next fix to re-center) and centers immediately when
    /// a fix is already known. Entering `NotFollowing` also resumes the
    /// stream: that state keeps it hot under `follow_recenter_once`.
    pub fn toggle(&mut self, out: &mut CommandQueue) {
        self.state = match self.state {
            FollowState::Following => FollowState::NotFollowing,
            FollowState::NotFollowing => FollowState::Following,
        };
        debug!("[Follow] toggled to {:?}", self.state);

        match self.state {
            FollowState::Following => {
                out.push(MapCommand::ResumeLocationUpdates);
                self.icon = FollowIcon::TrackingOff;
                out.push(MapCommand::SetFollowIcon { icon: self.icon });
                if let Some(fix) = self.last_fix {
                    out.push(MapCommand::CenterCamera { at: fix });
                }
            }
            FollowState::NotFollowing => {
                out.push(MapCommand::ResumeLocationUpdates);
                self.icon = FollowIcon::TrackingOn;
                out.push(MapCommand::SetFollowIcon { icon: self.icon });
            }
        }
    }

    /// React to a fix from the location source.
    ///
    /// `Following`: center on the fix, then pause the stream. The next
    /// re-center happens on toggle, not on the next fix.
    /// `NotFollowing`: keep the stream running.
    pub fn on_location_update(&mut self, fix: GpsPoint, out: &mut CommandQueue) {
        self.last_fix = Some(fix);

        match self.state {
            FollowState::Following => {
                out.push(MapCommand::CenterCamera { at: fix });
                out.push(MapCommand::PauseLocationUpdates);
            }
            FollowState::NotFollowing => {
                out.push(MapCommand::ResumeLocationUpdates);
            }
        }
    }
}

impl Default for FollowController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix() -> GpsPoint {
        GpsPoint::new(51.5074, -0.1278)
    }

    #[test]
    fn test_double_toggle_restores_state_and_icon() {
        let mut controller = FollowController::new();
        let mut out = CommandQueue::new();

        let initial_state = controller.state();
        let initial_icon = controller.icon();

        controller.toggle(&mut out);
        assert_eq!(controller.state(), FollowState::Following);
        assert_eq!(controller.icon(), FollowIcon::TrackingOff);

        controller.toggle(&mut out);
        assert_eq!(controller.state(), initial_state);
        assert_eq!(controller.icon(), initial_icon);
    }

    #[test]
    fn test_toggle_to_following_centers_on_known_fix() {
        let mut controller = FollowController::new();
        let mut out = CommandQueue::new();

        controller.on_location_update(fix(), &mut out);
        out.drain();

        controller.toggle(&mut out);
        let commands = out.drain();
        assert!(commands.contains(&MapCommand::ResumeLocationUpdates));
        assert!(commands.contains(&MapCommand::CenterCamera { at: fix() }));
    }

    #[test]
    fn test_toggle_to_following_without_fix_skips_centering() {
        let mut controller = FollowController::new();
        let mut out = CommandQueue::new();

        controller.toggle(&mut out);
        let commands = out.drain();
        assert!(!commands
            .iter()
            .any(|c| matches!(c, MapCommand::CenterCamera { .. })));
    }

    #[test]
    fn test_following_fix_centers_then_pauses() {
        let mut controller = FollowController::new();
        let mut out = CommandQueue::new();

        controller.toggle(&mut out); // -> Following
        out.drain();

        controller.on_location_update(fix(), &mut out);
        let commands = out.drain();
        assert_eq!(
            commands,
            vec![
                MapCommand::CenterCamera { at: fix() },
                MapCommand::PauseLocationUpdates,
            ]
        );
    }

    #[test]
    fn test_not_following_fix_keeps_stream_hot() {
        let mut controller = FollowController::new();
        let mut out = CommandQueue::new();

        controller.on_location_update(fix(), &mut out);
        let commands = out.drain();
        assert_eq!(commands, vec![MapCommand::ResumeLocationUpdates]);
        assert_eq!(controller.last_fix(), Some(fix()));
    }

    #[test]
    fn test_paused_stream_resumes_after_toggling_off() {
        let mut controller = FollowController::new();
        let mut out = CommandQueue::new();

        controller.toggle(&mut out); // -> Following
        controller.on_location_update(fix(), &mut out); // centers, pauses
        out.drain();

        controller.toggle(&mut out); // -> NotFollowing
        let commands = out.drain();
        assert!(commands.contains(&MapCommand::ResumeLocationUpdates));
        assert_eq!(controller.state(), FollowState::NotFollowing);
    }
}
