//! Reconciliation rules
//!
//! [`next_action`] is a pure function from a [`Snapshot`] of desired and
//! actual state to the single next step. The coordinator applies it until
//! the step is an actor command or a wait.
//!
//! Priority, first match wins:
//!
//! ```text
//!  1. desired device != attached   stop renderer, stop capture, release, attach
//!  2. no device, renderer alive    wait
//!  3. terminating, nothing left    complete
//!  4. no device                    idle
//!  5. device state unknown         wait
//!  6. desired input != current     stop renderer, stop capture, select + start
//!  7. not capturing                wait
//!  8. no renderer                  clear surface, wait if failed, build
//!  9. rendering, signal invalid    stop renderer
//! 10. rendering, restart wanted    restart renderer
//! 11. otherwise                    steady
//! ```

use std::fmt;

use crate::types::{CaptureDeviceState, CaptureInputId, DeviceId, RendererState};

/// Coordinator state the rules read
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    /// Device the user wants
    pub desired_device: Option<DeviceId>,
    /// Device currently attached
    pub attached_device: Option<DeviceId>,
    /// Attached device state
    pub device_state: CaptureDeviceState,
    /// Input the user wants
    pub desired_input: Option<CaptureInputId>,
    /// Input last selected on the device
    pub current_input: Option<CaptureInputId>,
    /// Whether a renderer instance exists
    pub renderer_exists: bool,
    /// Renderer state
    pub renderer_state: RendererState,
    /// Rebuild requested
    pub want_restart: bool,
    /// Teardown requested
    pub want_terminate: bool,
    /// Full-screen intent
    pub full_screen: bool,
    /// A full-screen surface is still held
    pub full_screen_surface: bool,
    /// A valid video state is cached
    pub video_valid: bool,
}

/// Why reconciliation is waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitReason {
    /// Renderer has not reported `Stopped`
    RendererTeardown,
    /// Device has not reached a removable state
    DeviceTeardown,
    /// Device has not reported its first state
    DeviceStarting,
    /// Device is between stop and `Ready`
    InputSwitch,
    /// Device is not capturing
    CaptureNotRunning,
    /// Last renderer build failed
    RendererFailed,
    /// No valid video signal
    NoSignal,
}

impl fmt::Display for WaitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RendererTeardown => "renderer teardown",
            Self::DeviceTeardown => "device teardown",
            Self::DeviceStarting => "device starting",
            Self::InputSwitch => "input switch",
            Self::CaptureNotRunning => "capture not running",
            Self::RendererFailed => "renderer failed, waiting for retry",
            Self::NoSignal => "no valid video signal",
        };
        f.write_str(s)
    }
}

/// Next reconciliation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Close the gate and stop the renderer
    StopRenderer,
    /// Clear the restart request and stop the renderer
    RestartRenderer,
    /// Stop capture on the attached device
    StopCapture,
    /// Detach a `Ready` device
    ReleaseDevice,
    /// Attach the desired device
    AttachDevice(DeviceId),
    /// Select an input and start capture
    StartCapture(CaptureInputId),
    /// Drop a full-screen surface nobody wants
    ClearFullScreenSurface,
    /// Build and start a renderer through the fallback chain
    BuildRenderer,
    /// Teardown finished
    CompleteTermination,
    /// Wait for a callback
    Wait(WaitReason),
    /// Nothing attached
    Idle,
    /// Capturing and rendering as desired
    Steady,
}

impl Action {
    /// Whether reconciliation continues in the same pass after this step
    ///
    /// Only bookkeeping steps continue; no actor callback follows them.
    #[must_use]
    pub fn continues_pass(&self) -> bool {
        matches!(
            self,
            Self::ReleaseDevice | Self::AttachDevice(_) | Self::ClearFullScreenSurface
        )
    }
}

/// Compute the next step
pub fn next_action(s: &Snapshot) -> Action {
    // 1. device switch
    if s.desired_device != s.attached_device {
        if s.renderer_exists {
            return if s.renderer_state == RendererState::Rendering {
                Action::StopRenderer
            } else {
                Action::Wait(WaitReason::RendererTeardown)
            };
        }

        if s.attached_device.is_some() {
            return match s.device_state {
                CaptureDeviceState::Capturing => Action::StopCapture,
                CaptureDeviceState::Ready => Action::ReleaseDevice,
                _ => Action::Wait(WaitReason::DeviceTeardown),
            };
        }

        if let Some(id) = s.desired_device {
            return Action::AttachDevice(id);
        }
    }

    // 2. lost device, renderer still alive
    if s.attached_device.is_none() && s.renderer_exists {
        return Action::Wait(WaitReason::RendererTeardown);
    }

    // 3. termination
    if s.want_terminate && s.attached_device.is_none() {
        return Action::CompleteTermination;
    }

    // 4. no device
    if s.attached_device.is_none() {
        return Action::Idle;
    }

    // 5. device starting
    if s.device_state == CaptureDeviceState::Unknown {
        return Action::Wait(WaitReason::DeviceStarting);
    }

    // 6. input switch
    if let Some(input) = s.desired_input.filter(|i| Some(*i) != s.current_input) {
        if s.renderer_exists {
            return if s.renderer_state == RendererState::Rendering {
                Action::StopRenderer
            } else {
                Action::Wait(WaitReason::RendererTeardown)
            };
        }

        return match s.device_state {
            CaptureDeviceState::Capturing => Action::StopCapture,
            CaptureDeviceState::Ready => Action::StartCapture(input),
            _ => Action::Wait(WaitReason::InputSwitch),
        };
    }

    // 7. not capturing
    if s.device_state != CaptureDeviceState::Capturing {
        return Action::Wait(WaitReason::CaptureNotRunning);
    }

    // 8. no renderer
    if !s.renderer_exists {
        if !s.full_screen && s.full_screen_surface {
            return Action::ClearFullScreenSurface;
        }
        if s.renderer_state == RendererState::Failed {
            return Action::Wait(WaitReason::RendererFailed);
        }
        return if s.video_valid {
            Action::BuildRenderer
        } else {
            Action::Wait(WaitReason::NoSignal)
        };
    }

    if s.renderer_state == RendererState::Rendering {
        // 9. signal gone
        if !s.video_valid {
            return Action::StopRenderer;
        }
        // 10. restart requested
        if s.want_restart {
            return Action::RestartRenderer;
        }
    }

    // 11. steady
    Action::Steady
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: DeviceId = DeviceId(1);
    const B: DeviceId = DeviceId(2);
    const HDMI: CaptureInputId = CaptureInputId(0);
    const SDI: CaptureInputId = CaptureInputId(1);

    fn steady() -> Snapshot {
        Snapshot {
            desired_device: Some(B),
            attached_device: Some(B),
            device_state: CaptureDeviceState::Capturing,
            desired_input: Some(HDMI),
            current_input: Some(HDMI),
            renderer_exists: true,
            renderer_state: RendererState::Rendering,
            video_valid: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_steady_state() {
        assert_eq!(next_action(&steady()), Action::Steady);
    }

    #[test]
    fn test_device_switch_sequence() {
        let mut s = Snapshot {
            desired_device: Some(A),
            ..steady()
        };
        assert_eq!(next_action(&s), Action::StopRenderer);

        s.renderer_state = RendererState::Stopping;
        assert_eq!(next_action(&s), Action::Wait(WaitReason::RendererTeardown));

        s.renderer_exists = false;
        s.renderer_state = RendererState::Unknown;
        assert_eq!(next_action(&s), Action::StopCapture);

        s.device_state = CaptureDeviceState::Stopping;
        assert_eq!(next_action(&s), Action::Wait(WaitReason::DeviceTeardown));

        s.device_state = CaptureDeviceState::Ready;
        assert_eq!(next_action(&s), Action::ReleaseDevice);

        s.attached_device = None;
        s.device_state = CaptureDeviceState::Unknown;
        assert_eq!(next_action(&s), Action::AttachDevice(A));
    }

    #[test]
    fn test_switch_with_starting_renderer_waits() {
        let s = Snapshot {
            desired_device: Some(A),
            renderer_state: RendererState::Starting,
            ..steady()
        };
        assert_eq!(next_action(&s), Action::Wait(WaitReason::RendererTeardown));
    }

    #[test]
    fn test_lost_device_with_renderer_waits() {
        let s = Snapshot {
            desired_device: None,
            attached_device: None,
            device_state: CaptureDeviceState::Unknown,
            renderer_state: RendererState::Stopping,
            ..steady()
        };
        assert_eq!(next_action(&s), Action::Wait(WaitReason::RendererTeardown));
    }

    #[test]
    fn test_termination() {
        let s = Snapshot {
            want_terminate: true,
            ..Default::default()
        };
        assert_eq!(next_action(&s), Action::CompleteTermination);

        // Teardown runs through the device switch rule first
        let s = Snapshot {
            desired_device: None,
            want_terminate: true,
            ..steady()
        };
        assert_eq!(next_action(&s), Action::StopRenderer);
    }

    #[test]
    fn test_idle_and_starting() {
        assert_eq!(next_action(&Snapshot::default()), Action::Idle);

        let s = Snapshot {
            device_state: CaptureDeviceState::Unknown,
            renderer_exists: false,
            renderer_state: RendererState::Unknown,
            ..steady()
        };
        assert_eq!(next_action(&s), Action::Wait(WaitReason::DeviceStarting));
    }

    #[test]
    fn test_input_switch_sequence() {
        let mut s = Snapshot {
            desired_input: Some(SDI),
            ..steady()
        };
        assert_eq!(next_action(&s), Action::StopRenderer);

        s.renderer_exists = false;
        s.renderer_state = RendererState::Unknown;
        assert_eq!(next_action(&s), Action::StopCapture);

        s.device_state = CaptureDeviceState::Stopping;
        assert_eq!(next_action(&s), Action::Wait(WaitReason::InputSwitch));

        s.device_state = CaptureDeviceState::Ready;
        assert_eq!(next_action(&s), Action::StartCapture(SDI));
    }

    #[test]
    fn test_first_start_after_attach() {
        let s = Snapshot {
            device_state: CaptureDeviceState::Ready,
            current_input: None,
            renderer_exists: false,
            renderer_state: RendererState::Unknown,
            ..steady()
        };
        assert_eq!(next_action(&s), Action::StartCapture(HDMI));
    }

    #[test]
    fn test_not_capturing_waits() {
        let s = Snapshot {
            device_state: CaptureDeviceState::Starting,
            renderer_exists: false,
            renderer_state: RendererState::Unknown,
            ..steady()
        };
        assert_eq!(next_action(&s), Action::Wait(WaitReason::CaptureNotRunning));
    }

    #[test]
    fn test_no_renderer() {
        let mut s = Snapshot {
            renderer_exists: false,
            renderer_state: RendererState::Unknown,
            full_screen_surface: true,
            ..steady()
        };
        assert_eq!(next_action(&s), Action::ClearFullScreenSurface);
        assert!(Action::ClearFullScreenSurface.continues_pass());

        s.full_screen_surface = false;
        assert_eq!(next_action(&s), Action::BuildRenderer);

        s.video_valid = false;
        assert_eq!(next_action(&s), Action::Wait(WaitReason::NoSignal));

        s.video_valid = true;
        s.renderer_state = RendererState::Failed;
        assert_eq!(next_action(&s), Action::Wait(WaitReason::RendererFailed));
    }

    #[test]
    fn test_full_screen_surface_kept_when_wanted() {
        let s = Snapshot {
            renderer_exists: false,
            renderer_state: RendererState::Unknown,
            full_screen: true,
            full_screen_surface: true,
            ..steady()
        };
        assert_eq!(next_action(&s), Action::BuildRenderer);
    }

    #[test]
    fn test_invalid_signal_stops_renderer() {
        let s = Snapshot {
            video_valid: false,
            ..steady()
        };
        assert_eq!(next_action(&s), Action::StopRenderer);
    }

    #[test]
    fn test_restart_request() {
        let s = Snapshot {
            want_restart: true,
            ..steady()
        };
        assert_eq!(next_action(&s), Action::RestartRenderer);

        // Only a rendering renderer is restarted
        let s = Snapshot {
            want_restart: true,
            renderer_state: RendererState::Ready,
            ..steady()
        };
        assert_eq!(next_action(&s), Action::Steady);
    }

    #[test]
    fn test_bookkeeping_actions_continue() {
        assert!(Action::ReleaseDevice.continues_pass());
        assert!(Action::AttachDevice(A).continues_pass());
        assert!(!Action::StopCapture.continues_pass());
        assert!(!Action::BuildRenderer.continues_pass());
    }
}
