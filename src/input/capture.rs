//! Interactive rebind capture
//!
//! The "press a key to bind" flow. While a session is active the mapper
//! routes raw input here instead of dispatching it: a button press records a
//! candidate and the following release completes the capture, while axis
//! movement completes immediately once it strays far enough from the
//! baseline recorded when the session opened.
//!
//! Completion and conflict handling live on the mapper; this module only
//! tracks the session state machine.

use rustc_hash::FxHashMap;

use crate::binding::{AxisDirection, DeviceClass, GamepadAxis, PhysicalInput};
use crate::input::device::DeviceId;

/// Axis movement from the session baseline that counts as deliberate.
pub const AXIS_BASELINE_DELTA: f32 = 0.3;

/// Magnitude that counts as deliberate for an axis with no baseline (one
/// first seen after the session opened).
pub const AXIS_FRESH_THRESHOLD: f32 = 0.5;

/// Application-facing view of the rebind flow.
#[derive(Debug, Clone, PartialEq)]
pub enum RebindState {
    /// No capture in progress; raw input dispatches normally.
    Idle,
    /// Waiting for the player to press the input to bind to `action`.
    Listening {
        /// The action being rebound
        action: String,
    },
    /// The captured input is already bound to `existing`; the application
    /// must resolve before the session continues.
    Conflict {
        /// The action being rebound
        action: String,
        /// The captured input
        input: PhysicalInput,
        /// The action currently holding that input
        existing: String,
    },
}

impl RebindState {
    /// Whether a session is active (listening or conflicted).
    pub fn is_active(&self) -> bool {
        !matches!(self, RebindState::Idle)
    }
}

/// A captured input waiting to be applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// The captured physical input
    pub input: PhysicalInput,
    /// The class of device it came from
    pub device: DeviceClass,
}

#[derive(Debug, Clone)]
struct PendingConflict {
    candidate: Candidate,
    existing: String,
}

/// State of one rebind session.
#[derive(Debug)]
pub(crate) struct CaptureSession {
    action: String,
    last: Option<Candidate>,
    baselines: FxHashMap<(DeviceId, GamepadAxis), f32>,
    conflict: Option<PendingConflict>,
}

impl CaptureSession {
    /// Open a session for `action`, with the current axis samples as
    /// baselines so a stick resting off-center does not instantly bind.
    pub fn new(
        action: &str,
        baselines: impl Iterator<Item = ((DeviceId, GamepadAxis), f32)>,
    ) -> Self {
        Self {
            action: action.to_string(),
            last: None,
            baselines: baselines.collect(),
            conflict: None,
        }
    }

    /// The action this session rebinds.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Record a button press as the capture candidate.
    pub fn note_button(&mut self, input: PhysicalInput, device: DeviceClass) {
        if self.conflict.is_none() {
            self.last = Some(Candidate { input, device });
        }
    }

    /// A button was released; take the candidate, if one was recorded.
    pub fn take_candidate(&mut self) -> Option<Candidate> {
        if self.conflict.is_some() {
            return None;
        }
        self.last.take()
    }

    /// Feed an axis sample; returns a completed candidate when the movement
    /// is deliberate enough.
    pub fn note_axis(
        &mut self,
        device: DeviceId,
        axis: GamepadAxis,
        value: f32,
        class: DeviceClass,
    ) -> Option<Candidate> {
        if self.conflict.is_some() {
            return None;
        }

        let deliberate = match self.baselines.get(&(device, axis)) {
            Some(baseline) => (value - baseline).abs() > AXIS_BASELINE_DELTA,
            None => value.abs() > AXIS_FRESH_THRESHOLD,
        };
        if !deliberate {
            return None;
        }

        let direction = AxisDirection::of(value)?;
        Some(Candidate {
            input: PhysicalInput::Axis { axis, direction },
            device: class,
        })
    }

    /// Drop baselines for a device that disconnected mid-session.
    pub fn device_disconnected(&mut self, device: DeviceId) {
        self.baselines.retain(|(id, _), _| *id != device);
    }

    /// Park the session on a conflict.
    pub fn set_conflict(&mut self, candidate: Candidate, existing: &str) {
        self.conflict = Some(PendingConflict {
            candidate,
            existing: existing.to_string(),
        });
        self.last = None;
    }

    /// The parked conflict's candidate and holder, if any.
    pub fn pending_conflict(&self) -> Option<(Candidate, &str)> {
        self.conflict
            .as_ref()
            .map(|c| (c.candidate, c.existing.as_str()))
    }

    /// Drop the parked conflict and return to listening.
    pub fn clear_conflict(&mut self) {
        self.conflict = None;
        self.last = None;
    }

    /// The state the application sees.
    pub fn state(&self) -> RebindState {
        match &self.conflict {
            Some(conflict) => RebindState::Conflict {
                action: self.action.clone(),
                input: conflict.candidate.input,
                existing: conflict.existing.clone(),
            },
            None => RebindState::Listening {
                action: self.action.clone(),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
