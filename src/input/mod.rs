//! Input-side machinery
//!
//! Held action state, axis tracking, connected-device bookkeeping, and the
//! interactive rebind capture session.

mod axis;
mod capture;
mod device;
mod state;

pub use axis::{AxisBinding, AxisSample, AxisSlot, AxisTracker, DEFAULT_DEAD_ZONE};
pub use capture::{AXIS_BASELINE_DELTA, AXIS_FRESH_THRESHOLD, RebindState};
pub use device::{DeviceId, DeviceInfo, DeviceRegistry};
pub use state::{ActionState, HELD_THRESHOLD};

pub(crate) use capture::{Candidate, CaptureSession};
