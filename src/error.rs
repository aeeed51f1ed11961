use core::fmt::Debug;

use thiserror::Error;

use crate::actuator::TimingPhase;
use crate::bounds::SamplePoint;
use crate::color::Button;

/// Failure while driving an actuator
///
/// There is no retry path: a driver in an unknown state cannot be trusted,
/// so this error ends the control loop.
#[derive(Debug, Error)]
pub enum TapError<E: Debug> {
    #[error("{button} actuator driver failed: {cause:?}")]
    Driver { button: Button, cause: E },
}

impl<E: Debug> TapError<E> {
    pub(crate) const fn driver(button: Button, cause: E) -> Self {
        Self::Driver { button, cause }
    }

    /// Button whose line failed
    pub const fn button(&self) -> Button {
        match self {
            Self::Driver { button, .. } => *button,
        }
    }
}

/// Rejected startup configuration
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least one lane target is required")]
    NoLanes,
    #[error("frame bounds {width}x{height} are empty")]
    EmptyFrame { width: u16, height: u16 },
    #[error("target {point} lies outside the frame")]
    TargetOutOfFrame { point: SamplePoint },
    #[error("{button} angle range [{min}, {max}] is invalid")]
    AngleRange { button: Button, min: f32, max: f32 },
    #[error("{button} park angle {angle} is outside [{min}, {max}]")]
    ParkAngle {
        button: Button,
        angle: f32,
        min: f32,
        max: f32,
    },
    #[error("{button} tap displacement {displacement} must be positive")]
    Displacement { button: Button, displacement: f32 },
    #[error("{button} {phase:?} time {millis} ms exceeds {max} ms")]
    ArmTiming {
        button: Button,
        phase: TimingPhase,
        millis: u64,
        max: u64,
    },
    #[error("cooldown {millis} ms exceeds {max} ms")]
    Cooldown { millis: u64, max: u64 },
}
