use embassy_time::Duration;

use crate::actuator::{MAX_TUNED_DURATION, TimingPhase};
use crate::actuator_map::ActuatorMapConfig;
use crate::bounds::FrameBounds;
use crate::color::{Button, ClassifierConfig};
use crate::error::ConfigError;
use crate::target::TargetConfig;

/// Startup configuration of the whole machine
///
/// Every value here is rig-specific calibration. The shutdown report prints
/// the tuned values in a form that can be copied back in.
#[derive(Debug, Clone)]
pub struct TapperConfig<const LANES: usize> {
    /// Resolution of the frame source
    pub bounds: FrameBounds,
    pub classifier: ClassifierConfig,
    pub targets: TargetConfig<LANES>,
    pub actuators: ActuatorMapConfig,
    /// Pause after each tap sequence before reading the next frame
    pub cooldown: Duration,
}

impl<const LANES: usize> TapperConfig<LANES> {
    /// Check the configuration before any hardware is touched
    ///
    /// Durations must lie in the live-tuning range, so a tuning step never
    /// lands below the configured value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if LANES == 0 {
            return Err(ConfigError::NoLanes);
        }
        if self.bounds.width == 0 || self.bounds.height == 0 {
            return Err(ConfigError::EmptyFrame {
                width: self.bounds.width,
                height: self.bounds.height,
            });
        }

        let points = self
            .targets
            .lanes
            .iter()
            .chain(core::iter::once(&self.targets.sentinel));
        for &point in points {
            if !self.bounds.contains(point) {
                return Err(ConfigError::TargetOutOfFrame { point });
            }
        }

        for button in Button::ALL {
            let arm = self.actuators.get(button);
            if arm.min_angle.is_nan() || arm.max_angle.is_nan() || arm.min_angle > arm.max_angle {
                return Err(ConfigError::AngleRange {
                    button,
                    min: arm.min_angle,
                    max: arm.max_angle,
                });
            }
            if !(arm.min_angle..=arm.max_angle).contains(&arm.park_angle) {
                return Err(ConfigError::ParkAngle {
                    button,
                    angle: arm.park_angle,
                    min: arm.min_angle,
                    max: arm.max_angle,
                });
            }
            if arm.displacement.is_nan() || arm.displacement <= 0.0 {
                return Err(ConfigError::Displacement {
                    button,
                    displacement: arm.displacement,
                });
            }
            for (phase, duration) in [
                (TimingPhase::Tap, arm.tap),
                (TimingPhase::Recovery, arm.recovery),
            ] {
                if duration > MAX_TUNED_DURATION {
                    return Err(ConfigError::ArmTiming {
                        button,
                        phase,
                        millis: duration.as_millis(),
                        max: MAX_TUNED_DURATION.as_millis(),
                    });
                }
            }
        }

        if self.cooldown > MAX_TUNED_DURATION {
            return Err(ConfigError::Cooldown {
                millis: self.cooldown.as_millis(),
                max: MAX_TUNED_DURATION.as_millis(),
            });
        }

        Ok(())
    }
}
