//! Shutdown calibration report
//!
//! Nothing is persisted between runs. The report is printed at shutdown so
//! the operator can copy the tuned values into the next startup config.

use core::fmt;

use embassy_time::Duration;

use crate::PulseOutput;
use crate::actuator::ActuatorConfig;
use crate::actuator_map::ActuatorMap;
use crate::bounds::SamplePoint;
use crate::color::Button;
use crate::target::TargetSet;

/// Final values of one arm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmReport {
    pub button: Button,
    pub calibration: ActuatorConfig,
}

/// Snapshot of every tunable value
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReport<const LANES: usize> {
    pub arms: [ArmReport; 3],
    pub lanes: [SamplePoint; LANES],
    pub sentinel: SamplePoint,
    pub cooldown: Duration,
}

impl<const LANES: usize> CalibrationReport<LANES> {
    pub fn capture<O: PulseOutput>(
        actuators: &ActuatorMap<O>,
        targets: &TargetSet<LANES>,
        cooldown: Duration,
    ) -> Self {
        Self {
            arms: Button::ALL.map(|button| ArmReport {
                button,
                calibration: *actuators.get(button).calibration(),
            }),
            lanes: *targets.lanes(),
            sentinel: targets.sentinel(),
            cooldown,
        }
    }

    pub fn arm(&self, button: Button) -> Option<&ArmReport> {
        self.arms.iter().find(|arm| arm.button == button)
    }
}

impl<const LANES: usize> fmt::Display for CalibrationReport<LANES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for arm in &self.arms {
            let c = &arm.calibration;
            writeln!(
                f,
                "{:<5} park {:.1} deg, displacement {:.1} deg, tap {} ms, recovery {} ms",
                arm.button.as_str(),
                c.park_angle,
                c.displacement,
                c.tap.as_millis(),
                c.recovery.as_millis(),
            )?;
        }
        f.write_str("lanes [")?;
        for (index, point) in self.lanes.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{point}")?;
        }
        writeln!(f, "]")?;
        writeln!(f, "sentinel {}", self.sentinel)?;
        write!(f, "cooldown {} ms", self.cooldown.as_millis())
    }
}
