//! Serialized tap sequences

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;

use crate::PulseOutput;
use crate::actuator::{hold, shift_duration};
use crate::actuator_map::ActuatorMap;
use crate::edge::EdgeDetector;
use crate::error::TapError;
use crate::evaluator::SymbolVector;

/// Fires whole vectors, one lane at a time
///
/// Taps never overlap: the shared driver cannot keep timing under
/// simultaneous commands, and the lanes are physically laid out left to right.
#[derive(Debug, Clone, Copy)]
pub struct ActuationSequencer {
    cooldown: Duration,
}

impl ActuationSequencer {
    pub const fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    /// Delay after each sequence before the next frame is read
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Shift the cooldown by `delta_ms`, clamped to the tuning range
    pub fn tune_cooldown(&mut self, delta_ms: i32) -> Duration {
        self.cooldown = shift_duration(self.cooldown, delta_ms);
        self.cooldown
    }

    /// Tap every lane in order, commit the vector, then cool down
    ///
    /// The edge detector only learns about the vector once every tap has
    /// completed. A driver failure aborts before the commit.
    pub fn fire<O: PulseOutput, D: DelayNs, const LANES: usize>(
        &self,
        vector: &SymbolVector<LANES>,
        actuators: &mut ActuatorMap<O>,
        edge: &mut EdgeDetector<LANES>,
        delay: &mut D,
    ) -> Result<(), TapError<O::Error>> {
        for &button in vector {
            actuators.tap(button, delay)?;
        }
        edge.commit(*vector);
        hold(delay, self.cooldown);
        Ok(())
    }
}
