//! Servo tapping arm
//!
//! An arm rests at its park angle just above the button. A tap lowers it by
//! the displacement, holds, raises it back and holds again so the servo has
//! settled before the next command.

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;

use crate::PulseOutput;
use crate::color::Button;
use crate::error::TapError;

/// Pulse width for 0 degrees, in microseconds
pub const PULSE_WIDTH_MIN_US: f32 = 500.0;

/// Pulse width span covering 0..=180 degrees, in microseconds
pub const PULSE_WIDTH_SPAN_US: f32 = 2000.0;

/// Logical angle range accepted by the output
pub const MAX_DEGREES: f32 = 180.0;

/// Upper bound for any live-tuned duration
pub const MAX_TUNED_DURATION: Duration = Duration::from_millis(1000);

/// Convert a logical angle to a servo pulse width
///
/// The angle is clamped to `0..=180` before the linear conversion.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn degrees_to_pulse_width(degrees: f32) -> u16 {
    let degrees = if degrees.is_nan() {
        0.0
    } else {
        degrees.clamp(0.0, MAX_DEGREES)
    };
    libm::roundf(degrees * (PULSE_WIDTH_SPAN_US / MAX_DEGREES) + PULSE_WIDTH_MIN_US) as u16
}

/// Block for `duration` on the given delay provider
pub(crate) fn hold<D: DelayNs>(delay: &mut D, duration: Duration) {
    let micros = u32::try_from(duration.as_micros()).unwrap_or(u32::MAX);
    if micros > 0 {
        delay.delay_us(micros);
    }
}

/// Startup calibration of a single arm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorConfig {
    /// Resting angle just above the button
    pub park_angle: f32,
    /// How far below the park angle a tap reaches
    pub displacement: f32,
    /// Hold time in the lowered position
    pub tap: Duration,
    /// Hold time after raising, before the arm may move again
    pub recovery: Duration,
    /// Lowest park angle tuning may reach
    pub min_angle: f32,
    /// Highest park angle tuning may reach
    pub max_angle: f32,
}

/// Position the arms go to before the outputs are switched off
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaintenanceConfig {
    /// Raised angle that keeps the arm clear of the board
    pub angle: f32,
    /// Time allowed for the arm to reach it
    pub settle: Duration,
}

/// Which tunable duration a timing command changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingPhase {
    Tap,
    Recovery,
    Cooldown,
}

/// Motion state of an arm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorState {
    Parked,
    Lowered,
    /// Output disabled after shutdown
    Released,
}

/// One tapping arm bound to a button
#[derive(Debug)]
pub struct Actuator<O: PulseOutput> {
    button: Button,
    output: O,
    calibration: ActuatorConfig,
    state: ActuatorState,
}

impl<O: PulseOutput> Actuator<O> {
    /// Take ownership of an output line and drive the arm to its park angle
    pub fn attach(
        button: Button,
        output: O,
        config: &ActuatorConfig,
    ) -> Result<Self, TapError<O::Error>> {
        let mut calibration = *config;
        calibration.park_angle = clamp_angle(
            calibration.park_angle,
            calibration.min_angle,
            calibration.max_angle,
        );

        let mut actuator = Self {
            button,
            output,
            calibration,
            state: ActuatorState::Released,
        };
        actuator.drive(actuator.calibration.park_angle)?;
        actuator.state = ActuatorState::Parked;
        Ok(actuator)
    }

    pub const fn button(&self) -> Button {
        self.button
    }

    pub const fn state(&self) -> ActuatorState {
        self.state
    }

    /// Current calibration, including live tuning
    pub const fn calibration(&self) -> &ActuatorConfig {
        &self.calibration
    }

    pub const fn park_angle(&self) -> f32 {
        self.calibration.park_angle
    }

    /// Output line, mostly useful for inspection in tests and previews
    pub const fn output(&self) -> &O {
        &self.output
    }

    /// Press the button once
    ///
    /// Blocks for the tap and recovery durations. Never interrupted.
    pub fn tap<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), TapError<O::Error>> {
        let lowered = self.calibration.park_angle - self.calibration.displacement;
        self.drive(lowered)?;
        self.state = ActuatorState::Lowered;
        hold(delay, self.calibration.tap);

        self.drive(self.calibration.park_angle)?;
        self.state = ActuatorState::Parked;
        hold(delay, self.calibration.recovery);
        Ok(())
    }

    /// Shift the park angle and move the arm there
    ///
    /// The result is clamped to the configured angle range, so any request
    /// is accepted. Returns the new park angle.
    pub fn tune_angle(&mut self, delta: f32) -> Result<f32, TapError<O::Error>> {
        if delta.is_finite() {
            self.calibration.park_angle = clamp_angle(
                self.calibration.park_angle + delta,
                self.calibration.min_angle,
                self.calibration.max_angle,
            );
        }
        self.drive(self.calibration.park_angle)?;
        self.state = ActuatorState::Parked;
        Ok(self.calibration.park_angle)
    }

    /// Shift the tap or recovery duration by `delta_ms`
    ///
    /// Clamped to `0..=MAX_TUNED_DURATION`. The cooldown phase belongs to
    /// the sequencer and leaves the arm untouched.
    pub fn tune_timing(&mut self, phase: TimingPhase, delta_ms: i32) -> Option<Duration> {
        let slot = match phase {
            TimingPhase::Tap => &mut self.calibration.tap,
            TimingPhase::Recovery => &mut self.calibration.recovery,
            TimingPhase::Cooldown => return None,
        };
        *slot = shift_duration(*slot, delta_ms);
        Some(*slot)
    }

    /// Raise the arm to the maintenance angle and switch the output off
    ///
    /// Does nothing if the arm was already released.
    pub fn release<D: DelayNs>(
        &mut self,
        maintenance: &MaintenanceConfig,
        delay: &mut D,
    ) -> Result<(), TapError<O::Error>> {
        if self.state == ActuatorState::Released {
            return Ok(());
        }
        self.drive(maintenance.angle)?;
        hold(delay, maintenance.settle);
        self.output
            .disable()
            .map_err(|cause| TapError::driver(self.button, cause))?;
        self.state = ActuatorState::Released;
        Ok(())
    }

    fn drive(&mut self, degrees: f32) -> Result<(), TapError<O::Error>> {
        self.output
            .set_pulse_width(degrees_to_pulse_width(degrees))
            .map_err(|cause| TapError::driver(self.button, cause))
    }
}

/// Clamp without panicking on an inverted range; `max` wins
fn clamp_angle(angle: f32, min: f32, max: f32) -> f32 {
    angle.max(min).min(max)
}

/// Add a signed millisecond delta to a duration, clamped to the tuning range
///
/// A duration already above the range never grows and never jumps down to
/// the limit.
pub(crate) fn shift_duration(duration: Duration, delta_ms: i32) -> Duration {
    let current = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
    let max = i64::try_from(MAX_TUNED_DURATION.as_millis()).unwrap_or(i64::MAX);
    let shifted = current
        .saturating_add(i64::from(delta_ms))
        .clamp(0, max.max(current));
    Duration::from_millis(shifted.unsigned_abs())
}
