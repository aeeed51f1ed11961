#![no_std]

pub mod actuator;
pub mod actuator_map;
pub mod bounds;
pub mod channel;
pub mod color;
pub mod command;
pub mod config;
pub mod control;
pub mod edge;
pub mod error;
pub mod evaluator;
pub mod frame;
pub mod report;
pub mod sequencer;
pub mod target;

pub use actuator::{
    Actuator, ActuatorConfig, ActuatorState, MaintenanceConfig, TimingPhase,
    degrees_to_pulse_width,
};
pub use actuator_map::{ActuatorLines, ActuatorMap, ActuatorMapConfig};
pub use bounds::{Direction, FrameBounds, SamplePoint};
pub use channel::{Channel, QueueFull};
pub use color::{Button, ClassifierConfig, ColorClass, Rgb, classify};
pub use command::{Command, CommandChannel, CommandReceiver, CommandSender};
pub use config::TapperConfig;
pub use control::{ControlLoop, Cycle, RunSummary, SafetyMode, StartupError, StopReason};
pub use edge::{EdgeDetector, should_act};
pub use error::{ConfigError, TapError};
pub use evaluator::{DiscardReason, Evaluation, FrameEvaluator, LaneReading, SymbolVector};
pub use frame::{ChannelOrder, Frame, FrameSource, PackedFrame};
pub use report::CalibrationReport;
pub use sequencer::ActuationSequencer;
pub use target::{TargetConfig, TargetSet, TargetSlot};

pub use embassy_time::{Delay, Duration};

/// Abstract servo output line
///
/// Implement this trait for the platform's PWM peripheral or daemon. Each
/// actuator owns exactly one line.
pub trait PulseOutput {
    /// Driver-specific failure
    type Error: core::fmt::Debug;

    /// Drive the line with the given pulse width, in microseconds
    fn set_pulse_width(&mut self, width_us: u16) -> Result<(), Self::Error>;

    /// Stop emitting pulses so the servo no longer holds position
    fn disable(&mut self) -> Result<(), Self::Error>;
}

/// Install the `esp-println` logger as the `log` backend
#[cfg(feature = "esp32-log")]
pub fn init_logger(level: log::LevelFilter) {
    esp_println::logger::init_logger(level);
}
