//! Control loop - the main orchestrator
//!
//! One cycle: drain commands, acquire a frame, evaluate it, and when live
//! and the button combination changed, fire the tap sequence.

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use thiserror::Error;

use crate::PulseOutput;
use crate::actuator::TimingPhase;
use crate::actuator_map::{ActuatorLines, ActuatorMap};
use crate::color::Button;
use crate::command::{Command, CommandReceiver};
use crate::config::TapperConfig;
use crate::edge::EdgeDetector;
use crate::error::{ConfigError, TapError};
use crate::evaluator::{DiscardReason, Evaluation, FrameEvaluator, Markers, Sampled, SymbolVector};
use crate::frame::FrameSource;
use crate::report::CalibrationReport;
use crate::sequencer::ActuationSequencer;
use crate::target::TargetSet;

/// Safety state gating actuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyMode {
    /// Frames are evaluated but nothing is tapped
    Armed,
    /// Changed button combinations are tapped
    Live,
}

impl SafetyMode {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Armed => Self::Live,
            Self::Live => Self::Armed,
        }
    }
}

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Quit,
    EndOfStream,
}

/// Outcome of a single cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle<const LANES: usize> {
    Discarded(DiscardReason),
    /// Usable frame seen while armed
    Observed(SymbolVector<LANES>),
    /// Usable frame equal to the last fired vector
    Unchanged(SymbolVector<LANES>),
    Fired(SymbolVector<LANES>),
    Stopped(StopReason),
}

/// Failure while bringing the machine up
#[derive(Debug, Error)]
pub enum StartupError<E: core::fmt::Debug> {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to park actuators: {0}")]
    Driver(TapError<E>),
}

impl<E: core::fmt::Debug> From<TapError<E>> for StartupError<E> {
    fn from(err: TapError<E>) -> Self {
        Self::Driver(err)
    }
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct RunSummary<const LANES: usize> {
    pub stop: StopReason,
    /// Number of tap sequences fired
    pub fired: u32,
    pub report: CalibrationReport<LANES>,
}

/// The tap machine
///
/// Owns the frame source, every actuator and the delay provider. Nothing
/// else touches them while it runs.
pub struct ControlLoop<'a, S, O, D, const LANES: usize, const COMMANDS: usize>
where
    S: FrameSource,
    O: PulseOutput,
    D: DelayNs,
{
    // External dependencies
    source: S,
    commands: CommandReceiver<'a, COMMANDS>,
    delay: D,

    // Pipeline
    evaluator: FrameEvaluator,
    targets: TargetSet<LANES>,
    actuators: ActuatorMap<O>,
    edge: EdgeDetector<LANES>,
    sequencer: ActuationSequencer,

    // Internal state
    mode: SafetyMode,
    focus: Button,
    last_sample: Option<Sampled<LANES>>,
    stop: Option<StopReason>,
    fired: u32,
    released: bool,
}

impl<'a, S, O, D, const LANES: usize, const COMMANDS: usize> ControlLoop<'a, S, O, D, LANES, COMMANDS>
where
    S: FrameSource,
    O: PulseOutput,
    D: DelayNs,
{
    /// Validate the config and park every arm
    ///
    /// The loop starts armed.
    pub fn new(
        source: S,
        lines: ActuatorLines<O>,
        mut delay: D,
        commands: CommandReceiver<'a, COMMANDS>,
        config: &TapperConfig<LANES>,
    ) -> Result<Self, StartupError<O::Error>> {
        config.validate()?;
        let actuators = ActuatorMap::attach(lines, &config.actuators, &mut delay)?;
        log::info!("{} arms parked, {} lanes, safety on", Button::ALL.len(), LANES);

        Ok(Self {
            source,
            commands,
            delay,
            evaluator: FrameEvaluator::new(config.classifier),
            targets: TargetSet::new(&config.targets, config.bounds),
            actuators,
            edge: EdgeDetector::new(),
            sequencer: ActuationSequencer::new(config.cooldown),
            mode: SafetyMode::Armed,
            focus: Button::White,
            last_sample: None,
            stop: None,
            fired: 0,
            released: false,
        })
    }

    /// Run cycles until quit, end of stream or a driver failure
    ///
    /// The arms are released on every one of those paths.
    pub fn run(mut self) -> Result<RunSummary<LANES>, TapError<O::Error>> {
        let outcome = loop {
            match self.step() {
                Ok(Cycle::Stopped(reason)) => break Ok(reason),
                Ok(_) => {}
                Err(err) => {
                    log::error!("stopping: {}", err);
                    break Err(err);
                }
            }
        };

        let report = self.report();
        log::info!("final calibration:\n{}", report);
        let released = self.shutdown();

        let stop = outcome?;
        released?;
        Ok(RunSummary {
            stop,
            fired: self.fired,
            report,
        })
    }

    /// Run a single cycle
    ///
    /// After [`Self::shutdown`] every call reports the stop without reading
    /// a frame.
    pub fn step(&mut self) -> Result<Cycle<LANES>, TapError<O::Error>> {
        self.process_commands()?;
        if let Some(reason) = self.stop {
            return Ok(Cycle::Stopped(reason));
        }

        let sampled = {
            let Some(frame) = self.source.acquire() else {
                log::info!("frame source exhausted");
                self.stop = Some(StopReason::EndOfStream);
                return Ok(Cycle::Stopped(StopReason::EndOfStream));
            };
            self.evaluator.sample(&frame, &self.targets)
        };
        self.last_sample = Some(sampled);

        let vector = match sampled.evaluation {
            Evaluation::Usable(vector) => vector,
            Evaluation::Discard(reason) => {
                log::debug!("discarded {:?}: {}", reason, Markers(&sampled.reading));
                return Ok(Cycle::Discarded(reason));
            }
        };

        if self.mode == SafetyMode::Armed {
            return Ok(Cycle::Observed(vector));
        }
        if !self.edge.should_act(&vector) {
            return Ok(Cycle::Unchanged(vector));
        }

        log::info!("tapping {}", Markers(&vector));
        self.sequencer
            .fire(&vector, &mut self.actuators, &mut self.edge, &mut self.delay)?;
        self.fired = self.fired.wrapping_add(1);
        Ok(Cycle::Fired(vector))
    }

    /// Apply every queued command
    fn process_commands(&mut self) -> Result<(), TapError<O::Error>> {
        while self.stop.is_none() {
            let Some(command) = self.commands.try_receive() else {
                break;
            };
            self.apply(command)?;
        }
        Ok(())
    }

    /// Apply one command immediately
    ///
    /// Once the arms are released, commands that would move them are
    /// ignored.
    pub fn apply(&mut self, command: Command) -> Result<(), TapError<O::Error>> {
        if self.released && command.moves_arm() {
            log::warn!("arms released, ignoring {:?}", command);
            return Ok(());
        }
        match command {
            Command::Quit => {
                log::info!("quit requested");
                self.stop = Some(StopReason::Quit);
            }
            Command::ToggleSafety => self.set_mode(self.mode.toggled()),
            Command::NextTarget => {
                let slot = self.targets.select_next();
                log::info!("selected {:?} at {}", slot, self.targets.selected_point());
            }
            Command::MoveTarget(direction) => {
                let point = self.targets.move_selected(direction);
                log::info!("{:?} moved to {}", self.targets.selected(), point);
            }
            Command::TestTap(button) => {
                self.focus = button;
                self.actuators.tap(button, &mut self.delay)?;
                log::info!("test tap {} (park {:.1})", button, self.actuators.get(button).park_angle());
            }
            Command::TuneAngle(delta) => {
                let angle = self.actuators.get_mut(self.focus).tune_angle(delta)?;
                log::info!("{} park angle {:.1}", self.focus, angle);
            }
            Command::TuneTiming(phase, delta_ms) => self.tune_timing(phase, delta_ms),
            Command::SelfTest => self.self_test()?,
            Command::PrintReading => match &self.last_sample {
                Some(sample) => log::info!(
                    "reading {} sentinel {}",
                    Markers(&sample.reading),
                    sample.sentinel
                ),
                None => log::info!("no frame evaluated yet"),
            },
        }
        Ok(())
    }

    /// Switch safety mode
    ///
    /// Entering live forgets the last fired vector so the next usable frame
    /// always taps.
    pub fn set_mode(&mut self, mode: SafetyMode) {
        if mode == SafetyMode::Live && self.mode != SafetyMode::Live {
            self.edge.reset();
        }
        self.mode = mode;
        match mode {
            SafetyMode::Armed => log::info!("safety on"),
            SafetyMode::Live => log::info!("safety off"),
        }
    }

    fn tune_timing(&mut self, phase: TimingPhase, delta_ms: i32) {
        let duration: Duration = match phase {
            TimingPhase::Cooldown => self.sequencer.tune_cooldown(delta_ms),
            TimingPhase::Tap | TimingPhase::Recovery => {
                match self.actuators.get_mut(self.focus).tune_timing(phase, delta_ms) {
                    Some(duration) => duration,
                    None => return,
                }
            }
        };
        log::info!("{} {:?} {} ms", self.focus, phase, duration.as_millis());
    }

    /// Tap every arm once per lane, then cycle through all arms once per lane
    fn self_test(&mut self) -> Result<(), TapError<O::Error>> {
        log::info!("self test");
        for button in Button::ALL {
            for _ in 0..LANES {
                self.actuators.tap(button, &mut self.delay)?;
            }
        }
        for _ in 0..LANES {
            for button in Button::ALL {
                self.actuators.tap(button, &mut self.delay)?;
            }
        }
        Ok(())
    }

    /// Release every arm and stop the loop; later calls do nothing
    pub fn shutdown(&mut self) -> Result<(), TapError<O::Error>> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        if self.stop.is_none() {
            self.stop = Some(StopReason::Quit);
        }
        log::info!("releasing arms");
        self.actuators.release_all(&mut self.delay)
    }

    /// Snapshot of the current calibration
    pub fn report(&self) -> CalibrationReport<LANES> {
        CalibrationReport::capture(&self.actuators, &self.targets, self.sequencer.cooldown())
    }

    pub const fn mode(&self) -> SafetyMode {
        self.mode
    }

    /// Arm that tuning commands apply to
    pub const fn focus(&self) -> Button {
        self.focus
    }

    pub const fn targets(&self) -> &TargetSet<LANES> {
        &self.targets
    }

    pub const fn actuators(&self) -> &ActuatorMap<O> {
        &self.actuators
    }

    pub const fn cooldown(&self) -> Duration {
        self.sequencer.cooldown()
    }

    /// Latest sampled frame, usable or not
    pub const fn last_sample(&self) -> Option<&Sampled<LANES>> {
        self.last_sample.as_ref()
    }

    /// Number of tap sequences fired so far
    pub const fn fired(&self) -> u32 {
        self.fired
    }

    pub const fn is_stopped(&self) -> bool {
        self.stop.is_some()
    }
}

impl<S, O, D, const LANES: usize, const COMMANDS: usize> Drop for ControlLoop<'_, S, O, D, LANES, COMMANDS>
where
    S: FrameSource,
    O: PulseOutput,
    D: DelayNs,
{
    fn drop(&mut self) {
        if !self.released {
            log::warn!("control loop dropped without shutdown, releasing arms");
            let _ = self.shutdown();
        }
    }
}
