//! Calibration and control commands
//!
//! Commands come from an operator surface (keyboard, buttons, serial) and
//! are applied by the control loop at the start of a cycle.

use crate::actuator::TimingPhase;
use crate::bounds::Direction;
use crate::channel::{Channel, Receiver, Sender};
use crate::color::Button;

/// Angle step of a single tuning command, in degrees
pub const ANGLE_STEP: f32 = 1.0;

/// Duration step of a single timing command, in milliseconds
pub const TIMING_STEP_MS: i32 = 1;

/// Queue carrying [`Command`]s to the control loop
pub type CommandChannel<const SIZE: usize> = Channel<Command, SIZE>;

pub type CommandSender<'a, const SIZE: usize> = Sender<'a, Command, SIZE>;

pub type CommandReceiver<'a, const SIZE: usize> = Receiver<'a, Command, SIZE>;

/// Operations the control loop exposes to the operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Stop at the next cycle boundary
    Quit,
    /// Flip between armed (no taps) and live
    ToggleSafety,
    /// Select the next target for moving
    NextTarget,
    /// Move the selected target by one pixel
    MoveTarget(Direction),
    /// Tap one button and focus its arm for tuning
    TestTap(Button),
    /// Shift the focused arm's park angle, in degrees
    TuneAngle(f32),
    /// Shift a duration of the focused arm, or the cooldown, in milliseconds
    TuneTiming(TimingPhase, i32),
    /// Run the built-in tap pattern over every arm
    SelfTest,
    /// Log the latest per-lane reading
    PrintReading,
}

impl Command {
    /// Raise the focused arm by one step
    pub const fn raise() -> Self {
        Self::TuneAngle(ANGLE_STEP)
    }

    /// Lower the focused arm by one step
    pub const fn lower() -> Self {
        Self::TuneAngle(-ANGLE_STEP)
    }

    /// True for commands that drive an actuator
    pub const fn moves_arm(self) -> bool {
        matches!(self, Self::TestTap(_) | Self::TuneAngle(_) | Self::SelfTest)
    }

    /// Map a key from the classic keyboard layout
    ///
    /// `q` quit, `s` safety, `n` next target, `i`/`j`/`k`/`l` move,
    /// `1`/`2`/`3` test white/red/blue, `+`/`-` tune angle, `5`/`t` recovery,
    /// `g`/`b` tap, `c`/`v` cooldown, `?` self-test, `p` print.
    pub const fn from_key(key: char) -> Option<Self> {
        Some(match key {
            'q' | '\u{1b}' => Self::Quit,
            's' => Self::ToggleSafety,
            'n' => Self::NextTarget,
            'i' => Self::MoveTarget(Direction::Up),
            'k' => Self::MoveTarget(Direction::Down),
            'j' => Self::MoveTarget(Direction::Left),
            'l' => Self::MoveTarget(Direction::Right),
            '1' => Self::TestTap(Button::White),
            '2' => Self::TestTap(Button::Red),
            '3' => Self::TestTap(Button::Blue),
            '+' | '=' => Self::raise(),
            '-' | '_' => Self::lower(),
            '5' => Self::TuneTiming(TimingPhase::Recovery, TIMING_STEP_MS),
            't' => Self::TuneTiming(TimingPhase::Recovery, -TIMING_STEP_MS),
            'g' => Self::TuneTiming(TimingPhase::Tap, TIMING_STEP_MS),
            'b' => Self::TuneTiming(TimingPhase::Tap, -TIMING_STEP_MS),
            'c' => Self::TuneTiming(TimingPhase::Cooldown, TIMING_STEP_MS),
            'v' => Self::TuneTiming(TimingPhase::Cooldown, -TIMING_STEP_MS),
            '?' => Self::SelfTest,
            'p' => Self::PrintReading,
            _ => return None,
        })
    }
}
