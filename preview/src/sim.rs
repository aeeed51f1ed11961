//! Simulated game board, servo arms and clock
//!
//! Every wait of the control loop advances the board clock, so the board
//! only moves while the machine is waiting or reading frames.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration as StdDuration;

use embedded_hal::delay::DelayNs;
use myrtio_tapper::{
    ActuatorConfig, ActuatorLines, ActuatorMapConfig, Button, ChannelOrder, ClassifierConfig,
    Duration, FrameBounds, FrameSource, MaintenanceConfig, PackedFrame, PulseOutput, Rgb,
    SamplePoint, TapperConfig, TargetConfig,
    actuator::{MAX_DEGREES, PULSE_WIDTH_MIN_US, PULSE_WIDTH_SPAN_US},
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub const LANES: usize = 4;

pub const BOUNDS: FrameBounds = FrameBounds::new(160, 90);

const FRAME_PERIOD: StdDuration = StdDuration::from_millis(33);
const BANNER_TIME: StdDuration = StdDuration::from_millis(2500);
const TRANSITION_TIME: StdDuration = StdDuration::from_millis(400);

const LANE_ROW: u16 = 40;
const LANE_SIZE: u16 = 24;
const SENTINEL: SamplePoint = SamplePoint::new(75, 80);
const BANNER_ROWS: core::ops::Range<u16> = 66..84;

const BACKGROUND: Rgb = Rgb::new(30, 30, 30);
const LANE_OFF: Rgb = Rgb::new(0, 0, 0);
const BANNER: Rgb = Rgb::new(235, 235, 235);

/// Arm angle at which the button registers, per button
const fn contact_angle(button: Button) -> f32 {
    match button {
        Button::Red => 10.0,
        Button::White => 37.0,
        Button::Blue => 14.0,
    }
}

pub const fn button_color(button: Button) -> Rgb {
    match button {
        Button::Red => Rgb::new(210, 40, 40),
        Button::White => Rgb::new(220, 220, 220),
        Button::Blue => Rgb::new(40, 60, 210),
    }
}

const fn lane_column(lane: usize) -> u16 {
    #[allow(clippy::cast_possible_truncation)]
    let lane = lane as u16;
    20 + lane * 40
}

/// Startup configuration matching the simulated rig
pub fn config() -> TapperConfig<LANES> {
    let arm = |park_angle| ActuatorConfig {
        park_angle,
        displacement: 9.0,
        tap: Duration::from_millis(50),
        recovery: Duration::from_millis(110),
        min_angle: 5.0,
        max_angle: 120.0,
    };
    TapperConfig {
        bounds: BOUNDS,
        classifier: ClassifierConfig::new(32, 100),
        targets: TargetConfig {
            lanes: core::array::from_fn(|lane| {
                SamplePoint::new(LANE_ROW - 6, lane_column(lane) + 3)
            }),
            sentinel: SENTINEL,
        },
        actuators: ActuatorMapConfig {
            red: arm(14.0),
            white: arm(41.0),
            blue: arm(18.0),
            maintenance: MaintenanceConfig {
                angle: 90.0,
                settle: Duration::from_millis(300),
            },
        },
        cooldown: Duration::from_millis(210),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Start banner over the sentinel
    Banner,
    /// Combination visible, waiting for presses
    Showing,
    /// Lanes dark between rounds
    Transition,
}

#[derive(Debug, Clone, Copy)]
pub struct ArmView {
    pub button: Button,
    pub angle: f32,
    pub powered: bool,
    pub presses: u32,
}

#[derive(Debug)]
pub struct Board {
    clock: StdDuration,
    phase: Phase,
    phase_until: StdDuration,
    combination: [Button; LANES],
    progress: usize,
    rounds: u32,
    misses: u32,
    arms: [ArmView; 3],
    rng: SmallRng,
}

impl Board {
    pub fn new() -> Self {
        let mut rng = SmallRng::from_entropy();
        let combination = random_combination(&mut rng);
        let arm = |button| ArmView {
            button,
            angle: MAX_DEGREES / 2.0,
            powered: false,
            presses: 0,
        };
        Self {
            clock: StdDuration::ZERO,
            phase: Phase::Banner,
            phase_until: BANNER_TIME,
            combination,
            progress: 0,
            rounds: 0,
            misses: 0,
            arms: [arm(Button::Red), arm(Button::White), arm(Button::Blue)],
            rng,
        }
    }

    pub const fn clock(&self) -> StdDuration {
        self.clock
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    pub const fn misses(&self) -> u32 {
        self.misses
    }

    pub const fn progress(&self) -> usize {
        self.progress
    }

    pub const fn arms(&self) -> &[ArmView; 3] {
        &self.arms
    }

    /// Show the start banner again and restart the score
    pub fn restart(&mut self) {
        self.phase = Phase::Banner;
        self.phase_until = self.clock + BANNER_TIME;
        self.progress = 0;
        self.rounds = 0;
        self.misses = 0;
    }

    fn advance(&mut self, elapsed: StdDuration) {
        self.clock += elapsed;
        if self.phase != Phase::Showing && self.clock >= self.phase_until {
            if self.phase == Phase::Transition {
                self.next_combination();
            }
            self.phase = Phase::Showing;
        }
    }

    fn next_combination(&mut self) {
        let previous = self.combination;
        while self.combination == previous {
            self.combination = random_combination(&mut self.rng);
        }
        self.progress = 0;
    }

    fn drive(&mut self, button: Button, width_us: u16) {
        let angle =
            (f32::from(width_us) - PULSE_WIDTH_MIN_US) * MAX_DEGREES / PULSE_WIDTH_SPAN_US;
        let arm = &mut self.arms[button as usize];
        let contact = contact_angle(button);
        let touched = arm.angle > contact && angle <= contact;
        arm.angle = angle;
        arm.powered = true;
        if touched {
            arm.presses += 1;
            self.press(button);
        }
    }

    fn disable(&mut self, button: Button) {
        self.arms[button as usize].powered = false;
    }

    fn press(&mut self, button: Button) {
        if self.phase != Phase::Showing {
            self.misses += 1;
            return;
        }
        if self.combination[self.progress] != button {
            log::warn!(
                "board: {} pressed, lane {} wanted {}",
                button,
                self.progress,
                self.combination[self.progress]
            );
            self.misses += 1;
            self.progress = 0;
            return;
        }
        self.progress += 1;
        if self.progress == LANES {
            self.rounds += 1;
            self.phase = Phase::Transition;
            self.phase_until = self.clock + TRANSITION_TIME;
        }
    }

    /// Paint the current board into a packed RGB buffer
    pub fn render(&self, buffer: &mut Vec<u8>) {
        buffer.clear();
        buffer.reserve(BOUNDS.area() * 3);
        for row in 0..BOUNDS.height {
            for column in 0..BOUNDS.width {
                let px = self.pixel(row, column);
                buffer.extend_from_slice(&[px.r, px.g, px.b]);
            }
        }
    }

    fn pixel(&self, row: u16, column: u16) -> Rgb {
        if self.phase == Phase::Banner && BANNER_ROWS.contains(&row) {
            return BANNER;
        }
        let half = LANE_SIZE / 2;
        if row.abs_diff(LANE_ROW) < half {
            for lane in 0..LANES {
                if column.abs_diff(lane_column(lane)) < half {
                    return match self.phase {
                        Phase::Transition => LANE_OFF,
                        Phase::Banner | Phase::Showing => button_color(self.combination[lane]),
                    };
                }
            }
        }
        BACKGROUND
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn random_combination(rng: &mut SmallRng) -> [Button; LANES] {
    core::array::from_fn(|_| Button::ALL[rng.gen_range(0..Button::ALL.len())])
}

pub type SharedBoard = Arc<Mutex<Board>>;

pub fn lock(board: &SharedBoard) -> MutexGuard<'_, Board> {
    board.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Servo line whose arm presses the simulated button
pub struct SimLine {
    button: Button,
    board: SharedBoard,
}

impl PulseOutput for SimLine {
    type Error = Infallible;

    fn set_pulse_width(&mut self, width_us: u16) -> Result<(), Self::Error> {
        lock(&self.board).drive(self.button, width_us);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        lock(&self.board).disable(self.button);
        Ok(())
    }
}

pub fn lines(board: &SharedBoard) -> ActuatorLines<SimLine> {
    let line = |button| SimLine {
        button,
        board: Arc::clone(board),
    };
    ActuatorLines {
        red: line(Button::Red),
        white: line(Button::White),
        blue: line(Button::Blue),
    }
}

/// Sleeps in real time and advances the board clock by the same amount
pub struct SimDelay {
    board: SharedBoard,
}

impl SimDelay {
    pub fn new(board: &SharedBoard) -> Self {
        Self {
            board: Arc::clone(board),
        }
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        let elapsed = StdDuration::from_nanos(u64::from(ns));
        std::thread::sleep(elapsed);
        lock(&self.board).advance(elapsed);
    }
}

/// Camera stand-in: renders the board once per frame period
pub struct SimSource {
    board: SharedBoard,
    running: Arc<AtomicBool>,
    buffer: Vec<u8>,
}

impl SimSource {
    pub fn new(board: &SharedBoard, running: &Arc<AtomicBool>) -> Self {
        Self {
            board: Arc::clone(board),
            running: Arc::clone(running),
            buffer: Vec::with_capacity(BOUNDS.area() * 3),
        }
    }
}

impl FrameSource for SimSource {
    type Frame<'f> = PackedFrame<'f>;

    fn acquire(&mut self) -> Option<Self::Frame<'_>> {
        if !self.running.load(Ordering::Acquire) {
            return None;
        }
        std::thread::sleep(FRAME_PERIOD);
        {
            let mut board = lock(&self.board);
            board.advance(FRAME_PERIOD);
            board.render(&mut self.buffer);
        }
        PackedFrame::new(&self.buffer, BOUNDS, ChannelOrder::Rgb)
    }
}
