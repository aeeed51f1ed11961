//! Shared fixtures: recording servo lines, a recording delay and scripted frames

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use myrtio_tapper::{
    ActuatorConfig, ActuatorLines, ActuatorMapConfig, Button, ChannelOrder, ClassifierConfig,
    Duration, FrameBounds, FrameSource, MaintenanceConfig, PackedFrame, PulseOutput, Rgb,
    SamplePoint, TapperConfig, TargetConfig,
};

pub const LANES: usize = 4;

pub const RED: Rgb = Rgb::new(200, 50, 50);
pub const WHITE: Rgb = Rgb::new(200, 200, 200);
pub const BLUE: Rgb = Rgb::new(50, 50, 200);
pub const GREY: Rgb = Rgb::new(90, 90, 90);
pub const BLACK: Rgb = Rgb::new(0, 0, 0);

pub const BOUNDS: FrameBounds = FrameBounds::new(16, 8);

pub const LANE_POINTS: [SamplePoint; LANES] = [
    SamplePoint::new(2, 1),
    SamplePoint::new(2, 5),
    SamplePoint::new(2, 9),
    SamplePoint::new(2, 13),
];
pub const SENTINEL: SamplePoint = SamplePoint::new(6, 8);

/// Everything that reached the hardware, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Pulse(Button, u16),
    Disabled(Button),
    /// Blocking wait in nanoseconds
    Wait(u64),
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Buttons pressed, in order
    ///
    /// A press is a pulse narrower than the previous pulse on the same line,
    /// so the journal must not be cleared between attach and the taps.
    pub fn taps(&self) -> Vec<Button> {
        let mut last: [Option<u16>; 3] = [None; 3];
        let mut taps = Vec::new();
        for event in self.0.borrow().iter() {
            if let Event::Pulse(button, width) = *event {
                let slot = &mut last[button as usize];
                if slot.is_some_and(|previous| width < previous) {
                    taps.push(button);
                }
                *slot = Some(width);
            }
        }
        taps
    }

    pub fn disabled(&self) -> Vec<Button> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match *event {
                Event::Disabled(button) => Some(button),
                _ => None,
            })
            .collect()
    }

    pub fn waited(&self) -> u64 {
        self.0
            .borrow()
            .iter()
            .map(|event| match *event {
                Event::Wait(ns) => ns,
                _ => 0,
            })
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverFault;

/// Servo line that logs every write
#[derive(Debug)]
pub struct MockLine {
    button: Button,
    journal: Journal,
    /// Writes left before the line starts failing
    budget: Rc<Cell<Option<usize>>>,
}

impl MockLine {
    pub fn new(button: Button, journal: &Journal) -> Self {
        Self {
            button,
            journal: journal.clone(),
            budget: Rc::new(Cell::new(None)),
        }
    }

    pub fn button(&self) -> Button {
        self.button
    }

    /// Fail every write after `writes` successful ones
    pub fn failing_after(self, writes: usize) -> Self {
        self.budget.set(Some(writes));
        self
    }

    fn spend(&self) -> Result<(), DriverFault> {
        match self.budget.get() {
            Some(0) => Err(DriverFault),
            Some(left) => {
                self.budget.set(Some(left - 1));
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl PulseOutput for MockLine {
    type Error = DriverFault;

    fn set_pulse_width(&mut self, width_us: u16) -> Result<(), Self::Error> {
        self.spend()?;
        self.journal.push(Event::Pulse(self.button, width_us));
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        self.spend()?;
        self.journal.push(Event::Disabled(self.button));
        Ok(())
    }
}

/// Delay that returns immediately and logs the requested time
#[derive(Debug, Clone)]
pub struct MockDelay {
    journal: Journal,
}

impl MockDelay {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.journal.push(Event::Wait(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        self.journal.push(Event::Wait(u64::from(us) * 1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.journal.push(Event::Wait(u64::from(ms) * 1_000_000));
    }
}

pub fn lines(journal: &Journal) -> ActuatorLines<MockLine> {
    ActuatorLines {
        red: MockLine::new(Button::Red, journal),
        white: MockLine::new(Button::White, journal),
        blue: MockLine::new(Button::Blue, journal),
    }
}

pub fn arm(park_angle: f32) -> ActuatorConfig {
    ActuatorConfig {
        park_angle,
        displacement: 9.0,
        tap: Duration::from_millis(50),
        recovery: Duration::from_millis(110),
        min_angle: 12.0,
        max_angle: 178.0,
    }
}

pub fn actuator_config() -> ActuatorMapConfig {
    ActuatorMapConfig {
        red: arm(14.0),
        white: arm(41.0),
        blue: arm(18.0),
        maintenance: MaintenanceConfig {
            angle: 90.0,
            settle: Duration::from_millis(100),
        },
    }
}

pub fn config() -> TapperConfig<LANES> {
    TapperConfig {
        bounds: BOUNDS,
        classifier: ClassifierConfig::new(32, 100),
        targets: TargetConfig {
            lanes: LANE_POINTS,
            sentinel: SENTINEL,
        },
        actuators: actuator_config(),
        cooldown: Duration::from_millis(210),
    }
}

pub fn color_of(button: Button) -> Rgb {
    match button {
        Button::Red => RED,
        Button::White => WHITE,
        Button::Blue => BLUE,
    }
}

/// Packed RGB buffer with the given pixels painted over a black background
pub fn paint(pixels: &[(SamplePoint, Rgb)]) -> Vec<u8> {
    let mut data = vec![0u8; BOUNDS.area() * 3];
    for &(point, color) in pixels {
        let offset = (usize::from(point.row) * usize::from(BOUNDS.width)
            + usize::from(point.column))
            * 3;
        data[offset..offset + 3].copy_from_slice(&[color.r, color.g, color.b]);
    }
    data
}

/// Frame showing the lane colors and a grey sentinel
pub fn scene(lanes: [Rgb; LANES], sentinel: Rgb) -> Vec<u8> {
    let mut pixels: Vec<(SamplePoint, Rgb)> =
        LANE_POINTS.iter().copied().zip(lanes).collect();
    pixels.push((SENTINEL, sentinel));
    paint(&pixels)
}

/// Frame showing the given button combination, round already started
pub fn buttons(vector: [Button; LANES]) -> Vec<u8> {
    scene(vector.map(color_of), GREY)
}

/// Source that replays prepared buffers, then reports end of stream
#[derive(Debug, Default)]
pub struct ScriptedSource {
    pending: VecDeque<Vec<u8>>,
    current: Vec<u8>,
    acquired: Rc<Cell<usize>>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            pending: frames.into_iter().collect(),
            current: Vec::new(),
            acquired: Rc::new(Cell::new(0)),
        }
    }

    /// Shared counter of acquired frames
    pub fn counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.acquired)
    }
}

impl FrameSource for ScriptedSource {
    type Frame<'f> = PackedFrame<'f>;

    fn acquire(&mut self) -> Option<Self::Frame<'_>> {
        self.current = self.pending.pop_front()?;
        self.acquired.set(self.acquired.get() + 1);
        PackedFrame::new(&self.current, BOUNDS, ChannelOrder::Rgb)
    }
}
