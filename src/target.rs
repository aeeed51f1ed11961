//! Sample points watched on every frame

use crate::bounds::{Direction, FrameBounds, SamplePoint};

/// Initial placement of the sample points
#[derive(Debug, Clone, Copy)]
pub struct TargetConfig<const LANES: usize> {
    /// One point per button lane, left to right
    pub lanes: [SamplePoint; LANES],
    /// Point that shows white while the start banner is visible
    pub sentinel: SamplePoint,
}

/// Which point a move command applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSlot {
    Lane(usize),
    Sentinel,
}

/// Lane targets plus the start-signal sentinel
///
/// The number of lanes is fixed for the session. Every point is kept inside
/// the frame bounds and moves independently of the others.
#[derive(Debug, Clone)]
pub struct TargetSet<const LANES: usize> {
    lanes: [SamplePoint; LANES],
    sentinel: SamplePoint,
    bounds: FrameBounds,
    selected: TargetSlot,
}

impl<const LANES: usize> TargetSet<LANES> {
    /// Create a target set, clamping every point into `bounds`
    pub fn new(config: &TargetConfig<LANES>, bounds: FrameBounds) -> Self {
        Self {
            lanes: config.lanes.map(|point| bounds.clamp(point)),
            sentinel: bounds.clamp(config.sentinel),
            bounds,
            selected: if LANES > 0 {
                TargetSlot::Lane(0)
            } else {
                TargetSlot::Sentinel
            },
        }
    }

    pub const fn lanes(&self) -> &[SamplePoint; LANES] {
        &self.lanes
    }

    pub const fn sentinel(&self) -> SamplePoint {
        self.sentinel
    }

    pub const fn bounds(&self) -> FrameBounds {
        self.bounds
    }

    /// Currently selected slot for move commands
    pub const fn selected(&self) -> TargetSlot {
        self.selected
    }

    /// Coordinates of the selected point
    pub fn selected_point(&self) -> SamplePoint {
        match self.selected {
            TargetSlot::Lane(index) => self.lanes[index],
            TargetSlot::Sentinel => self.sentinel,
        }
    }

    /// Select the next point: lanes left to right, then the sentinel, then wrap
    pub fn select_next(&mut self) -> TargetSlot {
        self.selected = match self.selected {
            TargetSlot::Lane(index) if index + 1 < LANES => TargetSlot::Lane(index + 1),
            TargetSlot::Lane(_) => TargetSlot::Sentinel,
            TargetSlot::Sentinel if LANES > 0 => TargetSlot::Lane(0),
            TargetSlot::Sentinel => TargetSlot::Sentinel,
        };
        self.selected
    }

    /// Move the selected point one pixel and return its new position
    pub fn move_selected(&mut self, direction: Direction) -> SamplePoint {
        let bounds = self.bounds;
        let point = match self.selected {
            TargetSlot::Lane(index) => &mut self.lanes[index],
            TargetSlot::Sentinel => &mut self.sentinel,
        };
        *point = point.step(direction, bounds);
        *point
    }
}
