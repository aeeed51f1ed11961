/// Resolution of the frames produced by a source
///
/// Fixed for a session. Every [`SamplePoint`] is clamped into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBounds {
    pub width: u16,
    pub height: u16,
}

impl FrameBounds {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Check that the point lies inside the frame
    pub const fn contains(self, point: SamplePoint) -> bool {
        point.row < self.height && point.column < self.width
    }

    /// Largest valid row index
    pub const fn last_row(self) -> u16 {
        self.height.saturating_sub(1)
    }

    /// Largest valid column index
    pub const fn last_column(self) -> u16 {
        self.width.saturating_sub(1)
    }

    /// Clamp a point into the frame
    pub fn clamp(self, point: SamplePoint) -> SamplePoint {
        SamplePoint {
            row: point.row.min(self.last_row()),
            column: point.column.min(self.last_column()),
        }
    }

    /// Number of pixels in the frame
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Unit step direction for moving a sample point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A single pixel coordinate watched by the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplePoint {
    pub row: u16,
    pub column: u16,
}

impl SamplePoint {
    pub const fn new(row: u16, column: u16) -> Self {
        Self { row, column }
    }

    /// Move the point by one pixel, staying inside `bounds`
    #[must_use]
    pub fn step(self, direction: Direction, bounds: FrameBounds) -> Self {
        let moved = match direction {
            Direction::Up => Self::new(self.row.saturating_sub(1), self.column),
            Direction::Down => Self::new(self.row.saturating_add(1), self.column),
            Direction::Left => Self::new(self.row, self.column.saturating_sub(1)),
            Direction::Right => Self::new(self.row, self.column.saturating_add(1)),
        };
        bounds.clamp(moved)
    }

    /// Offset of the pixel inside a row-major buffer
    pub(crate) const fn offset(self, bounds: FrameBounds) -> usize {
        self.row as usize * bounds.width as usize + self.column as usize
    }
}

impl core::fmt::Display for SamplePoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({},{})", self.row, self.column)
    }
}
