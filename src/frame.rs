//! Frame access abstractions
//!
//! Capture itself lives outside this crate. A platform only has to expose
//! pixel lookup by coordinate and a blocking way to fetch the next frame.

use crate::bounds::{FrameBounds, SamplePoint};
use crate::color::Rgb;

/// A captured video frame
pub trait Frame {
    /// Resolution of the frame
    fn bounds(&self) -> FrameBounds;

    /// Read one pixel, `None` if the point is outside the frame
    fn pixel(&self, point: SamplePoint) -> Option<Rgb>;
}

/// Blocking source of frames
///
/// Each call yields the most recent frame. Frames produced while the
/// machine was busy are never replayed.
pub trait FrameSource {
    type Frame<'f>: Frame
    where
        Self: 'f;

    /// Block until the next frame is available
    ///
    /// Returns `None` when the stream is exhausted or capture failed.
    fn acquire(&mut self) -> Option<Self::Frame<'_>>;
}

/// Byte order of the three channels in a packed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    /// Blue-green-red, the usual layout of OpenCV and V4L2 captures
    Bgr,
}

/// Frame view over a packed row-major buffer with three bytes per pixel
#[derive(Debug, Clone, Copy)]
pub struct PackedFrame<'a> {
    data: &'a [u8],
    bounds: FrameBounds,
    order: ChannelOrder,
}

impl<'a> PackedFrame<'a> {
    /// Wrap a buffer
    ///
    /// Returns `None` if the buffer is too short for the given bounds.
    pub fn new(data: &'a [u8], bounds: FrameBounds, order: ChannelOrder) -> Option<Self> {
        if data.len() < bounds.area() * 3 {
            return None;
        }
        Some(Self {
            data,
            bounds,
            order,
        })
    }

    pub const fn order(&self) -> ChannelOrder {
        self.order
    }
}

impl Frame for PackedFrame<'_> {
    fn bounds(&self) -> FrameBounds {
        self.bounds
    }

    fn pixel(&self, point: SamplePoint) -> Option<Rgb> {
        if !self.bounds.contains(point) {
            return None;
        }
        let start = point.offset(self.bounds) * 3;
        let px = self.data.get(start..start + 3)?;
        Some(match self.order {
            ChannelOrder::Rgb => Rgb::new(px[0], px[1], px[2]),
            ChannelOrder::Bgr => Rgb::new(px[2], px[1], px[0]),
        })
    }
}
