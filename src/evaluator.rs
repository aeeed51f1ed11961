//! Frame evaluation with validity gating
//!
//! Turns a frame into the vector of buttons to press, or rejects it.

use crate::bounds::SamplePoint;
use crate::color::{Button, ClassifierConfig, ColorClass, classify};
use crate::frame::Frame;
use crate::target::TargetSet;

/// Buttons to press, one per lane, left to right
pub type SymbolVector<const LANES: usize> = [Button; LANES];

/// Raw classification of every lane, including inconclusive ones
pub type LaneReading<const LANES: usize> = [ColorClass; LANES];

/// Why a frame was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// At least one lane was inconclusive (motion blur, transition)
    Inconclusive,
    /// The start banner is still visible at the sentinel point
    StartBanner,
}

/// Result of evaluating one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation<const LANES: usize> {
    Usable(SymbolVector<LANES>),
    Discard(DiscardReason),
}

impl<const LANES: usize> Evaluation<LANES> {
    pub const fn is_usable(&self) -> bool {
        matches!(self, Self::Usable(_))
    }
}

/// Full outcome of sampling a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampled<const LANES: usize> {
    pub reading: LaneReading<LANES>,
    pub sentinel: ColorClass,
    pub evaluation: Evaluation<LANES>,
}

/// Samples a [`TargetSet`] against frames
#[derive(Debug, Clone, Copy)]
pub struct FrameEvaluator {
    classifier: ClassifierConfig,
}

impl FrameEvaluator {
    pub const fn new(classifier: ClassifierConfig) -> Self {
        Self { classifier }
    }

    pub const fn classifier(&self) -> ClassifierConfig {
        self.classifier
    }

    /// Evaluate a frame, discarding the raw readings
    pub fn evaluate<F: Frame, const LANES: usize>(
        &self,
        frame: &F,
        targets: &TargetSet<LANES>,
    ) -> Evaluation<LANES> {
        self.sample(frame, targets).evaluation
    }

    /// Classify every lane and the sentinel, then apply the gates
    ///
    /// Points outside the frame read as [`ColorClass::None`].
    pub fn sample<F: Frame, const LANES: usize>(
        &self,
        frame: &F,
        targets: &TargetSet<LANES>,
    ) -> Sampled<LANES> {
        let read = |point: SamplePoint| {
            frame
                .pixel(point)
                .map_or(ColorClass::None, |px| classify(px, self.classifier))
        };

        let reading = targets.lanes().map(read);
        let sentinel = read(targets.sentinel());

        Sampled {
            reading,
            sentinel,
            evaluation: gate(&reading, sentinel),
        }
    }
}

/// Apply both gates to a reading
///
/// Any inconclusive lane rejects the frame first; a white sentinel rejects
/// an otherwise complete reading.
pub fn gate<const LANES: usize>(
    reading: &LaneReading<LANES>,
    sentinel: ColorClass,
) -> Evaluation<LANES> {
    let mut vector = [Button::Red; LANES];
    for (slot, class) in vector.iter_mut().zip(reading) {
        match class.button() {
            Some(button) => *slot = button,
            None => return Evaluation::Discard(DiscardReason::Inconclusive),
        }
    }

    if sentinel == ColorClass::White {
        return Evaluation::Discard(DiscardReason::StartBanner);
    }

    Evaluation::Usable(vector)
}

/// Compact `R W B .` rendering of a vector or reading
pub struct Markers<'a, T>(pub &'a [T]);

impl<T: Copy + Into<ColorClass>> core::fmt::Display for Markers<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (index, &item) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", item.into().marker())?;
        }
        Ok(())
    }
}
