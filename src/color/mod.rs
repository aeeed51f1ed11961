mod class;
mod classify;

pub use class::{Button, ColorClass};
pub use classify::{ClassifierConfig, classify};
use smart_leds::RGB8;

/// A single 3-channel pixel sample, always in red-green-blue order
pub type Rgb = RGB8;
