use super::{ColorClass, Rgb};

/// Calibration constants of the classifier
///
/// There are no universal values here: every rig and lighting setup
/// needs its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Margin by which the dominant channel must exceed both others
    pub differential: u8,
    /// Level every channel must exceed for a sample to read as white
    pub brightness_floor: u8,
}

impl ClassifierConfig {
    pub const fn new(differential: u8, brightness_floor: u8) -> Self {
        Self {
            differential,
            brightness_floor,
        }
    }
}

/// Classify a single sample
///
/// Rules are checked in order: red dominance, blue dominance, white floor.
/// Ties never satisfy a rule, so an uncertain sample reads as
/// [`ColorClass::None`].
pub fn classify(sample: Rgb, config: ClassifierConfig) -> ColorClass {
    let r = u16::from(sample.r);
    let g = u16::from(sample.g);
    let b = u16::from(sample.b);
    let diff = u16::from(config.differential);
    let floor = u16::from(config.brightness_floor);

    if r > g + diff && r > b + diff {
        ColorClass::Red
    } else if b > r + diff && b > g + diff {
        ColorClass::Blue
    } else if r > floor && g > floor && b > floor {
        ColorClass::White
    } else {
        ColorClass::None
    }
}
