//! Symbolic color alphabet
//!
//! A pixel is read as one of three button colors or as inconclusive.

use core::fmt;

const NAME_RED: &str = "RED";
const NAME_WHITE: &str = "WHITE";
const NAME_BLUE: &str = "BLUE";
const NAME_NONE: &str = "NONE";

/// Classification result for a single sample point
///
/// [`ColorClass::None`] means background or transition noise,
/// not a fourth button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorClass {
    Red,
    White,
    Blue,
    #[default]
    None,
}

/// A physical button on the game board
///
/// Every button has exactly one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Red,
    White,
    Blue,
}

impl Button {
    /// All buttons in self-test order
    pub const ALL: [Self; 3] = [Self::White, Self::Red, Self::Blue];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => NAME_RED,
            Self::White => NAME_WHITE,
            Self::Blue => NAME_BLUE,
        }
    }

    /// Short marker used when printing a whole vector
    pub const fn marker(self) -> char {
        match self {
            Self::Red => 'R',
            Self::White => 'W',
            Self::Blue => 'B',
        }
    }
}

impl ColorClass {
    /// Button for this class, `None` when inconclusive
    pub const fn button(self) -> Option<Button> {
        match self {
            Self::Red => Some(Button::Red),
            Self::White => Some(Button::White),
            Self::Blue => Some(Button::Blue),
            Self::None => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => NAME_RED,
            Self::White => NAME_WHITE,
            Self::Blue => NAME_BLUE,
            Self::None => NAME_NONE,
        }
    }

    pub const fn marker(self) -> char {
        match self {
            Self::Red => 'R',
            Self::White => 'W',
            Self::Blue => 'B',
            Self::None => '.',
        }
    }
}

impl From<Button> for ColorClass {
    fn from(button: Button) -> Self {
        match button {
            Button::Red => Self::Red,
            Button::White => Self::White,
            Button::Blue => Self::Blue,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ColorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
