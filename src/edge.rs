//! Edge-triggered change detection
//!
//! A combination of buttons is pressed once, no matter how many frames keep
//! showing it.

use crate::evaluator::SymbolVector;

/// Returns true if `current` differs from `previous` in any lane
///
/// `None` stands for the "nothing acted upon yet" sentinel, which no real
/// vector equals.
pub fn should_act<const LANES: usize>(
    current: &SymbolVector<LANES>,
    previous: Option<&SymbolVector<LANES>>,
) -> bool {
    previous.is_none_or(|previous| previous != current)
}

/// Remembers the last vector that was actually fired
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector<const LANES: usize> {
    previous: Option<SymbolVector<LANES>>,
}

impl<const LANES: usize> EdgeDetector<LANES> {
    pub const fn new() -> Self {
        Self { previous: None }
    }

    pub fn should_act(&self, current: &SymbolVector<LANES>) -> bool {
        should_act(current, self.previous.as_ref())
    }

    /// Record a vector after its taps have completed
    pub fn commit(&mut self, fired: SymbolVector<LANES>) {
        self.previous = Some(fired);
    }

    /// Forget the last fired vector so the next reading always acts
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub const fn previous(&self) -> Option<&SymbolVector<LANES>> {
        self.previous.as_ref()
    }
}
