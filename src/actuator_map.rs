//! Exhaustive button to actuator mapping

use embedded_hal::delay::DelayNs;

use crate::PulseOutput;
use crate::actuator::{Actuator, ActuatorConfig, MaintenanceConfig};
use crate::color::Button;
use crate::error::TapError;

/// Startup calibration for all three arms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorMapConfig {
    pub red: ActuatorConfig,
    pub white: ActuatorConfig,
    pub blue: ActuatorConfig,
    pub maintenance: MaintenanceConfig,
}

impl ActuatorMapConfig {
    pub const fn get(&self, button: Button) -> &ActuatorConfig {
        match button {
            Button::Red => &self.red,
            Button::White => &self.white,
            Button::Blue => &self.blue,
        }
    }
}

/// Output lines for the three arms, one per button
#[derive(Debug)]
pub struct ActuatorLines<O> {
    pub red: O,
    pub white: O,
    pub blue: O,
}

/// One actuator per button
#[derive(Debug)]
pub struct ActuatorMap<O: PulseOutput> {
    red: Actuator<O>,
    white: Actuator<O>,
    blue: Actuator<O>,
    maintenance: MaintenanceConfig,
}

impl<O: PulseOutput> ActuatorMap<O> {
    /// Attach every line, driving each arm to its park angle
    ///
    /// If a line fails, the arms attached before it are released again.
    pub fn attach<D: DelayNs>(
        lines: ActuatorLines<O>,
        config: &ActuatorMapConfig,
        delay: &mut D,
    ) -> Result<Self, TapError<O::Error>> {
        let maintenance = config.maintenance;

        let mut red = Actuator::attach(Button::Red, lines.red, &config.red)?;
        let mut white = match Actuator::attach(Button::White, lines.white, &config.white) {
            Ok(white) => white,
            Err(err) => {
                let _ = red.release(&maintenance, delay);
                return Err(err);
            }
        };
        let blue = match Actuator::attach(Button::Blue, lines.blue, &config.blue) {
            Ok(blue) => blue,
            Err(err) => {
                let _ = red.release(&maintenance, delay);
                let _ = white.release(&maintenance, delay);
                return Err(err);
            }
        };

        Ok(Self {
            red,
            white,
            blue,
            maintenance,
        })
    }

    pub const fn get(&self, button: Button) -> &Actuator<O> {
        match button {
            Button::Red => &self.red,
            Button::White => &self.white,
            Button::Blue => &self.blue,
        }
    }

    pub fn get_mut(&mut self, button: Button) -> &mut Actuator<O> {
        match button {
            Button::Red => &mut self.red,
            Button::White => &mut self.white,
            Button::Blue => &mut self.blue,
        }
    }

    pub const fn maintenance(&self) -> &MaintenanceConfig {
        &self.maintenance
    }

    /// Tap a single button
    pub fn tap<D: DelayNs>(
        &mut self,
        button: Button,
        delay: &mut D,
    ) -> Result<(), TapError<O::Error>> {
        self.get_mut(button).tap(delay)
    }

    /// Release every arm
    ///
    /// Each arm is attempted even if an earlier one failed; the first
    /// failure is returned.
    pub fn release_all<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), TapError<O::Error>> {
        let maintenance = self.maintenance;
        let mut first_error = None;
        for button in Button::ALL {
            if let Err(err) = self.get_mut(button).release(&maintenance, delay) {
                log::warn!("failed to release {} arm: {}", button, err);
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
