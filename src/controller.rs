//! Controller abstraction
//!
//! A controller owns one output (a pin or a group of lanes) and turns
//! pixel buffers into a transmission. The trait is object safe so a
//! [`Registry`](crate::registry::Registry) can hold controllers of
//! different chipsets side by side.

use crate::adjustment::Adjustment;
use crate::color::Rgb;
use crate::dither::DitherMode;
use crate::error::Error;

/// Lifecycle of a controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerState {
    /// Constructed, output not configured yet
    #[default]
    Uninitialized,
    /// Output idle low, ready to show
    Ready,
}

/// Per-controller output settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub adjustment: Adjustment,
    pub dither: DitherMode,
}

impl Settings {
    /// Per-channel scale for the requested brightness
    pub fn scale(&self, brightness: u8) -> Rgb {
        self.adjustment.scale(brightness)
    }

    pub fn set_correction(&mut self, correction: Rgb) {
        self.adjustment.correction = correction;
    }

    pub fn set_temperature(&mut self, temperature: Rgb) {
        self.adjustment.temperature = temperature;
    }
}

/// LED output driven from pixel buffers
pub trait LedController {
    /// Put the output into its idle state
    fn init(&mut self);

    /// Return to `Ready` after an aborted sequence, forcing a full reset gap
    fn reset(&mut self);

    fn state(&self) -> ControllerState;

    fn settings(&self) -> &Settings;

    fn settings_mut(&mut self) -> &mut Settings;

    /// Send `leds` scaled by `brightness` (plus correction and temperature)
    fn show(&mut self, leds: &[Rgb], brightness: u8) -> Result<(), Error>;

    /// Send `color` to `count` LEDs
    fn show_color(&mut self, color: Rgb, count: usize, brightness: u8) -> Result<(), Error>;

    /// Check if the controller is ready to show
    fn is_ready(&self) -> bool {
        self.state() == ControllerState::Ready
    }
}
