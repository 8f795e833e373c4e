//! Controller registry
//!
//! Holds every active controller together with the LED buffer it shows, so
//! global operations (brightness, correction, power budget scans) can walk
//! all outputs. Entries are only ever appended.

use heapless::Vec;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::color::Rgb;
use crate::controller::LedController;
use crate::dither::DitherMode;
use crate::error::Error;

struct Entry<'a> {
    controller: &'a mut dyn LedController,
    leds: &'a mut [Rgb],
}

/// Registry of up to `N` controllers
pub struct Registry<'a, const N: usize> {
    entries: Vec<Entry<'a>, N>,
    brightness: u8,
}

impl<const N: usize> Default for Registry<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> Registry<'a, N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            brightness: 255,
        }
    }

    /// Initialize `controller` and register it with its LED buffer
    ///
    /// Returns the index of the new entry.
    pub fn add(
        &mut self,
        controller: &'a mut dyn LedController,
        leds: &'a mut [Rgb],
    ) -> Result<usize, Error> {
        if self.entries.is_full() {
            return Err(Error::RegistryFull);
        }
        controller.init();

        #[cfg(feature = "esp32-log")]
        println!(
            "[Registry.add] controller {} with {} leds",
            self.entries.len(),
            leds.len()
        );

        self.entries
            .push(Entry { controller, leds })
            .map_err(|_| Error::RegistryFull)?;
        Ok(self.entries.len() - 1)
    }

    /// Number of registered controllers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of LEDs over all controllers
    pub fn total_leds(&self) -> usize {
        self.entries.iter().map(|entry| entry.leds.len()).sum()
    }

    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Set the global brightness used by [`show`](Self::show)
    pub fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    pub fn set_correction(&mut self, correction: Rgb) {
        for entry in &mut self.entries {
            entry.controller.settings_mut().set_correction(correction);
        }
    }

    pub fn set_temperature(&mut self, temperature: Rgb) {
        for entry in &mut self.entries {
            entry.controller.settings_mut().set_temperature(temperature);
        }
    }

    pub fn set_dither(&mut self, dither: DitherMode) {
        for entry in &mut self.entries {
            entry.controller.settings_mut().dither = dither;
        }
    }

    /// LED buffer of entry `index`
    pub fn leds(&self, index: usize) -> Option<&[Rgb]> {
        self.entries.get(index).map(|entry| &*entry.leds)
    }

    /// Mutable LED buffer of entry `index`
    pub fn leds_mut(&mut self, index: usize) -> Option<&mut [Rgb]> {
        self.entries.get_mut(index).map(|entry| &mut *entry.leds)
    }

    /// Walk all controllers with their buffers
    pub fn iter(&self) -> impl Iterator<Item = (&dyn LedController, &[Rgb])> + '_ {
        self.entries
            .iter()
            .map(|entry| (&*entry.controller as &dyn LedController, &*entry.leds))
    }

    /// Show every buffer at the global brightness
    pub fn show(&mut self) -> Result<(), Error> {
        self.show_with(self.brightness)
    }

    /// Show every buffer at `brightness`
    pub fn show_with(&mut self, brightness: u8) -> Result<(), Error> {
        for entry in &mut self.entries {
            entry.controller.show(entry.leds, brightness)?;
        }
        Ok(())
    }

    /// Show `color` on every LED of every controller
    pub fn show_color(&mut self, color: Rgb) -> Result<(), Error> {
        for entry in &mut self.entries {
            entry
                .controller
                .show_color(color, entry.leds.len(), self.brightness)?;
        }
        Ok(())
    }

    /// Zero every buffer, and send the black frame if `write` is set
    ///
    /// The black frame goes out at brightness 0, which also zeroes the
    /// dither offsets.
    pub fn clear(&mut self, write: bool) -> Result<(), Error> {
        for entry in &mut self.entries {
            entry.leds.fill(Rgb::default());
        }
        if write {
            for entry in &mut self.entries {
                entry
                    .controller
                    .show_color(Rgb::default(), entry.leds.len(), 0)?;
            }
        }
        Ok(())
    }
}
