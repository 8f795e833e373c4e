//! Color adjustment
//!
//! Folds color correction, color temperature and the requested brightness
//! into one per-channel scale that the pixel pipeline applies with a single
//! `scale8` per byte.

use crate::color::{Rgb, UNCORRECTED_COLOR, UNCORRECTED_TEMPERATURE, channel};

/// Correction and temperature of one controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    /// Correction factors for each channel (0-255 = 0%-100%)
    pub correction: Rgb,
    /// Temperature factors for each channel (0-255 = 0%-100%)
    pub temperature: Rgb,
}

impl Default for Adjustment {
    fn default() -> Self {
        Self::new(UNCORRECTED_COLOR, UNCORRECTED_TEMPERATURE)
    }
}

impl Adjustment {
    pub const fn new(correction: Rgb, temperature: Rgb) -> Self {
        Self {
            correction,
            temperature,
        }
    }

    /// Check if the adjustment changes anything besides brightness
    pub const fn is_active(self) -> bool {
        self.correction.r != 255
            || self.correction.g != 255
            || self.correction.b != 255
            || self.temperature.r != 255
            || self.temperature.g != 255
            || self.temperature.b != 255
    }

    /// Per-channel scale for the requested brightness
    pub fn scale(self, brightness: u8) -> Rgb {
        compute_adjustment(brightness, self.correction, self.temperature)
    }
}

/// Combine brightness, correction and temperature into one scale triplet
///
/// Each channel is `(correction + 1) * (temperature + 1) * scale / 0x10000`,
/// computed in 32 bits. A zero in any factor yields zero.
#[allow(clippy::cast_possible_truncation)]
pub fn compute_adjustment(scale: u8, correction: Rgb, temperature: Rgb) -> Rgb {
    let mut raw = [0u8; 3];
    if scale == 0 {
        return Rgb::default();
    }

    for (slot, out) in raw.iter_mut().enumerate() {
        let cc = u32::from(channel(correction, slot));
        let ct = u32::from(channel(temperature, slot));
        if cc > 0 && ct > 0 {
            let work = (cc + 1) * (ct + 1) * u32::from(scale);
            *out = (work / 0x1_0000) as u8;
        }
    }

    Rgb::new(raw[0], raw[1], raw[2])
}
