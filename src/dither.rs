//! Temporal dithering
//!
//! Each channel carries a phase `d` and a step `e`. Every pixel toggles the
//! phase between `d` and `e - d`, and every frame starts from a different
//! phase taken from a bit-reversed frame counter. Averaged over frames, the
//! truncation error of `scale8` is spread instead of always rounding down.

use core::cell::Cell;

use critical_section::Mutex;

use crate::color::{Rgb, channel};
use crate::math8::{reverse8, scale8};

/// Process-wide frame counter, one increment per dithered frame
static FRAME: Mutex<Cell<u8>> = Mutex::new(Cell::new(0));

/// Dithering mode of a controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DitherMode {
    /// Plain truncation
    Disabled,
    /// Binary temporal dithering
    #[default]
    Binary,
}

/// Per-channel dither state, indexed by memory slot (0 = r, 1 = g, 2 = b)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dither {
    /// Current phase
    pub d: [u8; 3],
    /// Step size
    pub e: [u8; 3],
}

impl Dither {
    /// No dithering
    pub const fn disabled() -> Self {
        Self { d: [0; 3], e: [0; 3] }
    }

    /// Dither state for the given mode, advancing the global frame counter
    pub fn for_mode(mode: DitherMode, scale: Rgb) -> Self {
        match mode {
            DitherMode::Disabled => Self::disabled(),
            DitherMode::Binary => Self::binary(scale, next_frame()),
        }
    }

    /// Binary dither state for an explicit frame counter value
    #[allow(clippy::cast_possible_truncation)]
    pub fn binary(scale: Rgb, frame: u8) -> Self {
        let q = reverse8(frame);
        let mut dither = Self::disabled();

        for slot in 0..3 {
            let s = channel(scale, slot);
            let e = if s == 0 {
                0
            } else {
                (256 / u16::from(s) + 1).min(255) as u8
            };
            dither.d[slot] = scale8(q, e);
            dither.e[slot] = e.saturating_sub(1);
        }

        dither
    }

    /// Toggle the phase of one slot
    #[inline(always)]
    pub fn step(&mut self, slot: usize) {
        self.d[slot] = self.e[slot].wrapping_sub(self.d[slot]);
    }

    /// Toggle the phase of all slots
    #[inline(always)]
    pub fn step_all(&mut self) {
        self.step(0);
        self.step(1);
        self.step(2);
    }
}

/// Advance the process-wide frame counter and return the new value
pub fn next_frame() -> u8 {
    critical_section::with(|cs| {
        let frame = FRAME.borrow(cs);
        let next = frame.get().wrapping_add(1);
        frame.set(next);
        next
    })
}
