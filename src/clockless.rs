//! Single-lane clockless transmitter
//!
//! Every bit is `raise, hold T1, decide, hold T2, force low, hold T3`, with
//! the delays counted in CPU cycles. The fetch of the next byte (load,
//! dither, scale) is folded into the `T3` window of the last bit of the
//! current byte, so consecutive bytes follow each other without a gap.
//!
//! All hold times are associated constants: after monomorphisation the
//! transmit loop is straight-line code with constant delays.

use core::marker::PhantomData;

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::color::{ColorOrder, Grb, Rgb};
use crate::controller::{ControllerState, LedController, Settings};
use crate::error::Error;
use crate::hal::{CycleDelay, FastPin, SystemClock};
use crate::pixel::PixelController;
use crate::timing::{ClocklessTiming, transmit_duration, validate, validate_windows};
use crate::wait::MinWait;

/// Clockless controller on one pin
pub struct ClocklessController<P, D, K, T, O = Grb>
where
    P: FastPin,
    D: CycleDelay,
    K: SystemClock,
    T: ClocklessTiming,
    O: ColorOrder,
{
    pin: P,
    delay: D,
    clock: K,
    wait: MinWait,
    settings: Settings,
    state: ControllerState,
    _timing: PhantomData<(T, O)>,
}

impl<P, D, K, T, O> ClocklessController<P, D, K, T, O>
where
    P: FastPin,
    D: CycleDelay,
    K: SystemClock,
    T: ClocklessTiming,
    O: ColorOrder,
{
    /// Fails the build for timings the target cannot produce
    const TIMING_OK: () = {
        assert!(
            matches!(validate::<T>(), Ok(())),
            "clockless bit period outside chipset tolerance"
        );
        assert!(
            matches!(validate_windows::<T>(P::CYCLES, D::LOAD_CYCLES), Ok(())),
            "clockless timing window too short for pin writes and byte fetch"
        );
    };

    const HOLD_T1: u32 = T::T1.saturating_sub(P::CYCLES);
    const HOLD_T2: u32 = T::T2.saturating_sub(P::CYCLES);
    const HOLD_T3: u32 = T::T3.saturating_sub(P::CYCLES);
    const HOLD_T3_FETCH: u32 = T::T3.saturating_sub(P::CYCLES + D::LOAD_CYCLES);

    pub fn new(pin: P, delay: D, clock: K) -> Self {
        let () = Self::TIMING_OK;
        Self {
            pin,
            delay,
            clock,
            wait: MinWait::new(Duration::from_micros(u64::from(T::RESET_US))),
            settings: Settings::default(),
            state: ControllerState::Uninitialized,
            _timing: PhantomData,
        }
    }

    /// Override the minimum gap between frames
    #[must_use]
    pub fn with_min_wait(mut self, gap: Duration) -> Self {
        self.wait = MinWait::new(gap);
        self
    }

    /// Replace the output settings
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub const fn min_wait(&self) -> &MinWait {
        &self.wait
    }

    pub const fn clock(&self) -> &K {
        &self.clock
    }

    /// Give back the pin, delay and clock
    pub fn release(self) -> (P, D, K) {
        (self.pin, self.delay, self.clock)
    }

    /// Send raw `r, g, b` bytes followed by `skip` bytes per pixel
    pub fn show_interleaved(
        &mut self,
        data: &[u8],
        count: usize,
        skip: usize,
        brightness: u8,
    ) -> Result<(), Error> {
        self.ensure_ready()?;
        let scale = self.settings.scale(brightness);
        let pixels = PixelController::interleaved(data, count, skip, scale, self.settings.dither);
        self.show_pixels(pixels)
    }

    /// Transmit everything `pixels` yields
    ///
    /// Waits for the reset gap, sends the frame with interrupts disabled,
    /// then advances the system clock by the time the frame took.
    pub fn show_pixels(&mut self, mut pixels: PixelController<'_, O>) -> Result<(), Error> {
        let () = Self::TIMING_OK;
        self.ensure_ready()?;

        let count = pixels.len();
        self.wait.wait(&self.clock);

        critical_section::with(|_| {
            pixels.pre_step_first_byte_dithering();
            let mut byte = pixels.load_and_scale0();
            while pixels.has(1) {
                pixels.step_dithering();
                self.write_byte(byte);
                byte = pixels.load_and_scale1();
                self.write_byte(byte);
                byte = pixels.load_and_scale2();
                self.write_byte(byte);
                byte = pixels.advance_and_load_and_scale0();
            }
        });

        let elapsed = transmit_duration::<T>(count * 24);
        self.clock.advance(elapsed);
        self.wait.mark(&self.clock);

        #[cfg(feature = "esp32-log")]
        println!(
            "[ClocklessController.show_pixels] sent {} pixels in {}us",
            count,
            elapsed.as_micros()
        );

        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), Error> {
        if self.state == ControllerState::Ready {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Send one byte, MSB first
    ///
    /// The last bit leaves `LOAD_CYCLES` of its `T3` window to the caller.
    #[inline(always)]
    fn write_byte(&mut self, byte: u8) {
        for bit in (1..8).rev() {
            self.write_bit(byte & (1 << bit) != 0, Self::HOLD_T3);
        }
        self.write_bit(byte & 1 != 0, Self::HOLD_T3_FETCH);
    }

    #[inline(always)]
    fn write_bit(&mut self, bit: bool, hold_low: u32) {
        self.pin.hi();
        self.delay.delay_cycles(Self::HOLD_T1);
        // Both arms are one pin write
        if bit {
            self.pin.hi();
        } else {
            self.pin.lo();
        }
        self.delay.delay_cycles(Self::HOLD_T2);
        self.pin.lo();
        self.delay.delay_cycles(hold_low);
    }
}

impl<P, D, K, T, O> LedController for ClocklessController<P, D, K, T, O>
where
    P: FastPin,
    D: CycleDelay,
    K: SystemClock,
    T: ClocklessTiming,
    O: ColorOrder,
{
    fn init(&mut self) {
        self.pin.lo();
        self.wait.mark(&self.clock);
        self.state = ControllerState::Ready;

        #[cfg(feature = "esp32-log")]
        println!(
            "[ClocklessController.init] T1={} T2={} T3={} cycles",
            T::T1,
            T::T2,
            T::T3
        );
    }

    fn reset(&mut self) {
        self.pin.lo();
        self.wait.mark(&self.clock);
        self.state = ControllerState::Ready;
    }

    fn state(&self) -> ControllerState {
        self.state
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    fn show(&mut self, leds: &[Rgb], brightness: u8) -> Result<(), Error> {
        self.ensure_ready()?;
        let scale = self.settings.scale(brightness);
        self.show_pixels(PixelController::new(leds, scale, self.settings.dither))
    }

    fn show_color(&mut self, color: Rgb, count: usize, brightness: u8) -> Result<(), Error> {
        self.ensure_ready()?;
        let scale = self.settings.scale(brightness);
        self.show_pixels(PixelController::broadcast(
            color,
            count,
            scale,
            self.settings.dither,
        ))
    }
}
