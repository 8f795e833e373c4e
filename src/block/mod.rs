//! Multi-lane ("block") clockless transmitter
//!
//! Up to 32 strips on one port, sent in lockstep. All lanes share the same
//! windows, so every bit-time is three port writes: all lanes high, lanes
//! sending `0` low after `T1`, everything low after `T1 + T2`.
//!
//! With N lanes the per-bit work no longer fits an instruction budget, so
//! the edges are placed against a free-running down counter. Each deadline
//! is the previous one minus the bit period, never a sum of measured
//! intervals, so the frame does not drift. Lane byte fetches are spread over
//! the bit-times of the current byte: lane `i` loads its next byte during
//! bit-time `i % 8`.

mod lanes;

use core::marker::PhantomData;

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

pub use lanes::{LaneMap, MAX_LANES, transpose, untranspose};

use crate::color::{ColorOrder, Grb, Rgb};
use crate::controller::{ControllerState, LedController, Settings};
use crate::dither::{Dither, DitherMode};
use crate::error::Error;
use crate::hal::{CycleCounter, OutputPort, SystemClock};
use crate::pixel::PixelController;
use crate::timing::{ClocklessTiming, transmit_duration, validate};
use crate::wait::MinWait;

/// Clockless controller driving `LANES` strips on one port
pub struct BlockController<R, C, K, T, const LANES: usize, O = Grb>
where
    R: OutputPort,
    C: CycleCounter,
    K: SystemClock,
    T: ClocklessTiming,
    O: ColorOrder,
{
    port: R,
    counter: C,
    clock: K,
    lanes: LaneMap<LANES>,
    wait: MinWait,
    settings: Settings,
    state: ControllerState,
    _timing: PhantomData<(T, O)>,
}

impl<R, C, K, T, const LANES: usize, O> BlockController<R, C, K, T, LANES, O>
where
    R: OutputPort,
    C: CycleCounter,
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
            T::T1 > R::CYCLES && T::T2 > R::CYCLES && T::T3 > R::CYCLES,
            "clockless timing window shorter than a port write"
        );
    };

    pub fn new(port: R, counter: C, clock: K, lanes: LaneMap<LANES>) -> Self {
        let () = Self::TIMING_OK;
        Self {
            port,
            counter,
            clock,
            lanes,
            wait: MinWait::new(Duration::from_micros(u64::from(T::RESET_US))),
            settings: Settings::default(),
            state: ControllerState::Uninitialized,
            _timing: PhantomData,
        }
    }

    /// Build with lanes on the given port bits
    pub fn with_bits(port: R, counter: C, clock: K, bits: [u8; LANES]) -> Result<Self, Error> {
        let lanes = LaneMap::new(bits)?;
        Ok(Self::new(port, counter, clock, lanes))
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

    pub const fn lanes(&self) -> &LaneMap<LANES> {
        &self.lanes
    }

    pub const fn clock(&self) -> &K {
        &self.clock
    }

    /// Give back the port, counter and clock
    pub fn release(self) -> (R, C, K) {
        (self.port, self.counter, self.clock)
    }

    /// Send one buffer per lane
    ///
    /// Lanes may differ in length. A lane that runs out sends zero bits
    /// until the longest lane is done. All lanes share one dither phase.
    pub fn show_lanes(&mut self, leds: [&[Rgb]; LANES], brightness: u8) -> Result<(), Error> {
        self.ensure_ready()?;
        let scale = self.settings.scale(brightness);
        let dither = Dither::for_mode(self.settings.dither, scale);
        let pixels = leds.map(|lane| {
            PixelController::new(lane, scale, DitherMode::Disabled).with_dither(dither)
        });
        self.show_block(pixels)
    }

    /// Transmit one pixel controller per lane
    ///
    /// Sends as many pixel groups (24 bit-times each) as the longest lane
    /// has pixels.
    pub fn show_block(&mut self, mut pixels: [PixelController<'_, O>; LANES]) -> Result<(), Error> {
        let () = Self::TIMING_OK;
        self.ensure_ready()?;

        let groups = pixels.iter().map(PixelController::len).max().unwrap_or(0);
        self.wait.wait(&self.clock);

        critical_section::with(|_| self.transmit(&mut pixels, groups));

        let elapsed = transmit_duration::<T>(groups * 24);
        self.clock.advance(elapsed);
        self.wait.mark(&self.clock);

        #[cfg(feature = "esp32-log")]
        println!(
            "[BlockController.show_block] sent {} lanes x {} pixels in {}us",
            LANES,
            groups,
            elapsed.as_micros()
        );

        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn transmit(&mut self, pixels: &mut [PixelController<'_, O>; LANES], groups: usize) {
        for lane in pixels.iter_mut() {
            lane.pre_step_first_byte_dithering();
        }
        let mut current = [0u8; LANES];
        for (reg, lane) in current.iter_mut().zip(pixels.iter()) {
            *reg = lane.load_and_scale0();
        }
        let mut next = [0u8; LANES];
        let mut word = self.lanes.pack(&current, 7);
        let mut deadline = self.counter.cycles();

        for _ in 0..groups {
            for position in 0..3 {
                for k in 0..8 {
                    deadline = self.send_bit(deadline, word);

                    // Dead time: fetch for this bit-time's share of lanes,
                    // then pack the next bit-time's word.
                    let mut lane = k;
                    while lane < LANES {
                        let px = &mut pixels[lane];
                        next[lane] = match position {
                            0 => {
                                px.step_dithering();
                                px.load_and_scale1()
                            }
                            1 => px.load_and_scale2(),
                            _ => px.advance_and_load_and_scale0(),
                        };
                        lane += 8;
                    }

                    word = if k < 7 {
                        self.lanes.pack(&current, 6 - k as u8)
                    } else {
                        self.lanes.pack(&next, 7)
                    };
                }
                current = next;
            }
        }

        // Let the last low window run out
        self.wait_until(deadline);
    }

    /// Send one bit-time starting at `deadline`, returning the next deadline
    #[inline(always)]
    fn send_bit(&mut self, deadline: u32, word: u32) -> u32 {
        let mask = self.lanes.mask();
        self.wait_until(deadline);
        self.port.set_bits(mask);
        self.wait_until(deadline.wrapping_sub(T::T1));
        self.port.clear_bits(!word & mask);
        self.wait_until(deadline.wrapping_sub(T::T1 + T::T2));
        self.port.clear_bits(mask);
        deadline.wrapping_sub(T::PERIOD)
    }

    /// Spin until the down counter reaches `deadline`
    #[inline(always)]
    #[allow(clippy::cast_possible_wrap)]
    fn wait_until(&self, deadline: u32) {
        while (self.counter.cycles().wrapping_sub(deadline) as i32) > 0 {}
    }

    fn ensure_ready(&self) -> Result<(), Error> {
        if self.state == ControllerState::Ready {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }
}

impl<R, C, K, T, const LANES: usize, O> LedController for BlockController<R, C, K, T, LANES, O>
where
    R: OutputPort,
    C: CycleCounter,
    K: SystemClock,
    T: ClocklessTiming,
    O: ColorOrder,
{
    fn init(&mut self) {
        self.port.clear_bits(self.lanes.mask());
        self.wait.mark(&self.clock);
        self.state = ControllerState::Ready;

        #[cfg(feature = "esp32-log")]
        println!(
            "[BlockController.init] {} lanes, port mask {:#010x}",
            LANES,
            self.lanes.mask()
        );
    }

    fn reset(&mut self) {
        self.port.clear_bits(self.lanes.mask());
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

    /// Split `leds` into `LANES` consecutive segments of equal length
    ///
    /// The last segments are shorter when the length is not a multiple of
    /// the lane count.
    fn show(&mut self, leds: &[Rgb], brightness: u8) -> Result<(), Error> {
        let per_lane = leds.len().div_ceil(LANES);
        let segments: [&[Rgb]; LANES] = core::array::from_fn(|lane| {
            let start = (lane * per_lane).min(leds.len());
            let end = (start + per_lane).min(leds.len());
            &leds[start..end]
        });
        self.show_lanes(segments, brightness)
    }

    /// Send `color` to `count` LEDs on every lane
    fn show_color(&mut self, color: Rgb, count: usize, brightness: u8) -> Result<(), Error> {
        self.ensure_ready()?;
        let scale = self.settings.scale(brightness);
        let dither = Dither::for_mode(self.settings.dither, scale);
        let pixels = core::array::from_fn(|_| {
            PixelController::broadcast(color, count, scale, DitherMode::Disabled).with_dither(dither)
        });
        self.show_block(pixels)
    }
}
