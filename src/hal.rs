//! Hardware seams
//!
//! The transmitters never touch registers directly. Everything they need
//! from the platform goes through the traits below, each annotated with the
//! cycle cost the timing math subtracts from the protocol windows.

use core::convert::Infallible;

use embassy_time::{Duration, Instant};
use embedded_hal::digital::OutputPin;

/// Single output pin with a fixed write cost
pub trait FastPin {
    /// Cycles taken by one `hi()` or `lo()`
    const CYCLES: u32;

    fn hi(&mut self);
    fn lo(&mut self);
}

/// Output port shared by several lanes
///
/// Writes are set/clear style: bits outside `mask` are left untouched.
pub trait OutputPort {
    /// Cycles taken by one `set_bits()` or `clear_bits()`
    const CYCLES: u32;

    fn set_bits(&mut self, mask: u32);
    fn clear_bits(&mut self, mask: u32);
}

/// Busy wait of a compile-time known number of cycles
pub trait CycleDelay {
    /// Cycles the target spends fetching one pixel byte (load, dither, scale)
    ///
    /// Taken out of the `T3` window that holds the fetch.
    const LOAD_CYCLES: u32;

    fn delay_cycles(&mut self, cycles: u32);
}

/// Free-running hardware counter, counting down one per CPU cycle
///
/// The value wraps at 32 bits. Up-counting counters can be wrapped in
/// [`CountDown`].
pub trait CycleCounter {
    fn cycles(&self) -> u32;
}

/// System time that stalls while interrupts are off
pub trait SystemClock {
    fn now(&self) -> Instant;

    /// Push the tick counter forward by time spent with interrupts disabled
    fn advance(&mut self, elapsed: Duration);
}

/// [`FastPin`] on top of an `embedded-hal` output pin
///
/// `CYCLES` is the measured cost of one `set_high`/`set_low` on the target.
/// Only infallible pins are accepted: a write inside a frame cannot report
/// an error.
#[derive(Debug)]
pub struct HalPin<P: OutputPin<Error = Infallible>, const CYCLES: u32> {
    pin: P,
}

impl<P: OutputPin<Error = Infallible>, const CYCLES: u32> HalPin<P, CYCLES> {
    pub const fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin<Error = Infallible>, const CYCLES: u32> FastPin for HalPin<P, CYCLES> {
    const CYCLES: u32 = CYCLES;

    #[inline(always)]
    fn hi(&mut self) {
        let Ok(()) = self.pin.set_high();
    }

    #[inline(always)]
    fn lo(&mut self) {
        let Ok(()) = self.pin.set_low();
    }
}

/// Spin loop delay
///
/// `CYCLES_PER_SPIN` is the cost of one `spin_loop` iteration and
/// `LOAD_CYCLES` the measured byte fetch cost on the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinDelay<const CYCLES_PER_SPIN: u32, const LOAD_CYCLES: u32>;

impl<const CYCLES_PER_SPIN: u32, const LOAD_CYCLES: u32> CycleDelay
    for SpinDelay<CYCLES_PER_SPIN, LOAD_CYCLES>
{
    const LOAD_CYCLES: u32 = LOAD_CYCLES;

    #[inline(always)]
    fn delay_cycles(&mut self, cycles: u32) {
        for _ in 0..cycles / CYCLES_PER_SPIN.max(1) {
            core::hint::spin_loop();
        }
    }
}

/// Turns an up-counting counter into a [`CycleCounter`]
#[derive(Debug, Clone, Copy)]
pub struct CountDown<C, F: Fn(&C) -> u32> {
    counter: C,
    read: F,
}

impl<C, F: Fn(&C) -> u32> CountDown<C, F> {
    /// Wrap `counter`, reading its up-counting value with `read`
    pub const fn new(counter: C, read: F) -> Self {
        Self {
            counter,
            read,
        }
    }
}

impl<C, F: Fn(&C) -> u32> CycleCounter for CountDown<C, F> {
    #[inline(always)]
    fn cycles(&self) -> u32 {
        !(self.read)(&self.counter)
    }
}
