//! Clockless protocol timing
//!
//! A bit is sent as three windows: the line is high for `T1`, then holds the
//! bit value for `T2`, then is low for `T3`. A `0` bit is a short pulse
//! (`T1`), a `1` bit a long one (`T1 + T2`). Chipsets are described in
//! nanoseconds and turned into CPU cycles at compile time with [`Clocked`].

use core::marker::PhantomData;

use embassy_time::Duration;

use crate::error::Error;

/// Chipset timing in nanoseconds
pub trait Chipset {
    const T1_NS: u32;
    const T2_NS: u32;
    const T3_NS: u32;
    /// Low time that latches a frame
    const RESET_US: u32 = 50;
    /// Allowed deviation of the whole bit period
    const TOLERANCE_NS: u32 = 150;
}

/// Timing of one bit in CPU cycles
pub trait ClocklessTiming {
    const CPU_HZ: u32;
    const T1: u32;
    const T2: u32;
    const T3: u32;
    /// Minimum wait between frames
    const RESET_US: u32;
    /// Shortest acceptable bit period
    const MIN_PERIOD_NS: u32;
    /// Longest acceptable bit period
    const MAX_PERIOD_NS: u32;
    /// Cycles per bit
    const PERIOD: u32 = Self::T1 + Self::T2 + Self::T3;
}

/// Chipset `C` on a CPU running at `CPU_HZ`
#[derive(Debug, Clone, Copy, Default)]
pub struct Clocked<C: Chipset, const CPU_HZ: u32>(PhantomData<C>);

impl<C: Chipset, const CPU_HZ: u32> ClocklessTiming for Clocked<C, CPU_HZ> {
    const CPU_HZ: u32 = CPU_HZ;
    const T1: u32 = ns_to_cycles(C::T1_NS, CPU_HZ);
    const T2: u32 = ns_to_cycles(C::T2_NS, CPU_HZ);
    const T3: u32 = ns_to_cycles(C::T3_NS, CPU_HZ);
    const RESET_US: u32 = C::RESET_US;
    const MIN_PERIOD_NS: u32 = (C::T1_NS + C::T2_NS + C::T3_NS).saturating_sub(C::TOLERANCE_NS);
    const MAX_PERIOD_NS: u32 = C::T1_NS + C::T2_NS + C::T3_NS + C::TOLERANCE_NS;
}

/// Timing given directly in cycles, for hand-tuned or test setups
///
/// The tolerance is the period itself, so only the window checks apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cycles<
    const T1: u32,
    const T2: u32,
    const T3: u32,
    const CPU_HZ: u32,
    const RESET_US: u32,
>;

impl<const T1: u32, const T2: u32, const T3: u32, const CPU_HZ: u32, const RESET_US: u32>
    ClocklessTiming for Cycles<T1, T2, T3, CPU_HZ, RESET_US>
{
    const CPU_HZ: u32 = CPU_HZ;
    const T1: u32 = T1;
    const T2: u32 = T2;
    const T3: u32 = T3;
    const RESET_US: u32 = RESET_US;
    const MIN_PERIOD_NS: u32 = cycles_to_ns(T1 + T2 + T3, CPU_HZ);
    const MAX_PERIOD_NS: u32 = cycles_to_ns(T1 + T2 + T3, CPU_HZ);
}

macro_rules! chipset {
    ($(#[$meta:meta])* $name:ident, $t1:expr, $t2:expr, $t3:expr $(, reset = $reset:expr)?) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Chipset for $name {
            const T1_NS: u32 = $t1;
            const T2_NS: u32 = $t2;
            const T3_NS: u32 = $t3;
            $(const RESET_US: u32 = $reset;)?
        }
    };
}

chipset!(
    /// WS2812 / WS2812B, 800 kHz
    Ws2812, 250, 625, 375
);
chipset!(
    /// WS2811, 800 kHz
    Ws2811, 320, 320, 640
);
chipset!(
    /// WS2811, 400 kHz
    Ws2811Slow, 800, 800, 900
);
chipset!(
    /// WS2813, 800 kHz with a long latch
    Ws2813, 320, 320, 640, reset = 300
);
chipset!(
    /// SK6812, 800 kHz
    Sk6812, 300, 600, 300, reset = 80
);
chipset!(
    /// TM1809 / TM1804, 800 kHz
    Tm1809, 350, 350, 450
);
chipset!(
    /// UCS1903, 400 kHz
    Ucs1903, 500, 1500, 500
);
chipset!(
    /// APA106
    Apa106, 400, 1000, 400
);

/// Convert nanoseconds to CPU cycles, rounding up
#[allow(clippy::cast_possible_truncation)]
pub const fn ns_to_cycles(ns: u32, cpu_hz: u32) -> u32 {
    ((ns as u64 * cpu_hz as u64).div_ceil(1_000_000_000)) as u32
}

/// Convert CPU cycles to nanoseconds, rounding down
#[allow(clippy::cast_possible_truncation)]
pub const fn cycles_to_ns(cycles: u32, cpu_hz: u32) -> u32 {
    if cpu_hz == 0 {
        return 0;
    }
    ((cycles as u64 * 1_000_000_000) / cpu_hz as u64) as u32
}

/// Check that the bit period of `T` is within its chipset tolerance
pub const fn validate<T: ClocklessTiming>() -> Result<(), Error> {
    let period_ns = cycles_to_ns(T::PERIOD, T::CPU_HZ);
    if period_ns < T::MIN_PERIOD_NS || period_ns > T::MAX_PERIOD_NS {
        return Err(Error::TimingOutOfTolerance {
            period_ns,
            min_ns: T::MIN_PERIOD_NS,
            max_ns: T::MAX_PERIOD_NS,
        });
    }
    Ok(())
}

/// Check that every window fits the fixed work placed in it
///
/// `write` is the cost of one port write, `fetch` the work done in the `T3`
/// window of a byte's last bit.
pub const fn validate_windows<T: ClocklessTiming>(write: u32, fetch: u32) -> Result<(), Error> {
    if T::T1 < write {
        return Err(Error::WindowTooShort {
            window: 1,
            cycles: T::T1,
            needed: write,
        });
    }
    if T::T2 < write {
        return Err(Error::WindowTooShort {
            window: 2,
            cycles: T::T2,
            needed: write,
        });
    }
    if T::T3 < write + fetch {
        return Err(Error::WindowTooShort {
            window: 3,
            cycles: T::T3,
            needed: write + fetch,
        });
    }
    Ok(())
}

/// Wall time needed to send `bits` bits with timing `T`
pub fn transmit_duration<T: ClocklessTiming>(bits: usize) -> Duration {
    let cycles = bits as u64 * u64::from(T::PERIOD);
    Duration::from_micros(cycles * 1_000_000 / u64::from(T::CPU_HZ.max(1)))
}
