/// Configuration errors
///
/// Everything here is detected before a transmission starts. Timing
/// violations during a transmission cannot be observed and have no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The bit period (T1 + T2 + T3) is outside the chipset tolerance
    TimingOutOfTolerance {
        period_ns: u32,
        min_ns: u32,
        max_ns: u32,
    },
    /// A timing window is too short to hold the port write and fetch work
    WindowTooShort { window: u8, cycles: u32, needed: u32 },
    /// Two lanes were assigned the same port bit
    LaneCollision { lane: usize, bit: u8 },
    /// A lane was assigned a bit outside the 32-bit port
    LaneOutOfRange { lane: usize, bit: u8 },
    /// The controller was used before `init()`
    NotInitialized,
    /// The registry has no free slot
    RegistryFull,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::TimingOutOfTolerance {
                period_ns,
                min_ns,
                max_ns,
            } => write!(
                f,
                "bit period {}ns outside chipset tolerance {}..={}ns",
                period_ns, min_ns, max_ns
            ),
            Error::WindowTooShort {
                window,
                cycles,
                needed,
            } => write!(
                f,
                "timing window T{} has {} cycles, needs at least {}",
                window, cycles, needed
            ),
            Error::LaneCollision { lane, bit } => {
                write!(f, "lane {} reuses port bit {}", lane, bit)
            }
            Error::LaneOutOfRange { lane, bit } => {
                write!(f, "lane {} port bit {} is outside the port", lane, bit)
            }
            Error::NotInitialized => write!(f, "controller not initialized"),
            Error::RegistryFull => write!(f, "controller registry is full"),
        }
    }
}

impl core::error::Error for Error {}
