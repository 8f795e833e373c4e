#![no_std]

pub mod adjustment;
pub mod block;
pub mod clockless;
pub mod color;
pub mod controller;
pub mod dither;
pub mod error;
pub mod hal;
pub mod math8;
pub mod pixel;
pub mod registry;
pub mod timing;
pub mod wait;

pub use adjustment::{Adjustment, compute_adjustment};
pub use block::{BlockController, LaneMap, transpose, untranspose};
pub use clockless::ClocklessController;
pub use controller::{ControllerState, LedController, Settings};
pub use dither::{Dither, DitherMode};
pub use error::Error;
pub use hal::{CycleCounter, CycleDelay, FastPin, OutputPort, SystemClock};
pub use pixel::PixelController;
pub use registry::Registry;
pub use timing::{ClocklessTiming, Clocked, Chipset};
pub use wait::MinWait;

pub use color::Rgb;
pub use math8::{qadd8, scale8};
pub use embassy_time::{Duration, Instant};
