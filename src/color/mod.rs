mod correction;
mod order;

use smart_leds::RGB8;

pub use correction::{
    CANDLE, CARBON_ARC, CLEAR_BLUE_SKY, DIRECT_SUNLIGHT, HALOGEN, HIGH_NOON_SUN, OVERCAST_SKY,
    TUNGSTEN_40W, TUNGSTEN_100W, TYPICAL_8MM_PIXEL, TYPICAL_LED_STRIP, TYPICAL_PIXEL_STRING,
    TYPICAL_SMD5050, UNCORRECTED_COLOR, UNCORRECTED_TEMPERATURE,
};
pub use order::{Bgr, Brg, ColorOrder, Gbr, Grb, Rbg, Rgb as RgbOrder};

pub type Rgb = RGB8;

/// Create an RGB color from a u32 value (0xRRGGBB format)
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}

/// Read a color channel by its memory slot (0 = r, 1 = g, 2 = b)
#[inline]
pub const fn channel(color: Rgb, slot: usize) -> u8 {
    match slot {
        0 => color.r,
        1 => color.g,
        _ => color.b,
    }
}
