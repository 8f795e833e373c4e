//! 8-bit fixed-point helpers used by the pixel pipeline.

/// Scale an 8-bit value by a factor (0-255 = 0.0-~1.0)
///
/// A single multiply and shift: `(value * scale) >> 8`. Note that
/// `scale8(x, 255)` is `x * 255 / 256`, not `x`.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub const fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * scale as u16) >> 8) as u8
}

/// Scale an 8-bit value with unity preserved (`scale8_fixed(x, 255) == x`)
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub const fn scale8_fixed(value: u8, scale: u8) -> u8 {
    ((value as u16 * (1 + scale as u16)) >> 8) as u8
}

/// Saturating 8-bit add
#[inline]
pub const fn qadd8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

/// Reverse the bit order of a byte (bit 0 becomes bit 7)
#[inline]
pub const fn reverse8(value: u8) -> u8 {
    value.reverse_bits()
}
