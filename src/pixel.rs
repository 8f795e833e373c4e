//! Pixel controller
//!
//! Walks a pixel buffer and produces the bytes a transmitter puts on the
//! wire: channel reordered, dithered and scaled. The methods are split the
//! way the transmit loops pipeline them, so the fetch for the next byte can
//! run in the idle part of the current bit.

use core::marker::PhantomData;

use crate::color::{ColorOrder, Rgb, channel};
use crate::dither::{Dither, DitherMode};
use crate::math8::{qadd8, scale8};

/// Where pixel bytes come from
#[derive(Debug, Clone, Copy)]
enum Source<'a> {
    /// One `Rgb` per pixel
    Pixels(&'a [Rgb]),
    /// Raw r, g, b bytes followed by `skip` ignored bytes per pixel
    Interleaved { data: &'a [u8], skip: usize },
    /// The same color for every pixel
    Color(Rgb),
}

/// Per-pixel iterator over dithered, scaled, reordered bytes
#[derive(Debug, Clone, Copy)]
pub struct PixelController<'a, O: ColorOrder> {
    source: Source<'a>,
    index: usize,
    remaining: usize,
    scale: [u8; 3],
    dither: Dither,
    _order: PhantomData<O>,
}

impl<'a, O: ColorOrder> PixelController<'a, O> {
    /// Controller over a pixel buffer
    pub fn new(pixels: &'a [Rgb], scale: Rgb, dither: DitherMode) -> Self {
        Self::with_source(Source::Pixels(pixels), pixels.len(), scale, dither)
    }

    /// Controller sending `color` to `count` pixels
    pub fn broadcast(color: Rgb, count: usize, scale: Rgb, dither: DitherMode) -> Self {
        Self::with_source(Source::Color(color), count, scale, dither)
    }

    /// Controller over raw `r, g, b` bytes with `skip` extra bytes per pixel
    ///
    /// Useful for buffers that interleave alpha or other per-pixel data.
    pub fn interleaved(
        data: &'a [u8],
        count: usize,
        skip: usize,
        scale: Rgb,
        dither: DitherMode,
    ) -> Self {
        Self::with_source(Source::Interleaved { data, skip }, count, scale, dither)
    }

    fn with_source(source: Source<'a>, count: usize, scale: Rgb, dither: DitherMode) -> Self {
        Self {
            source,
            index: 0,
            remaining: count,
            scale: [scale.r, scale.g, scale.b],
            dither: Dither::for_mode(dither, scale),
            _order: PhantomData,
        }
    }

    /// Replace the dither state
    #[must_use]
    pub const fn with_dither(mut self, dither: Dither) -> Self {
        self.dither = dither;
        self
    }

    /// Current dither state
    pub const fn dither(&self) -> Dither {
        self.dither
    }

    /// Check if at least `n` pixels are left
    #[inline(always)]
    pub const fn has(&self, n: usize) -> bool {
        self.remaining >= n
    }

    /// Number of pixels left
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.remaining
    }

    pub const fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Move to the next pixel
    #[inline(always)]
    pub fn advance_data(&mut self) {
        if !matches!(self.source, Source::Color(_)) {
            self.index += 1;
        }
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// Toggle the dither phase of every channel
    #[inline(always)]
    pub fn step_dithering(&mut self) {
        self.dither.step_all();
    }

    /// Toggle the dither phase of the first wire channel only
    ///
    /// Called once before the transmit loop, since the first byte is
    /// fetched ahead of the per-pixel `step_dithering`.
    #[inline(always)]
    pub fn pre_step_first_byte_dithering(&mut self) {
        self.dither.step(O::OFFSETS[0]);
    }

    /// Raw byte of memory slot `slot` of the current pixel
    ///
    /// `None` once the pixels are exhausted or the buffer ends early.
    #[inline(always)]
    fn load_byte(&self, slot: usize) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        match self.source {
            Source::Pixels(pixels) => pixels.get(self.index).map(|px| channel(*px, slot)),
            Source::Interleaved { data, skip } => {
                data.get(self.index * (3 + skip) + slot).copied()
            }
            Source::Color(color) => Some(channel(color, slot)),
        }
    }

    /// Dithered and scaled byte for wire position `n` (0..3)
    ///
    /// Padding past the last pixel is 0, undithered.
    #[inline(always)]
    pub fn load_and_scale(&self, n: usize) -> u8 {
        let slot = O::OFFSETS[n];
        match self.load_byte(slot) {
            Some(raw) => scale8(qadd8(raw, self.dither.d[slot]), self.scale[slot]),
            None => 0,
        }
    }

    #[inline(always)]
    pub fn load_and_scale0(&self) -> u8 {
        self.load_and_scale(0)
    }

    #[inline(always)]
    pub fn load_and_scale1(&self) -> u8 {
        self.load_and_scale(1)
    }

    #[inline(always)]
    pub fn load_and_scale2(&self) -> u8 {
        self.load_and_scale(2)
    }

    /// Move to the next pixel and fetch its first wire byte
    #[inline(always)]
    pub fn advance_and_load_and_scale0(&mut self) -> u8 {
        self.advance_data();
        self.load_and_scale0()
    }

    /// The exact byte stream a transmitter would send
    pub fn bytes(self) -> PixelBytes<'a, O> {
        PixelBytes::new(self)
    }
}

/// Iterator over the wire bytes of a [`PixelController`]
///
/// Follows the same fetch order as the transmit loops, including the
/// first-byte dither pre-step.
#[derive(Debug, Clone)]
pub struct PixelBytes<'a, O: ColorOrder> {
    pixels: PixelController<'a, O>,
    next: u8,
    position: usize,
}

impl<'a, O: ColorOrder> PixelBytes<'a, O> {
    fn new(mut pixels: PixelController<'a, O>) -> Self {
        pixels.pre_step_first_byte_dithering();
        let next = pixels.load_and_scale0();
        Self {
            pixels,
            next,
            position: 0,
        }
    }
}

impl<O: ColorOrder> Iterator for PixelBytes<'_, O> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if !self.pixels.has(1) {
            return None;
        }
        if self.position == 0 {
            self.pixels.step_dithering();
        }

        let byte = self.next;
        self.next = match self.position {
            0 => self.pixels.load_and_scale1(),
            1 => self.pixels.load_and_scale2(),
            _ => self.pixels.advance_and_load_and_scale0(),
        };
        self.position = (self.position + 1) % 3;
        Some(byte)
    }
}
