//! Lane to port-bit mapping and bit transposition
//!
//! Layout: a byte is sent MSB first, so bit-time `k` (0..8) of a byte
//! carries bit `7 - k`. The packed word for bit-time `k` has lane `i`'s bit
//! at port bit `bits[i]`. With the identity map (lane `i` at bit `i`) the
//! eight words of a byte are a plain 8xN bit transpose:
//!
//! ```text
//! planes[k] bit i == (bytes[i] >> (7 - k)) & 1
//! ```

use crate::error::Error;

/// Largest number of lanes a 32-bit port can carry
pub const MAX_LANES: usize = 32;

/// Port bit of every lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneMap<const N: usize> {
    bits: [u8; N],
    mask: u32,
}

impl<const N: usize> LaneMap<N> {
    const LANES_OK: () = assert!(
        N >= 1 && N <= MAX_LANES,
        "lane count must be between 1 and 32"
    );

    /// Lane `i` on port bit `i`
    #[allow(clippy::cast_possible_truncation)]
    pub const fn identity() -> Self {
        let () = Self::LANES_OK;
        let mut bits = [0u8; N];
        let mut mask = 0u32;
        let mut lane = 0;
        while lane < N {
            bits[lane] = lane as u8;
            mask |= 1u32 << lane;
            lane += 1;
        }
        Self { bits, mask }
    }

    /// Lanes on consecutive port bits starting at `first`
    #[allow(clippy::cast_possible_truncation)]
    pub fn contiguous(first: u8) -> Result<Self, Error> {
        let mut bits = [0u8; N];
        for (lane, bit) in bits.iter_mut().enumerate() {
            *bit = first.saturating_add(lane as u8);
        }
        Self::new(bits)
    }

    /// Lanes on arbitrary port bits
    ///
    /// Every bit must be below 32 and used by one lane only.
    pub fn new(bits: [u8; N]) -> Result<Self, Error> {
        let () = Self::LANES_OK;
        let mut mask = 0u32;
        for (lane, &bit) in bits.iter().enumerate() {
            if usize::from(bit) >= MAX_LANES {
                return Err(Error::LaneOutOfRange { lane, bit });
            }
            if mask & (1u32 << bit) != 0 {
                return Err(Error::LaneCollision { lane, bit });
            }
            mask |= 1u32 << bit;
        }
        Ok(Self { bits, mask })
    }

    /// Port bits driven by the lanes
    #[inline(always)]
    pub const fn mask(&self) -> u32 {
        self.mask
    }

    /// Port bit of `lane`
    pub const fn bit(&self, lane: usize) -> u8 {
        self.bits[lane]
    }

    /// Pack bit `bit` (7 = MSB) of every lane register into a port word
    #[inline(always)]
    pub fn pack(&self, regs: &[u8; N], bit: u8) -> u32 {
        let mut word = 0u32;
        for (reg, &port_bit) in regs.iter().zip(self.bits.iter()) {
            word |= u32::from((reg >> bit) & 1) << port_bit;
        }
        word & self.mask
    }

    /// Set bit `bit` of every lane register from a port word
    #[allow(clippy::cast_possible_truncation)]
    pub fn unpack_into(&self, word: u32, bit: u8, regs: &mut [u8; N]) {
        for (reg, &port_bit) in regs.iter_mut().zip(self.bits.iter()) {
            let value = ((word >> port_bit) & 1) as u8;
            *reg = (*reg & !(1 << bit)) | (value << bit);
        }
    }
}

/// Transpose one byte per lane into eight bit-time words
///
/// `planes[k]` holds bit `7 - k` of every lane, lane `i` at bit `i`.
pub fn transpose<const N: usize>(bytes: &[u8; N]) -> [u32; 8] {
    let map = LaneMap::<N>::identity();
    let mut planes = [0u32; 8];
    for (k, plane) in (0u8..).zip(planes.iter_mut()) {
        *plane = map.pack(bytes, 7 - k);
    }
    planes
}

/// Inverse of [`transpose`]
pub fn untranspose<const N: usize>(planes: &[u32; 8]) -> [u8; N] {
    let map = LaneMap::<N>::identity();
    let mut bytes = [0u8; N];
    for (k, &plane) in (0u8..).zip(planes.iter()) {
        map.unpack_into(plane, 7 - k, &mut bytes);
    }
    bytes
}
