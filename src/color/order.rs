//! Wire order of the three color channels
//!
//! Each order is a zero-sized marker type so the offsets fold into the
//! transmit loop at compile time.

/// Permutation of the r, g, b memory slots into wire order
///
/// `OFFSETS[n]` is the memory slot (0 = r, 1 = g, 2 = b) sent as the n-th
/// byte of every pixel.
pub trait ColorOrder {
    const OFFSETS: [usize; 3];
}

macro_rules! color_order {
    ($(#[$meta:meta])* $name:ident, [$a:expr, $b:expr, $c:expr]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl ColorOrder for $name {
            const OFFSETS: [usize; 3] = [$a, $b, $c];
        }
    };
}

color_order!(
    /// Red, green, blue
    Rgb,
    [0, 1, 2]
);
color_order!(
    /// Red, blue, green
    Rbg,
    [0, 2, 1]
);
color_order!(
    /// Green, red, blue (WS2812)
    Grb,
    [1, 0, 2]
);
color_order!(
    /// Green, blue, red
    Gbr,
    [1, 2, 0]
);
color_order!(
    /// Blue, red, green
    Brg,
    [2, 0, 1]
);
color_order!(
    /// Blue, green, red
    Bgr,
    [2, 1, 0]
);
