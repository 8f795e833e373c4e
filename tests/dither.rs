mod common;

mod tests {
    use super::common::{Bench, MockClock, MockCounter, MockDelay, MockPin, MockPort};
    use myrtio_clockless::block::{BlockController, LaneMap};
    use myrtio_clockless::clockless::ClocklessController;
    use myrtio_clockless::color::{Rgb, RgbOrder};
    use myrtio_clockless::controller::LedController;
    use myrtio_clockless::dither::{Dither, DitherMode, next_frame};
    use myrtio_clockless::error::Error;
    use myrtio_clockless::pixel::PixelController;
    use myrtio_clockless::timing::Cycles;

    type Timing = Cycles<20, 40, 30, 72_000_000, 50>;
    type Strip = ClocklessController<MockPin, MockDelay, MockClock, Timing>;
    type Block = BlockController<MockPort, MockCounter, MockClock, Timing, 2>;

    #[test]
    fn test_binary_init() {
        // Frame 1 reverses to 0x80
        let dither = Dither::binary(Rgb::new(0, 128, 255), 1);
        assert_eq!(dither.d, [0, 1, 1]);
        assert_eq!(dither.e, [0, 2, 1]);

        let dither = Dither::binary(Rgb::new(1, 1, 1), 1);
        assert_eq!(dither.d, [127, 127, 127]);
        assert_eq!(dither.e, [254, 254, 254]);
    }

    #[test]
    fn test_disabled_is_truncation() {
        assert_eq!(Dither::disabled(), Dither { d: [0; 3], e: [0; 3] });
        assert_eq!(
            Dither::for_mode(DitherMode::Disabled, Rgb::new(10, 20, 30)),
            Dither::disabled()
        );
    }

    #[test]
    fn test_phase_within_step() {
        for scale in 0..=255u8 {
            for frame in 0..=255u8 {
                let mut dither = Dither::binary(Rgb::new(scale, scale, scale), frame);
                for _ in 0..2 {
                    assert!(dither.d[0] <= dither.e[0], "scale={} frame={}", scale, frame);
                    dither.step_all();
                }
            }
        }
    }

    #[test]
    fn test_step_is_two_phase() {
        let mut dither = Dither::binary(Rgb::new(40, 40, 40), 77);
        let start = dither;
        dither.step_all();
        assert_eq!(dither.d[1], start.e[1] - start.d[1]);
        dither.step_all();
        assert_eq!(dither, start);
    }

    // Only test in this file that touches the process-wide frame counter
    #[test]
    fn test_frame_counter_advances_once_per_frame() {
        let first = next_frame();
        let second = next_frame();
        assert_eq!(second, first.wrapping_add(1));

        let bench = Bench::new();
        let leds = [Rgb::new(100, 100, 100); 2];
        let mut strip = Strip::new(
            MockPin(bench.clone()),
            MockDelay(bench.clone()),
            MockClock(bench.clone()),
        );
        let mut block = Block::new(
            MockPort(bench.clone()),
            MockCounter(bench.clone()),
            MockClock(bench.clone()),
            LaneMap::identity(),
        );

        // Rejected frames leave the counter alone
        assert_eq!(strip.show(&leds, 255), Err(Error::NotInitialized));
        assert_eq!(strip.show_color(leds[0], 2, 255), Err(Error::NotInitialized));
        assert_eq!(strip.show_interleaved(&[1, 2, 3], 1, 0, 255), Err(Error::NotInitialized));
        assert_eq!(block.show_lanes([&leds, &leds], 255), Err(Error::NotInitialized));
        assert_eq!(block.show_color(leds[0], 2, 255), Err(Error::NotInitialized));
        assert_eq!(next_frame(), second.wrapping_add(1));

        // One step per frame, shared by all lanes of a block
        strip.init();
        block.init();
        let before = next_frame();
        strip.show(&leds, 255).unwrap();
        block.show_lanes([&leds, &leds], 255).unwrap();
        assert_eq!(next_frame(), before.wrapping_add(3));
    }

    #[test]
    fn test_average_bias_against_full_scale() {
        // Worst pair: scale8 divides by 256, so 241 * 239 averages to
        // 224.5, within 0.5 of 225.0 (/256) but 1.38 below 225.88 (/255)
        let (raw, scale) = (241u8, 239u8);
        let total: u32 = (0..=255u8)
            .map(|frame| {
                let byte = PixelController::<RgbOrder>::broadcast(
                    Rgb::new(raw, raw, raw),
                    1,
                    Rgb::new(scale, scale, scale),
                    DitherMode::Disabled,
                )
                .with_dither(Dither::binary(Rgb::new(scale, scale, scale), frame))
                .bytes()
                .next()
                .unwrap();
                u32::from(byte)
            })
            .sum();
        assert_eq!(total, 224 * 256 + 128);

        let average = f64::from(total) / 256.0;
        let product = f64::from(raw) * f64::from(scale);
        assert!((average - product / 256.0).abs() <= 0.5);
        assert!((average - product / 255.0).abs() > 1.0);
    }

    #[test]
    fn test_time_average_tracks_exact_scale() {
        for scale in (1..=255u8).step_by(3) {
            for raw in 0..=255u8 {
                let mut total = 0u32;
                for frame in 0..=255u8 {
                    let first = PixelController::<RgbOrder>::broadcast(
                        Rgb::new(raw, raw, raw),
                        1,
                        Rgb::new(scale, scale, scale),
                        DitherMode::Disabled,
                    )
                    .with_dither(Dither::binary(Rgb::new(scale, scale, scale), frame))
                    .bytes()
                    .next()
                    .unwrap();
                    total += u32::from(first);
                }

                let average = f64::from(total) / 256.0;
                let product = f64::from(raw) * f64::from(scale);
                assert!(
                    (average - product / 256.0).abs() < 1.0,
                    "raw={} scale={} average={}",
                    raw,
                    scale,
                    average
                );
                // Up to 1.38, see test_average_bias_against_full_scale
                assert!(
                    (average - product / 255.0).abs() < 1.4,
                    "raw={} scale={} average={}",
                    raw,
                    scale,
                    average
                );
            }
        }
    }
}
