//! Shared test bench for the transmitter tests
//!
//! All mocks share one `Bench`: a virtual CPU cycle count, a virtual
//! microsecond clock and the recorded pin/port activity.

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use myrtio_clockless::hal::{CycleCounter, CycleDelay, FastPin, OutputPort, SystemClock};
use myrtio_clockless::{Duration, Instant};

/// Cost of one mock pin write
pub const PIN_CYCLES: u32 = 2;
/// Fetch budget of the mock delay
pub const LOAD_CYCLES: u32 = 8;

// ============================================================================
// Bench
// ============================================================================

/// Level change on the single-lane pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub cycle: u64,
    pub micros: u64,
    pub high: bool,
}

/// Port write of the block transmitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOp {
    Set { at: u32, mask: u32 },
    Clear { at: u32, mask: u32 },
}

#[derive(Debug, Default)]
pub struct Bench {
    pub cycles: Cell<u64>,
    pub micros: Cell<u64>,
    pub level: Cell<bool>,
    pub edges: RefCell<Vec<Edge>>,
    pub writes: Cell<usize>,
    pub counter: Cell<u32>,
    pub last_read: Cell<u32>,
    pub port: RefCell<Vec<PortOp>>,
    pub advances: RefCell<Vec<Duration>>,
}

impl Bench {
    pub fn new() -> Rc<Self> {
        let bench = Self::default();
        bench.counter.set(1_000_000);
        Rc::new(bench)
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.edges.borrow().clone()
    }

    pub fn port_ops(&self) -> Vec<PortOp> {
        self.port.borrow().clone()
    }
}

// ============================================================================
// Single lane
// ============================================================================

pub struct MockPin(pub Rc<Bench>);

impl MockPin {
    fn write(&mut self, high: bool) {
        let bench = &self.0;
        if bench.level.get() != high {
            bench.edges.borrow_mut().push(Edge {
                cycle: bench.cycles.get(),
                micros: bench.micros.get(),
                high,
            });
            bench.level.set(high);
        }
        bench.writes.set(bench.writes.get() + 1);
        bench
            .cycles
            .set(bench.cycles.get() + u64::from(PIN_CYCLES));
    }
}

impl FastPin for MockPin {
    const CYCLES: u32 = PIN_CYCLES;

    fn hi(&mut self) {
        self.write(true);
    }

    fn lo(&mut self) {
        self.write(false);
    }
}

pub struct MockDelay(pub Rc<Bench>);

impl CycleDelay for MockDelay {
    const LOAD_CYCLES: u32 = LOAD_CYCLES;

    fn delay_cycles(&mut self, cycles: u32) {
        let bench = &self.0;
        bench.cycles.set(bench.cycles.get() + u64::from(cycles));
    }
}

/// Clock that moves one microsecond per read
pub struct MockClock(pub Rc<Bench>);

impl SystemClock for MockClock {
    fn now(&self) -> Instant {
        let now = self.0.micros.get();
        self.0.micros.set(now + 1);
        Instant::from_micros(now)
    }

    fn advance(&mut self, elapsed: Duration) {
        self.0.advances.borrow_mut().push(elapsed);
        self.0.micros.set(self.0.micros.get() + elapsed.as_micros());
    }
}

/// High pulse widths in cycles, one per transmitted bit
pub fn pulses(edges: &[Edge]) -> Vec<u64> {
    edges
        .windows(2)
        .filter(|pair| pair[0].high && !pair[1].high)
        .map(|pair| pair[1].cycle - pair[0].cycle)
        .collect()
}

/// Rebuild bytes from pulse widths; long pulses are ones
pub fn decode(pulses: &[u64], threshold: u64) -> Vec<u8> {
    pulses
        .chunks(8)
        .map(|bits| {
            bits.iter()
                .fold(0u8, |byte, &width| (byte << 1) | u8::from(width >= threshold))
        })
        .collect()
}

// ============================================================================
// Block
// ============================================================================

/// Down counter that moves one cycle per read
pub struct MockCounter(pub Rc<Bench>);

impl CycleCounter for MockCounter {
    fn cycles(&self) -> u32 {
        let value = self.0.counter.get();
        self.0.counter.set(value.wrapping_sub(1));
        self.0.last_read.set(value);
        value
    }
}

pub struct MockPort(pub Rc<Bench>);

impl OutputPort for MockPort {
    const CYCLES: u32 = 1;

    fn set_bits(&mut self, mask: u32) {
        let at = self.0.last_read.get();
        self.0.port.borrow_mut().push(PortOp::Set { at, mask });
    }

    fn clear_bits(&mut self, mask: u32) {
        let at = self.0.last_read.get();
        self.0.port.borrow_mut().push(PortOp::Clear { at, mask });
    }
}

/// One bit-time of a block transmission, counter values at each write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitTime {
    pub start: u32,
    pub zeros: u32,
    pub zeros_at: u32,
    pub low_at: u32,
}

/// Group the port writes into bit-times (set, clear zeros, clear all)
pub fn bit_times(ops: &[PortOp]) -> Vec<BitTime> {
    ops.chunks(3)
        .map(|chunk| match *chunk {
            [
                PortOp::Set { at: start, .. },
                PortOp::Clear {
                    at: zeros_at,
                    mask: zeros,
                },
                PortOp::Clear { at: low_at, .. },
            ] => BitTime {
                start,
                zeros,
                zeros_at,
                low_at,
            },
            _ => panic!("unexpected port write sequence: {:?}", chunk),
        })
        .collect()
}

/// Rebuild the byte stream of one lane on port bit `bit`
pub fn lane_bytes(times: &[BitTime], bit: u8) -> Vec<u8> {
    times
        .chunks(8)
        .map(|bits| {
            bits.iter().fold(0u8, |byte, time| {
                (byte << 1) | u8::from(time.zeros & (1 << bit) == 0)
            })
        })
        .collect()
}
