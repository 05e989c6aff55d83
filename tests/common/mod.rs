//! Shared test infrastructure for dimmer-core integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use dimmer_core::{
    ChannelSink, ChannelState, DimmerConfig, Diagnostic, Diagnostics, Dispatcher, Instruction,
    Millis, TimeSource,
};
use heapless::{Deque, Vec};

// ============================================================================
// Mock Clock
// ============================================================================

/// Mock millisecond counter with controllable time advancement
pub struct MockClock {
    current_time: core::cell::Cell<Millis>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(millis: u32) -> Self {
        Self {
            current_time: core::cell::Cell::new(Millis(millis)),
        }
    }

    /// Advance time by the given number of milliseconds, wrapping like hardware
    pub fn advance(&self, millis: u32) {
        let current = self.current_time.get();
        self.current_time.set(current.wrapping_add(millis));
    }

    pub fn set_time(&self, millis: u32) {
        self.current_time.set(Millis(millis));
    }
}

impl TimeSource for MockClock {
    fn now(&self) -> Millis {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Sink
// ============================================================================

/// Mock PWM outputs that record every write
pub struct MockSink<const N: usize> {
    duties: ChannelState<N>,
    relay: bool,
    duty_history: Vec<ChannelState<N>, 64>,
    relay_history: Vec<bool, 16>,
}

impl<const N: usize> MockSink<N> {
    pub fn new() -> Self {
        Self {
            duties: ChannelState::OFF,
            relay: false,
            duty_history: Vec::new(),
            relay_history: Vec::new(),
        }
    }

    pub fn duties(&self) -> ChannelState<N> {
        self.duties
    }

    pub fn relay(&self) -> bool {
        self.relay
    }

    pub fn duty_history(&self) -> &[ChannelState<N>] {
        &self.duty_history
    }

    pub fn relay_history(&self) -> &[bool] {
        &self.relay_history
    }

    pub fn write_count(&self) -> usize {
        self.duty_history.len()
    }
}

impl<const N: usize> ChannelSink<N> for MockSink<N> {
    fn set_duties(&mut self, duties: &ChannelState<N>) {
        self.duties = *duties;
        let _ = self.duty_history.push(*duties);
    }

    fn set_relay(&mut self, on: bool) {
        self.relay = on;
        let _ = self.relay_history.push(on);
    }
}

// ============================================================================
// Mock Serial
// ============================================================================

/// Error returned by a [`MockSerial`] told to fail its writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockSerialError;

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

/// Mock serial port: bytes queued by the test are read by the dimmer,
/// replies are captured
pub struct MockSerial {
    rx: Deque<u8, 512>,
    tx: Vec<u8, 256>,
    fail_writes: bool,
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            rx: Deque::new(),
            tx: Vec::new(),
            fail_writes: false,
        }
    }

    /// Make every write and flush fail until switched back
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Queue bytes as if they had arrived on the wire
    pub fn receive(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.rx.push_back(byte).expect("mock rx queue full");
        }
    }

    /// Queue an encoded instruction
    pub fn receive_instruction<const N: usize>(&mut self, instruction: &Instruction<N>) {
        self.receive(&instruction.encode());
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    pub fn sent(&self) -> &[u8] {
        &self.tx
    }

    pub fn clear_sent(&mut self) {
        self.tx.clear();
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut count = 0;
        while count < buf.len() {
            match self.rx.pop_front() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}

impl embedded_io::ReadReady for MockSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.rx.is_empty())
    }
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(MockSerialError);
        }
        for &byte in buf {
            self.tx.push(byte).expect("mock tx buffer full");
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MockSerialError);
        }
        Ok(())
    }
}

// ============================================================================
// Recording Diagnostics
// ============================================================================

/// Diagnostics sink that keeps every event it is handed
pub struct RecordingDiagnostics<const N: usize> {
    events: Vec<Diagnostic<N>, 64>,
}

impl<const N: usize> RecordingDiagnostics<N> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn events(&self) -> &[Diagnostic<N>] {
        &self.events
    }
}

impl<const N: usize> Diagnostics<N> for RecordingDiagnostics<N> {
    fn record(&mut self, event: &Diagnostic<N>) {
        let _ = self.events.push(*event);
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

pub type TestDimmer<'t> =
    Dispatcher<'t, MockClock, MockSink<4>, MockSerial, RecordingDiagnostics<4>, 4>;

/// Four-channel dimmer with default config on mock hardware
pub fn quad_dimmer(clock: &MockClock) -> TestDimmer<'_> {
    quad_dimmer_with(clock, DimmerConfig::default())
}

pub fn quad_dimmer_with(clock: &MockClock, config: DimmerConfig) -> TestDimmer<'_> {
    Dispatcher::new(
        config,
        clock,
        MockSink::new(),
        MockSerial::new(),
        RecordingDiagnostics::new(),
    )
}

/// Tick until the transport is drained, returning how many ticks it took
pub fn drain(dimmer: &mut TestDimmer<'_>) -> usize {
    let mut ticks = 0;
    while dimmer.transport().pending() > 0 {
        dimmer.tick().unwrap();
        ticks += 1;
    }
    ticks
}
