/*
 *  display/drivers/mock.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Recording sink for testing without hardware
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::display::canvas::Frame;
use crate::display::error::DisplayError;
use crate::display::traits::{CanvasSink, SinkCapabilities};

/// Mock sink for testing
///
/// Records every frame it is handed and brackets each write with
/// `Begin`/`End` events so tests can check that writes never overlap.
/// State lives behind an `Arc` so a test keeps a handle after the sink
/// itself has been moved into a `DisplayState`.
#[derive(Debug, Clone)]
pub struct MockSink {
    /// Display capabilities
    capabilities: SinkCapabilities,

    /// Shared state for testing
    state: Arc<Mutex<MockSinkState>>,
}

/// Write bracket recorded by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    Begin(usize),
    End(usize),
}

/// Internal state for the mock sink (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockSinkState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Every frame successfully written, oldest first
    pub frames: Vec<Frame>,

    /// Begin/End brackets of every write attempt
    pub events: Vec<SinkEvent>,

    /// A write started while another was still in progress
    pub overlaps: usize,

    /// Last backlight state set
    pub backlight: Option<bool>,

    /// Time each write takes (widens the window for overlap tests)
    pub write_delay: Option<Duration>,

    /// Simulate failures (for error testing)
    pub simulate_write_failure: bool,
    pub simulate_init_failure: bool,

    in_flight: bool,
    next_write: usize,
}

impl MockSink {
    /// Create a mock sink of the given size
    pub fn new(width: u32, height: u32) -> Self {
        let capabilities = SinkCapabilities {
            width,
            height,
            name: "mock",
            supports_backlight: true,
        };

        Self {
            capabilities,
            state: Arc::new(Mutex::new(MockSinkState::default())),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockSinkState>> {
        Arc::clone(&self.state)
    }

    /// Number of frames written so far
    pub fn frame_count(&self) -> usize {
        self.lock().frames.len()
    }

    /// Most recent frame written
    pub fn last_frame(&self) -> Option<Frame> {
        self.lock().frames.last().cloned()
    }

    // a test that panicked mid-write poisons the lock; keep going
    fn lock(&self) -> MutexGuard<'_, MockSinkState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CanvasSink for MockSink {
    fn capabilities(&self) -> &SinkCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();

        if state.simulate_init_failure {
            return Err(DisplayError::InitializationFailed("Simulated init failure".to_string()));
        }

        state.init_count += 1;
        Ok(())
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        self.check_frame(frame)?;

        let (id, delay) = {
            let mut state = self.lock();
            let id = state.next_write;
            state.next_write += 1;
            if state.in_flight {
                state.overlaps += 1;
            }
            state.in_flight = true;
            state.events.push(SinkEvent::Begin(id));
            (id, state.write_delay)
        }; // Release lock while the "bus" is busy

        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let mut state = self.lock();
        state.in_flight = false;
        state.events.push(SinkEvent::End(id));

        if state.simulate_write_failure {
            return Err(DisplayError::SpiError("Simulated write failure".to_string()));
        }

        state.frames.push(frame.clone());
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.lock().backlight = Some(on);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_sink_creation() {
        let sink = MockSink::new(240, 240);
        assert_eq!(sink.dimensions(), (240, 240));
        assert_eq!(sink.frame_count(), 0);
        assert!(sink.last_frame().is_none());
    }

    #[test]
    fn test_mock_sink_init() {
        let mut sink = MockSink::new(240, 240);

        let state = sink.state();
        assert_eq!(state.lock().unwrap().init_count, 0);

        sink.init().unwrap();

        assert_eq!(state.lock().unwrap().init_count, 1);
    }

    #[test]
    fn test_mock_sink_records_frames() {
        let mut sink = MockSink::new(4, 4);
        sink.write_frame(&Frame::black(4, 4)).unwrap();
        sink.write_frame(&Frame::black(4, 4)).unwrap();

        assert_eq!(sink.frame_count(), 2);
        let state = sink.state();
        assert_eq!(
            state.lock().unwrap().events,
            vec![SinkEvent::Begin(0), SinkEvent::End(0), SinkEvent::Begin(1), SinkEvent::End(1)]
        );
        assert_eq!(state.lock().unwrap().overlaps, 0);
    }

    #[test]
    fn test_mock_sink_rejects_wrong_size() {
        let mut sink = MockSink::new(4, 4);
        assert!(matches!(
            sink.write_frame(&Frame::black(8, 4)),
            Err(DisplayError::FrameSizeMismatch { .. })
        ));
        assert_eq!(sink.frame_count(), 0);
    }

    #[test]
    fn test_mock_sink_simulated_failure() {
        let mut sink = MockSink::new(4, 4);

        sink.state().lock().unwrap().simulate_write_failure = true;
        assert!(sink.write_frame(&Frame::black(4, 4)).is_err());
        assert_eq!(sink.frame_count(), 0);

        sink.state().lock().unwrap().simulate_write_failure = false;
        assert!(sink.write_frame(&Frame::black(4, 4)).is_ok());
        assert_eq!(sink.frame_count(), 1);
    }

    #[test]
    fn test_mock_sink_backlight() {
        let mut sink = MockSink::new(4, 4);
        sink.set_backlight(true).unwrap();
        assert_eq!(sink.state().lock().unwrap().backlight, Some(true));
    }
}
