/*
 *  display/traits.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Core trait definitions for the canvas sink abstraction
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

use crate::display::canvas::Frame;
use crate::display::error::DisplayError;

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct SinkCapabilities {
    /// Display width in pixels (after rotation)
    pub width: u32,

    /// Display height in pixels (after rotation)
    pub height: u32,

    /// Human readable controller name for logs
    pub name: &'static str,

    /// Whether the display has a switchable backlight
    pub supports_backlight: bool,
}

/// Consumer of fully composed frames
///
/// A sink owns its bus exclusively. Callers hand it one complete frame at a
/// time and get back success or failure; nothing else flows back.
pub trait CanvasSink: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &SinkCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Initialize the display hardware
    ///
    /// Resets the controller and brings it out of sleep. Called once before
    /// the first frame.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Transmit one frame; returns once the last byte has been written
    fn write_frame(&mut self, frame: &Frame) -> Result<(), DisplayError>;

    /// Switch the backlight (if supported)
    fn set_backlight(&mut self, _on: bool) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }

    /// Check a frame matches the panel before any bytes go out
    fn check_frame(&self, frame: &Frame) -> Result<(), DisplayError> {
        let expected = self.dimensions();
        let actual = (frame.width(), frame.height());
        if expected != actual {
            return Err(DisplayError::FrameSizeMismatch { expected, actual });
        }
        Ok(())
    }
}

/// Type alias for boxed sink trait objects
pub type BoxedSink = Box<dyn CanvasSink>;
