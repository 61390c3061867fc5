/*
 *  display/drivers/mod.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Canvas sink implementations
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

// ST7789 / ST7735S over spidev
pub mod st77xx;

// Recording sink for tests and headless runs
pub mod mock;

pub use mock::{MockSink, MockSinkState, SinkEvent};
pub use st77xx::{Controller, LinuxPanel, St77xxSink};
