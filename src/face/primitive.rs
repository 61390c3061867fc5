/*
 *  face/primitive.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Drawing instructions produced by the expression renderer
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

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

/// 24-bit color, one byte per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Same value on all three channels
    pub const fn gray(level: u8) -> Rgb {
        Rgb(level, level, level)
    }
}

impl From<Rgb> for Rgb888 {
    fn from(c: Rgb) -> Self {
        Rgb888::new(c.0, c.1, c.2)
    }
}

impl From<Rgb888> for Rgb {
    fn from(c: Rgb888) -> Self {
        Rgb(c.r(), c.g(), c.b())
    }
}

/// Bounding box with inclusive corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BBox {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Square box of radius `r` around (cx, cy)
    pub const fn around(cx: i32, cy: i32, r: i32) -> Self {
        Self::new(cx - r, cy - r, cx + r, cy + r)
    }

    /// Shift the whole box vertically
    pub const fn offset_y(self, dy: i32) -> Self {
        Self::new(self.x0, self.y0 + dy, self.x1, self.y1 + dy)
    }

    pub fn width(&self) -> u32 {
        (self.x1 - self.x0 + 1).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y1 - self.y0 + 1).max(0) as u32
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x0, self.y0)
    }
}

/// One drawing instruction
///
/// Angles are in degrees, 0 at three o'clock, growing clockwise on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawPrimitive {
    Ellipse {
        bbox: BBox,
        fill: Rgb,
    },
    Arc {
        bbox: BBox,
        start_deg: i32,
        end_deg: i32,
        color: Rgb,
        stroke: u32,
    },
    Line {
        p0: Point,
        p1: Point,
        color: Rgb,
        stroke: u32,
    },
    Text {
        pos: Point,
        text: String,
        color: Rgb,
    },
}

impl DrawPrimitive {
    /// Short tag used in debug logs
    pub fn kind(&self) -> &'static str {
        match self {
            DrawPrimitive::Ellipse { .. } => "ellipse",
            DrawPrimitive::Arc { .. } => "arc",
            DrawPrimitive::Line { .. } => "line",
            DrawPrimitive::Text { .. } => "text",
        }
    }
}
