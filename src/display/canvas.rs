/*
 *  display/canvas.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Runtime-sized RGB canvas: rasterizes face primitives into a frame
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

use core::convert::Infallible;
use std::f64::consts::PI;

use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::mono_font::{ascii::FONT_6X10, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Ellipse, Line, Polyline, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::face::{BBox, DrawPrimitive, Rgb};

/// One complete frame, 24-bit RGB, row-major, no padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// All-black frame
    pub fn black(width: u32, height: u32) -> Self {
        Self { width, height, data: vec![0; width as usize * height as usize * 3] }
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    /// Raw RGB bytes
    pub fn as_bytes(&self) -> &[u8] { &self.data }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some(Rgb(self.data[i], self.data[i + 1], self.data[i + 2]))
    }

    /// Number of pixels that are not black
    pub fn lit_pixels(&self) -> usize {
        self.data.chunks_exact(3).filter(|p| p.iter().any(|&c| c != 0)).count()
    }

    /// True when every pixel is black
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }
}

/// A runtime-sized RGB888 framebuffer for embedded-graphics.
#[derive(Debug, Clone)]
pub struct Canvas {
    buf: Vec<Rgb888>,
    w: usize,
    h: usize,
}

impl Canvas {
    /// Black canvas
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![Rgb888::BLACK; w * h], w, h }
    }

    /// Black canvas with `primitives` painted in order
    pub fn compose(width: u32, height: u32, primitives: &[DrawPrimitive]) -> Self {
        let mut canvas = Self::new(width, height);
        for p in primitives {
            canvas.paint(p);
        }
        canvas
    }

    /// Rasterize one primitive; anything off-canvas is clipped
    pub fn paint(&mut self, primitive: &DrawPrimitive) {
        match primitive {
            DrawPrimitive::Ellipse { bbox, fill } => {
                if bbox.width() == 0 || bbox.height() == 0 {
                    return;
                }
                let _ = Ellipse::new(bbox.top_left(), Size::new(bbox.width(), bbox.height()))
                    .into_styled(PrimitiveStyle::with_fill(Rgb888::from(*fill)))
                    .draw(self);
            }
            DrawPrimitive::Arc { bbox, start_deg, end_deg, color, stroke } => {
                let points = arc_points(bbox, *start_deg, *end_deg);
                if points.len() < 2 {
                    return;
                }
                let _ = Polyline::new(&points)
                    .into_styled(PrimitiveStyle::with_stroke(Rgb888::from(*color), *stroke))
                    .draw(self);
            }
            DrawPrimitive::Line { p0, p1, color, stroke } => {
                let _ = Line::new(*p0, *p1)
                    .into_styled(PrimitiveStyle::with_stroke(Rgb888::from(*color), *stroke))
                    .draw(self);
            }
            DrawPrimitive::Text { pos, text, color } => {
                // glyph placement adds to pos and overflows far outside the canvas
                if !self.text_overlaps(*pos, text) {
                    return;
                }
                let style = MonoTextStyle::new(&FONT_6X10, Rgb888::from(*color));
                let _ = Text::with_baseline(text, *pos, style, Baseline::Top).draw(self);
            }
        }
    }

    /// Export as a 24-bit frame for a sink
    pub fn to_frame(&self) -> Frame {
        let mut data = Vec::with_capacity(self.buf.len() * 3);
        for c in &self.buf {
            data.extend_from_slice(&[c.r(), c.g(), c.b()]);
        }
        Frame { width: self.w as u32, height: self.h as u32, data }
    }

    /// Whether FONT_6X10 text at `pos` (top-left) touches the canvas
    fn text_overlaps(&self, pos: Point, text: &str) -> bool {
        let glyph = FONT_6X10.character_size;
        let columns = text.lines().map(|l| l.chars().count()).max().unwrap_or(0) as i64;
        let rows = text.lines().count().max(1) as i64;
        let (x, y) = (pos.x as i64, pos.y as i64);

        x < self.w as i64
            && y < self.h as i64
            && x + columns * glyph.width as i64 > 0
            && y + rows * glyph.height as i64 > 0
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

/// Sample an elliptical arc inside `bbox` as a polyline.
///
/// `end < start` wraps through 360; sweeps beyond a full turn are clamped.
fn arc_points(bbox: &BBox, start_deg: i32, end_deg: i32) -> Vec<Point> {
    let rx = (bbox.x1 - bbox.x0) as f64 / 2.0;
    let ry = (bbox.y1 - bbox.y0) as f64 / 2.0;
    if rx <= 0.0 && ry <= 0.0 {
        return Vec::new();
    }
    let cx = bbox.x0 as f64 + rx;
    let cy = bbox.y0 as f64 + ry;

    let mut sweep = end_deg - start_deg;
    while sweep < 0 {
        sweep += 360;
    }
    let sweep = sweep.min(360);
    if sweep == 0 {
        return Vec::new();
    }

    // roughly one vertex every two pixels of arc
    let approx_len = PI * (rx + ry) * sweep as f64 / 360.0;
    let steps = ((approx_len / 2.0).ceil() as usize).max(4);

    (0..=steps)
        .map(|i| {
            let deg = start_deg as f64 + sweep as f64 * i as f64 / steps as f64;
            let t = deg.to_radians();
            Point::new((cx + rx * t.cos()).round() as i32, (cy + ry * t.sin()).round() as i32)
        })
        .collect()
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // walk the area in row order so clipped pixels still consume colors
        let mut it = colors.into_iter();
        for y in 0..area.size.height as i32 {
            for x in 0..area.size.width as i32 {
                let Some(c) = it.next() else { return Ok(()) };
                if let Some(i) = self.idx(area.top_left + Point::new(x, y)) {
                    self.buf[i] = c;
                }
            }
        }
        Ok(())
    }
}
