/*
 *  face/geometry.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Face layout derived from the canvas size
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

use crate::display::error::DisplayError;

/// Side of the square canvas the fixed recipe offsets were drawn against
pub const REFERENCE_SIZE: i32 = 240;

/// Stroke width for eyes and mouths
pub const LINE_WIDTH: i32 = 6;

/// Layout constants for one canvas size
///
/// Everything is a fraction of the canvas so a face drawn on a 128x160
/// panel looks like the same face drawn on 240x240.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceGeometry {
    pub width: i32,
    pub height: i32,
    pub center_x: i32,
    pub eye_y: i32,
    pub eye_spacing: i32,
    pub eye_radius: i32,
    pub mouth_y: i32,
    pub mouth_width: i32,
    pub line_width: i32,
}

impl FaceGeometry {
    /// Derive the layout for a `width` x `height` canvas
    pub fn compute(width: i32, height: i32) -> Result<Self, DisplayError> {
        if width <= 0 || height <= 0 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "canvas must be at least 1x1, got {}x{}",
                width, height
            )));
        }

        Ok(Self {
            width,
            height,
            center_x: width / 2,
            eye_y: height / 3,
            eye_spacing: width / 4,
            eye_radius: width / 12,
            // round(height * 0.7) without float drift
            mouth_y: ((height as i64 * 7 + 5) / 10) as i32,
            mouth_width: width / 3,
            line_width: LINE_WIDTH,
        })
    }

    /// Scale a horizontal offset expressed on the 240px reference canvas
    pub fn scale_x(&self, px: i32) -> i32 {
        scale(px, self.width)
    }

    /// Scale a vertical offset expressed on the 240px reference canvas
    pub fn scale_y(&self, px: i32) -> i32 {
        scale(px, self.height)
    }

    /// X of the left eye center
    pub fn left_eye_x(&self) -> i32 {
        self.center_x - self.eye_spacing
    }

    /// X of the right eye center
    pub fn right_eye_x(&self) -> i32 {
        self.center_x + self.eye_spacing
    }
}

// rounds half away from zero so negative offsets mirror positive ones
fn scale(px: i32, extent: i32) -> i32 {
    let num = px as i64 * extent as i64;
    let den = REFERENCE_SIZE as i64;
    let half = den / 2;
    let q = if num >= 0 { (num + half) / den } else { (num - half) / den };
    q as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_canvas() {
        let g = FaceGeometry::compute(240, 240).unwrap();
        assert_eq!(g.center_x, 120);
        assert_eq!(g.eye_y, 80);
        assert_eq!(g.eye_spacing, 60);
        assert_eq!(g.eye_radius, 20);
        assert_eq!(g.mouth_y, 168);
        assert_eq!(g.mouth_width, 80);
        assert_eq!(g.line_width, 6);
    }

    #[test]
    fn test_st7735_canvas() {
        let g = FaceGeometry::compute(128, 160).unwrap();
        assert_eq!(g.center_x, 64);
        assert_eq!(g.eye_y, 53);
        assert_eq!(g.eye_spacing, 32);
        assert_eq!(g.eye_radius, 10);
        assert_eq!(g.mouth_y, 112);
        assert_eq!(g.mouth_width, 42);
    }

    #[test]
    fn test_mouth_rounds() {
        // 0.7 * 155 = 108.5
        let g = FaceGeometry::compute(100, 155).unwrap();
        assert_eq!(g.mouth_y, 109);
    }

    #[test]
    fn test_scales_linearly() {
        let base = FaceGeometry::compute(120, 90).unwrap();
        let doubled = FaceGeometry::compute(240, 180).unwrap();
        assert_eq!(doubled.eye_spacing, base.eye_spacing * 2);
        assert_eq!(doubled.eye_radius, base.eye_radius * 2);
        assert_eq!(doubled.mouth_width, base.mouth_width * 2);
        assert_eq!(doubled.eye_y, base.eye_y * 2);
        assert_eq!(doubled.mouth_y, base.mouth_y * 2);

        // height only moves the vertical values
        let taller = FaceGeometry::compute(120, 180).unwrap();
        assert_eq!(taller.eye_spacing, base.eye_spacing);
        assert_eq!(taller.eye_y, base.eye_y * 2);
    }

    #[test]
    fn test_tall_canvas_does_not_overflow() {
        let g = FaceGeometry::compute(1, 400_000_000).unwrap();
        assert_eq!(g.mouth_y, 280_000_000);

        let g = FaceGeometry::compute(i32::MAX, i32::MAX).unwrap();
        assert!(g.mouth_y > g.eye_y);
        assert_eq!(g.mouth_y, 1_503_238_553);
    }

    #[test]
    fn test_rejects_empty_canvas() {
        assert!(FaceGeometry::compute(0, 240).is_err());
        assert!(FaceGeometry::compute(240, 0).is_err());
        assert!(FaceGeometry::compute(-1, 10).is_err());
    }

    #[test]
    fn test_reference_offsets_unchanged() {
        let g = FaceGeometry::compute(240, 240).unwrap();
        assert_eq!(g.scale_x(35), 35);
        assert_eq!(g.scale_y(-70), -70);

        let small = FaceGeometry::compute(120, 60).unwrap();
        assert_eq!(small.scale_x(20), 10);
        assert_eq!(small.scale_y(20), 5);
        assert_eq!(small.scale_y(-10), -3);
    }
}
