/*
 *  state.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Display state - geometry, current face and the owned sink
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

use embedded_graphics::prelude::Point;
use log::{debug, info, warn};

use crate::display::canvas::{Canvas, Frame};
use crate::display::error::DisplayError;
use crate::display::traits::BoxedSink;
use crate::face::{render, DrawPrimitive, Expression, FaceGeometry, Rgb};

/// Everything one configured panel needs between commands
///
/// Owned by the service behind a single mutex. Without a sink every draw
/// succeeds without composing a frame.
pub struct DisplayState {
    width: u32,
    height: u32,
    geometry: FaceGeometry,
    current_expression: Expression,
    sink: Option<BoxedSink>,
}

impl DisplayState {
    /// Validate the size, bring the panel up and show the neutral face
    pub fn new(width: u32, height: u32, mut sink: Option<BoxedSink>) -> Result<Self, DisplayError> {
        let geometry = FaceGeometry::compute(dimension(width)?, dimension(height)?)?;

        match sink.as_deref_mut() {
            Some(sink) => {
                let (sw, sh) = sink.dimensions();
                if (sw, sh) != (width, height) {
                    return Err(DisplayError::InvalidConfiguration(format!(
                        "{} is {}x{}, configured for {}x{}",
                        sink.capabilities().name, sw, sh, width, height
                    )));
                }
                sink.init()?;
            }
            None => warn!("No display attached - commands will be accepted but not drawn"),
        }

        let mut state = Self {
            width,
            height,
            geometry,
            current_expression: Expression::Neutral,
            sink,
        };
        state.show(Expression::Neutral)?;

        Ok(state)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn geometry(&self) -> &FaceGeometry {
        &self.geometry
    }

    pub fn current_expression(&self) -> Expression {
        self.current_expression
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Draw `expression`; the current face changes only once the frame is out
    pub fn show(&mut self, expression: Expression) -> Result<(), DisplayError> {
        let primitives = render(expression, &self.geometry);
        debug!("Drawing {} face: {}", expression,
            primitives.iter().map(DrawPrimitive::kind).collect::<Vec<_>>().join(", "));
        self.transmit(&primitives)?;
        self.current_expression = expression;
        Ok(())
    }

    /// Black frame; the current face is left alone
    pub fn blank(&mut self) -> Result<(), DisplayError> {
        self.transmit(&[])
    }

    /// White text on black with its top-left corner at (x, y)
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), DisplayError> {
        debug!("Drawing text {:?} at ({}, {})", text, x, y);
        self.transmit(&[DrawPrimitive::Text {
            pos: Point::new(x, y),
            text: text.to_string(),
            color: Rgb::WHITE,
        }])
    }

    /// Blank the panel, switch off its backlight and give up the sink
    ///
    /// Best effort: failures are logged, never returned.
    pub fn close(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            if let Err(e) = sink.write_frame(&Frame::black(self.width, self.height)) {
                warn!("Failed to blank {} on close: {}", sink.capabilities().name, e);
            }
            if sink.capabilities().supports_backlight {
                if let Err(e) = sink.set_backlight(false) {
                    warn!("Failed to switch off {} backlight: {}", sink.capabilities().name, e);
                }
            }
            info!("{} released", sink.capabilities().name);
        }
    }

    fn transmit(&mut self, primitives: &[DrawPrimitive]) -> Result<(), DisplayError> {
        let Some(sink) = self.sink.as_mut() else {
            return Ok(());
        };
        let frame = Canvas::compose(self.width, self.height, primitives).to_frame();
        sink.write_frame(&frame)
    }
}

impl Drop for DisplayState {
    fn drop(&mut self) {
        self.close();
    }
}

fn dimension(px: u32) -> Result<i32, DisplayError> {
    i32::try_from(px).map_err(|_| {
        DisplayError::InvalidConfiguration(format!("dimension {} out of range", px))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::MockSink;

    fn with_mock(w: u32, h: u32) -> (DisplayState, MockSink) {
        let mock = MockSink::new(w, h);
        let state = DisplayState::new(w, h, Some(Box::new(mock.clone()))).unwrap();
        (state, mock)
    }

    #[test]
    fn test_new_shows_neutral() {
        let (state, mock) = with_mock(240, 240);
        assert_eq!(state.current_expression(), Expression::Neutral);
        assert_eq!(mock.state().lock().unwrap().init_count, 1);
        assert_eq!(mock.frame_count(), 1);
        assert!(!mock.last_frame().unwrap().is_blank());
    }

    #[test]
    fn test_new_without_sink() {
        let state = DisplayState::new(240, 240, None).unwrap();
        assert!(!state.has_sink());
        assert_eq!(state.current_expression(), Expression::Neutral);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            DisplayState::new(0, 240, None),
            Err(DisplayError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_sink_size_must_match() {
        let mock = MockSink::new(128, 160);
        assert!(DisplayState::new(240, 240, Some(Box::new(mock))).is_err());
    }

    #[test]
    fn test_init_failure_is_returned() {
        let mock = MockSink::new(240, 240);
        mock.state().lock().unwrap().simulate_init_failure = true;
        assert!(matches!(
            DisplayState::new(240, 240, Some(Box::new(mock))),
            Err(DisplayError::InitializationFailed(_))
        ));
    }

    #[test]
    fn test_failed_write_keeps_expression() {
        let (mut state, mock) = with_mock(240, 240);
        mock.state().lock().unwrap().simulate_write_failure = true;
        assert!(state.show(Expression::Happy).is_err());
        assert_eq!(state.current_expression(), Expression::Neutral);
    }

    #[test]
    fn test_blank_and_text() {
        let (mut state, mock) = with_mock(240, 240);
        state.blank().unwrap();
        assert!(mock.last_frame().unwrap().is_blank());

        state.draw_text("hi", 10, 50).unwrap();
        let frame = mock.last_frame().unwrap();
        assert!(!frame.is_blank());
        // glyphs stay inside the two character cells
        for y in 0..240 {
            for x in 0..240 {
                if frame.pixel(x, y) != Some(Rgb::BLACK) {
                    assert!((10..22).contains(&x) && (50..60).contains(&y), "stray pixel at {},{}", x, y);
                }
            }
        }
        assert_eq!(state.current_expression(), Expression::Neutral);
    }

    #[test]
    fn test_close_blanks_and_releases() {
        let (mut state, mock) = with_mock(64, 64);
        state.close();
        assert!(!state.has_sink());
        assert!(mock.last_frame().unwrap().is_blank());
        let frames = mock.frame_count();
        state.close();
        assert_eq!(mock.frame_count(), frames);
    }

    #[test]
    fn test_close_switches_backlight_off() {
        let (mut state, mock) = with_mock(64, 64);
        mock.state().lock().unwrap().backlight = Some(true);
        state.close();
        assert_eq!(mock.state().lock().unwrap().backlight, Some(false));
    }

    #[test]
    fn test_close_survives_write_failure() {
        let (mut state, mock) = with_mock(64, 64);
        mock.state().lock().unwrap().simulate_write_failure = true;
        state.close();
        assert!(!state.has_sink());
    }
}
