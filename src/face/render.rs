/*
 *  face/render.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Expression recipes: eyes, pupils and mouth as draw primitives
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

use super::expression::Expression;
use super::geometry::FaceGeometry;
use super::primitive::{BBox, DrawPrimitive, Rgb};

const CYAN: Rgb = Rgb(0, 255, 255);
const YELLOW: Rgb = Rgb(255, 255, 0);
const SOFT_BLUE: Rgb = Rgb(100, 100, 255);
const SOFT_RED: Rgb = Rgb(255, 100, 100);
const RED: Rgb = Rgb(255, 0, 0);
const OLIVE: Rgb = Rgb(200, 200, 0);
const PALE: Rgb = Rgb::gray(200);

/// Spiral eyes advance this many degrees per ring
const SPIRAL_STEP_DEG: i32 = 72;
const SPIRAL_STROKE: u32 = 3;

/// Build the primitive list for `expression`
///
/// Order is eyes, pupils, decorations, mouth. The black background is the
/// canvas itself. The output depends only on the arguments.
pub fn render(expression: Expression, g: &FaceGeometry) -> Vec<DrawPrimitive> {
    let mut out = Vec::with_capacity(8);
    match expression {
        Expression::Happy => happy(g, &mut out),
        Expression::Sad => sad(g, &mut out),
        Expression::Surprised => surprised(g, &mut out),
        Expression::Sleepy => sleepy(g, &mut out),
        Expression::Neutral => neutral(g, &mut out),
        Expression::Angry => angry(g, &mut out),
        Expression::Confused => confused(g, &mut out),
        Expression::Thinking => thinking(g, &mut out),
    }
    out
}

fn stroke(g: &FaceGeometry) -> u32 {
    g.line_width.max(1) as u32
}

fn eye_boxes(g: &FaceGeometry, r: i32) -> (BBox, BBox) {
    (
        BBox::around(g.left_eye_x(), g.eye_y, r),
        BBox::around(g.right_eye_x(), g.eye_y, r),
    )
}

fn ellipse(bbox: BBox, fill: Rgb) -> DrawPrimitive {
    DrawPrimitive::Ellipse { bbox, fill }
}

fn arc(bbox: BBox, start_deg: i32, end_deg: i32, color: Rgb, stroke: u32) -> DrawPrimitive {
    DrawPrimitive::Arc { bbox, start_deg, end_deg, color, stroke }
}

fn line(x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb, stroke: u32) -> DrawPrimitive {
    DrawPrimitive::Line {
        p0: Point::new(x0, y0),
        p1: Point::new(x1, y1),
        color,
        stroke,
    }
}

fn text(x: i32, y: i32, s: &str, color: Rgb) -> DrawPrimitive {
    DrawPrimitive::Text {
        pos: Point::new(x, y),
        text: s.to_string(),
        color,
    }
}

fn happy(g: &FaceGeometry, out: &mut Vec<DrawPrimitive>) {
    let (left, right) = eye_boxes(g, g.eye_radius);
    out.push(ellipse(left, CYAN));
    out.push(ellipse(right, CYAN));

    let half = g.mouth_width / 2;
    let lift = g.scale_y(20);
    out.push(arc(
        BBox::new(g.center_x - half, g.mouth_y - lift, g.center_x + half, g.mouth_y + lift),
        0,
        180,
        YELLOW,
        stroke(g),
    ));
}

fn sad(g: &FaceGeometry, out: &mut Vec<DrawPrimitive>) {
    // half-closed lids: top half of a squashed ellipse below the eye line
    let lid = g.eye_radius * 3 / 2;
    for x in [g.left_eye_x(), g.right_eye_x()] {
        out.push(arc(
            BBox::new(x - g.eye_radius, g.eye_y, x + g.eye_radius, g.eye_y + lid),
            180,
            360,
            SOFT_BLUE,
            stroke(g),
        ));
    }

    let half = g.mouth_width / 2;
    out.push(arc(
        BBox::new(g.center_x - half, g.mouth_y, g.center_x + half, g.mouth_y + g.scale_y(40)),
        180,
        360,
        SOFT_RED,
        stroke(g),
    ));
}

fn surprised(g: &FaceGeometry, out: &mut Vec<DrawPrimitive>) {
    let (left, right) = eye_boxes(g, g.eye_radius);
    out.push(ellipse(left, Rgb::WHITE));
    out.push(ellipse(right, Rgb::WHITE));

    let (left, right) = eye_boxes(g, g.eye_radius / 3);
    out.push(ellipse(left, Rgb::BLACK));
    out.push(ellipse(right, Rgb::BLACK));

    let half = g.scale_x(20);
    out.push(ellipse(
        BBox::new(g.center_x - half, g.mouth_y, g.center_x + half, g.mouth_y + g.scale_y(35)),
        Rgb::WHITE,
    ));
}

fn sleepy(g: &FaceGeometry, out: &mut Vec<DrawPrimitive>) {
    for x in [g.left_eye_x(), g.right_eye_x()] {
        out.push(line(x - g.eye_radius, g.eye_y, x + g.eye_radius, g.eye_y, PALE, stroke(g)));
    }

    // zzz
    out.push(text(g.center_x + g.scale_x(60), g.eye_y - g.scale_y(50), "Z", Rgb::gray(150)));
    out.push(text(g.center_x + g.scale_x(75), g.eye_y - g.scale_y(70), "Z", Rgb::gray(100)));

    let half = g.scale_x(30);
    out.push(arc(
        BBox::new(g.center_x - half, g.mouth_y, g.center_x + half, g.mouth_y + g.scale_y(20)),
        0,
        180,
        PALE,
        (g.line_width - 2).max(1) as u32,
    ));
}

fn neutral(g: &FaceGeometry, out: &mut Vec<DrawPrimitive>) {
    let (left, right) = eye_boxes(g, g.eye_radius);
    out.push(ellipse(left, Rgb::WHITE));
    out.push(ellipse(right, Rgb::WHITE));

    let (left, right) = eye_boxes(g, g.eye_radius / 2);
    out.push(ellipse(left, Rgb::BLACK));
    out.push(ellipse(right, Rgb::BLACK));

    let half = g.mouth_width / 2;
    out.push(line(g.center_x - half, g.mouth_y, g.center_x + half, g.mouth_y, PALE, stroke(g)));
}

fn angry(g: &FaceGeometry, out: &mut Vec<DrawPrimitive>) {
    let tilt = g.scale_y(10);
    let (lx, rx, r) = (g.left_eye_x(), g.right_eye_x(), g.eye_radius);
    // both slope down toward the nose
    out.push(line(lx - r, g.eye_y - tilt, lx + r, g.eye_y + tilt, RED, stroke(g)));
    out.push(line(rx - r, g.eye_y + tilt, rx + r, g.eye_y - tilt, RED, stroke(g)));

    let half = g.mouth_width / 2;
    out.push(line(
        g.center_x - half,
        g.mouth_y + g.scale_y(15),
        g.center_x + half,
        g.mouth_y,
        RED,
        stroke(g),
    ));
}

fn confused(g: &FaceGeometry, out: &mut Vec<DrawPrimitive>) {
    let drop = g.scale_y(10);

    let (left, right) = eye_boxes(g, g.eye_radius);
    out.push(ellipse(left, Rgb::WHITE));
    out.push(ellipse(right.offset_y(drop), Rgb::WHITE));

    let (left, right) = eye_boxes(g, g.eye_radius / 3);
    out.push(ellipse(left, Rgb::BLACK));
    out.push(ellipse(right.offset_y(drop), Rgb::BLACK));

    // zigzag
    let x = g.center_x - g.mouth_width / 2;
    let (step, wobble) = (g.scale_x(20), g.scale_y(5));
    let (hi, lo) = (g.mouth_y - wobble, g.mouth_y + wobble);
    out.push(line(x, lo, x + step, hi, OLIVE, stroke(g)));
    out.push(line(x + step, hi, x + 2 * step, lo, OLIVE, stroke(g)));
    out.push(line(x + 2 * step, lo, x + 3 * step, hi, OLIVE, stroke(g)));
}

fn thinking(g: &FaceGeometry, out: &mut Vec<DrawPrimitive>) {
    // spiral: each ring is a little wider and picks up where the last ended
    for i in 0..(g.eye_radius / 2) {
        let (start, end) = (i * SPIRAL_STEP_DEG, (i + 1) * SPIRAL_STEP_DEG);
        let (left, right) = eye_boxes(g, i * 2);
        out.push(arc(left, start, end, SOFT_BLUE, SPIRAL_STROKE));
        out.push(arc(right, start, end, SOFT_BLUE, SPIRAL_STROKE));
    }

    let half = g.scale_x(25);
    out.push(line(g.center_x - half, g.mouth_y, g.center_x + half, g.mouth_y, PALE, stroke(g)));
    out.push(line(
        g.center_x + half,
        g.mouth_y,
        g.center_x + g.scale_x(35),
        g.mouth_y - g.scale_y(10),
        PALE,
        stroke(g),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> FaceGeometry {
        FaceGeometry::compute(240, 240).unwrap()
    }

    #[test]
    fn test_render_is_deterministic() {
        for g in [reference(), FaceGeometry::compute(128, 160).unwrap()] {
            for e in Expression::ALL {
                assert_eq!(render(e, &g), render(e, &g), "{} differs between calls", e);
            }
        }
    }

    #[test]
    fn test_every_expression_draws_something() {
        let g = reference();
        for e in Expression::ALL {
            assert!(!render(e, &g).is_empty(), "{} is empty", e);
        }
    }

    #[test]
    fn test_happy_recipe() {
        let prims = render(Expression::Happy, &reference());
        assert_eq!(
            prims,
            vec![
                DrawPrimitive::Ellipse { bbox: BBox::new(40, 60, 80, 100), fill: CYAN },
                DrawPrimitive::Ellipse { bbox: BBox::new(160, 60, 200, 100), fill: CYAN },
                DrawPrimitive::Arc {
                    bbox: BBox::new(80, 148, 160, 188),
                    start_deg: 0,
                    end_deg: 180,
                    color: YELLOW,
                    stroke: 6,
                },
            ]
        );
    }

    #[test]
    fn test_neutral_pupils_follow_eye_whites() {
        let prims = render(Expression::Neutral, &reference());
        assert_eq!(prims.len(), 5);
        assert_eq!(prims[0], DrawPrimitive::Ellipse { bbox: BBox::new(40, 60, 80, 100), fill: Rgb::WHITE });
        assert_eq!(prims[2], DrawPrimitive::Ellipse { bbox: BBox::new(50, 70, 70, 90), fill: Rgb::BLACK });
        assert_eq!(
            prims[4],
            DrawPrimitive::Line {
                p0: Point::new(80, 168),
                p1: Point::new(160, 168),
                color: PALE,
                stroke: 6,
            }
        );
    }

    #[test]
    fn test_sad_lids() {
        let prims = render(Expression::Sad, &reference());
        assert_eq!(
            prims[0],
            DrawPrimitive::Arc {
                bbox: BBox::new(40, 80, 80, 110),
                start_deg: 180,
                end_deg: 360,
                color: SOFT_BLUE,
                stroke: 6,
            }
        );
    }

    #[test]
    fn test_sleepy_has_two_zs_before_mouth() {
        let prims = render(Expression::Sleepy, &reference());
        let kinds: Vec<&str> = prims.iter().map(DrawPrimitive::kind).collect();
        assert_eq!(kinds, vec!["line", "line", "text", "text", "arc"]);
        assert_eq!(
            prims[2],
            DrawPrimitive::Text { pos: Point::new(180, 30), text: "Z".to_string(), color: Rgb::gray(150) }
        );
        match &prims[4] {
            DrawPrimitive::Arc { stroke, .. } => assert_eq!(*stroke, 4),
            other => panic!("expected arc, got {:?}", other),
        }
    }

    #[test]
    fn test_confused_right_eye_is_lower() {
        let prims = render(Expression::Confused, &reference());
        match (&prims[0], &prims[1]) {
            (DrawPrimitive::Ellipse { bbox: l, .. }, DrawPrimitive::Ellipse { bbox: r, .. }) => {
                assert_eq!(r.y0, l.y0 + 10);
            }
            other => panic!("unexpected primitives {:?}", other),
        }
        // 2 whites, 2 pupils, 3 zigzag segments
        assert_eq!(prims.len(), 7);
    }

    #[test]
    fn test_thinking_spiral_rings() {
        let prims = render(Expression::Thinking, &reference());
        // eye_radius 20 -> 10 rings per eye, plus two mouth strokes
        assert_eq!(prims.len(), 22);
        assert_eq!(
            prims[2],
            DrawPrimitive::Arc {
                bbox: BBox::around(60, 80, 2),
                start_deg: 72,
                end_deg: 144,
                color: SOFT_BLUE,
                stroke: 3,
            }
        );
    }

    #[test]
    fn test_small_canvas_stays_proportional() {
        let g = FaceGeometry::compute(120, 120).unwrap();
        let prims = render(Expression::Happy, &g);
        match &prims[2] {
            DrawPrimitive::Arc { bbox, .. } => {
                assert_eq!(bbox.y1 - bbox.y0, 20);
            }
            other => panic!("expected arc, got {:?}", other),
        }
    }
}
