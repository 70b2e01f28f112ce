use macroquad::prelude::{Color, Rect, Vec2};

/// Color at a normalised position along a gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

pub const fn stop(offset: f32, color: Color) -> GradientStop {
    GradientStop { offset, color }
}

/// Sample a stop list at `t` (0..1), clamping past either end.
pub fn sample_gradient(stops: &[GradientStop], t: f32) -> Color {
    let Some(first) = stops.first() else {
        return Color::new(0.0, 0.0, 0.0, 0.0);
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let k = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return lerp_color(a.color, b.color, k);
        }
    }
    stops[stops.len() - 1].color
}

fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    Color::new(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
        a.a + (b.a - a.a) * t,
    )
}

/// The 2D drawing surface the render pipeline paints on. Coordinates are
/// logical pixels; blending is standard source-over alpha.
pub trait Canvas {
    /// False while no drawing context is available; the frame is dropped.
    fn is_ready(&self) -> bool {
        true
    }

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Disc of radius `outer` shaded from `inner` (offset 0) to `outer`
    /// (offset 1). Callers guarantee `0 <= inner <= outer`.
    fn fill_radial_gradient(&mut self, center: Vec2, inner: f32, outer: f32, stops: &[GradientStop]);

    /// Fill `rect` with a gradient running along x from `x0` to `x1`.
    fn fill_horizontal_gradient(&mut self, rect: Rect, x0: f32, x1: f32, stops: &[GradientStop]);

    /// Line whose color follows `stops` from `from` to `to`.
    fn stroke_gradient_line(&mut self, from: Vec2, to: Vec2, width: f32, stops: &[GradientStop]);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);

    /// Arc from `start` to `end` radians, clockwise in screen space.
    fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, width: f32, color: Color);

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
}

/// Canvas that records every call; lets tests inspect what a frame painted.
#[cfg(test)]
pub mod recording {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum DrawOp {
        Rect { rect: Rect, color: Color },
        Radial { center: Vec2, inner: f32, outer: f32, stops: Vec<GradientStop> },
        Horizontal { rect: Rect, x0: f32, x1: f32, stops: Vec<GradientStop> },
        GradientLine { from: Vec2, to: Vec2, width: f32 },
        Line { from: Vec2, to: Vec2, width: f32, color: Color },
        Arc { center: Vec2, radius: f32, start: f32, end: f32, width: f32, color: Color },
        Ring { center: Vec2, radius: f32, width: f32, color: Color },
        Disc { center: Vec2, radius: f32, color: Color },
    }

    #[derive(Default)]
    pub struct RecordingCanvas {
        pub ops: Vec<DrawOp>,
        pub unavailable: bool,
    }

    impl RecordingCanvas {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn discs(&self) -> impl Iterator<Item = (&Vec2, &f32, &Color)> + '_ {
            self.ops.iter().filter_map(|op| match op {
                DrawOp::Disc { center, radius, color } => Some((center, radius, color)),
                _ => None,
            })
        }

        pub fn radials(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
            self.ops.iter().filter_map(|op| match op {
                DrawOp::Radial { inner, outer, .. } => Some((*inner, *outer)),
                _ => None,
            })
        }
    }

    impl Canvas for RecordingCanvas {
        fn is_ready(&self) -> bool {
            !self.unavailable
        }

        fn fill_rect(&mut self, rect: Rect, color: Color) {
            self.ops.push(DrawOp::Rect { rect, color });
        }

        fn fill_radial_gradient(&mut self, center: Vec2, inner: f32, outer: f32, stops: &[GradientStop]) {
            self.ops.push(DrawOp::Radial { center, inner, outer, stops: stops.to_vec() });
        }

        fn fill_horizontal_gradient(&mut self, rect: Rect, x0: f32, x1: f32, stops: &[GradientStop]) {
            self.ops.push(DrawOp::Horizontal { rect, x0, x1, stops: stops.to_vec() });
        }

        fn stroke_gradient_line(&mut self, from: Vec2, to: Vec2, width: f32, _stops: &[GradientStop]) {
            self.ops.push(DrawOp::GradientLine { from, to, width });
        }

        fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
            self.ops.push(DrawOp::Line { from, to, width, color });
        }

        fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, width: f32, color: Color) {
            self.ops.push(DrawOp::Arc { center, radius, start, end, width, color });
        }

        fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
            self.ops.push(DrawOp::Ring { center, radius, width, color });
        }

        fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
            self.ops.push(DrawOp::Disc { center, radius, color });
        }
    }
}
