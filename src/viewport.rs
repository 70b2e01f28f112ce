use macroquad::prelude::{vec2, Vec2};

/// Logical size of the drawing surface plus its device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub dpi: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, dpi: f32) -> Self {
        let sane = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        let dpi = if dpi.is_finite() && dpi > 0.0 { dpi } else { 1.0 };
        Self {
            width: sane(width),
            height: sane(height),
            dpi,
        }
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }

    /// Smaller of width and height, floored at 1 so nothing divides by zero
    /// before the surface has been sized.
    pub fn min_dim(&self) -> f32 {
        self.width.min(self.height).max(1.0)
    }

    pub fn max_dim(&self) -> f32 {
        self.width.max(self.height).max(1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Backing-store size in physical pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width * self.dpi).round() as u32,
            (self.height * self.dpi).round() as u32,
        )
    }

    /// Toroidal wrap with a margin outside each edge: leaving past one margin
    /// re-enters just outside the opposite edge.
    pub fn wrap(&self, mut pos: Vec2, margin: f32) -> Vec2 {
        if pos.x < -margin {
            pos.x = self.width + margin;
        } else if pos.x > self.width + margin {
            pos.x = -margin;
        }
        if pos.y < -margin {
            pos.y = self.height + margin;
        } else if pos.y > self.height + margin {
            pos.y = -margin;
        }
        pos
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}
