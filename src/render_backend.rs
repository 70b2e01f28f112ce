use std::f32::consts::TAU;

use macroquad::models::{draw_mesh, Mesh, Vertex};
use macroquad::prelude::*;

use crate::canvas::{sample_gradient, Canvas, GradientStop};

/// u16 indices cap a mesh at this many vertices.
const MAX_MESH_VERTICES: usize = u16::MAX as usize - 4;

/// `Canvas` backed by macroquad's immediate-mode drawing. Gradients are built
/// as meshes with per-vertex colors so the GPU interpolates between stops.
pub struct MacroquadCanvas {
    mesh: MeshBuilder,
}

impl MacroquadCanvas {
    pub fn new() -> Self {
        Self {
            mesh: MeshBuilder::default(),
        }
    }
}

impl Default for MacroquadCanvas {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
}

impl MeshBuilder {
    fn reserve(&mut self, vertices: usize) {
        if self.vertices.len() + vertices > MAX_MESH_VERTICES {
            self.flush();
        }
    }

    fn vertex(&mut self, p: Vec2, color: Color) -> u16 {
        let idx = self.vertices.len() as u16;
        self.vertices.push(Vertex::new(p.x, p.y, 0.0, 0.0, 0.0, color));
        idx
    }

    fn quad(&mut self, a: u16, b: u16, c: u16, d: u16) {
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    /// Strip of paired vertices: each (near, far) pair joins the previous one
    /// with a quad.
    fn strip(&mut self, pairs: &[(Vec2, Color, Vec2, Color)]) {
        if pairs.len() < 2 {
            return;
        }
        self.reserve(pairs.len() * 2);
        let mut prev: Option<(u16, u16)> = None;
        for &(near, near_color, far, far_color) in pairs {
            let a = self.vertex(near, near_color);
            let b = self.vertex(far, far_color);
            if let Some((pa, pb)) = prev {
                self.quad(pa, pb, b, a);
            }
            prev = Some((a, b));
        }
    }

    fn flush(&mut self) {
        if self.indices.is_empty() {
            self.vertices.clear();
            return;
        }
        let mesh = Mesh {
            vertices: std::mem::take(&mut self.vertices),
            indices: std::mem::take(&mut self.indices),
            texture: None,
        };
        draw_mesh(&mesh);
    }
}

fn segments_for(radius: f32, sweep: f32) -> usize {
    ((radius * sweep.abs() * 0.25) as usize).clamp(12, 160)
}

/// Stop offsets as radii/positions, with the 0 and 1 ends always present.
fn stop_positions(stops: &[GradientStop]) -> Vec<f32> {
    let mut offsets: Vec<f32> = stops
        .iter()
        .map(|s| s.offset)
        .filter(|o| *o > 0.0 && *o < 1.0)
        .collect();
    offsets.insert(0, 0.0);
    offsets.push(1.0);
    offsets.dedup();
    offsets
}

impl Canvas for MacroquadCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if rect.w <= 0.0 || rect.h <= 0.0 || color.a <= 0.0 {
            return;
        }
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, color);
    }

    fn fill_radial_gradient(&mut self, center: Vec2, inner: f32, outer: f32, stops: &[GradientStop]) {
        if !(outer > 0.0) || stops.is_empty() {
            return;
        }
        let inner = inner.clamp(0.0, outer);
        let segments = segments_for(outer, TAU);

        let first = sample_gradient(stops, 0.0);
        if inner > 0.0 && first.a > 0.0 {
            self.fill_circle(center, inner, first);
        }

        let offsets = stop_positions(stops);
        for band in offsets.windows(2) {
            let (t0, t1) = (band[0], band[1]);
            let (c0, c1) = (sample_gradient(stops, t0), sample_gradient(stops, t1));
            if c0.a <= 0.0 && c1.a <= 0.0 {
                continue;
            }
            let r0 = inner + (outer - inner) * t0;
            let r1 = inner + (outer - inner) * t1;
            let pairs: Vec<_> = (0..=segments)
                .map(|i| {
                    let dir = Vec2::from_angle(i as f32 / segments as f32 * TAU);
                    (center + dir * r0, c0, center + dir * r1, c1)
                })
                .collect();
            self.mesh.strip(&pairs);
        }
        self.mesh.flush();
    }

    fn fill_horizontal_gradient(&mut self, rect: Rect, x0: f32, x1: f32, stops: &[GradientStop]) {
        if rect.w <= 0.0 || rect.h <= 0.0 || stops.is_empty() {
            return;
        }
        let span = x1 - x0;
        if !(span.abs() > f32::EPSILON) {
            return;
        }
        let left = rect.x;
        let right = rect.x + rect.w;

        let mut xs: Vec<f32> = stop_positions(stops)
            .into_iter()
            .map(|t| x0 + span * t)
            .filter(|x| *x > left && *x < right)
            .collect();
        xs.insert(0, left);
        xs.push(right);
        xs.sort_by(|a, b| a.total_cmp(b));
        xs.dedup();

        let pairs: Vec<_> = xs
            .iter()
            .map(|&x| {
                let color = sample_gradient(stops, (x - x0) / span);
                (vec2(x, rect.y), color, vec2(x, rect.y + rect.h), color)
            })
            .collect();
        self.mesh.strip(&pairs);
        self.mesh.flush();
    }

    fn stroke_gradient_line(&mut self, from: Vec2, to: Vec2, width: f32, stops: &[GradientStop]) {
        let along = to - from;
        if along.length_squared() <= f32::EPSILON || width <= 0.0 || stops.is_empty() {
            return;
        }
        let normal = along.perp().normalize() * (width * 0.5);
        let pairs: Vec<_> = stop_positions(stops)
            .into_iter()
            .map(|t| {
                let p = from + along * t;
                let color = sample_gradient(stops, t);
                (p - normal, color, p + normal, color)
            })
            .collect();
        self.mesh.strip(&pairs);
        self.mesh.flush();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        if width <= 0.0 || color.a <= 0.0 {
            return;
        }
        draw_line(from.x, from.y, to.x, to.y, width, color);
    }

    fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, width: f32, color: Color) {
        if !(radius > 0.0) || width <= 0.0 || color.a <= 0.0 {
            return;
        }
        let sweep = end - start;
        let segments = segments_for(radius, sweep);
        let r0 = (radius - width * 0.5).max(0.0);
        let r1 = radius + width * 0.5;
        let pairs: Vec<_> = (0..=segments)
            .map(|i| {
                let dir = Vec2::from_angle(start + sweep * i as f32 / segments as f32);
                (center + dir * r0, color, center + dir * r1, color)
            })
            .collect();
        self.mesh.strip(&pairs);
        self.mesh.flush();
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        if !(radius > 0.0) || width <= 0.0 || color.a <= 0.0 {
            return;
        }
        draw_circle_lines(center.x, center.y, radius, width, color);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if !(radius > 0.0) || color.a <= 0.0 {
            return;
        }
        draw_circle(center.x, center.y, radius, color);
    }
}
