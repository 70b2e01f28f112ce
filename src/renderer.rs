use std::f32::consts::{PI, TAU};

use macroquad::prelude::{vec2, Rect, Vec2};

use crate::canvas::{stop, Canvas, GradientStop};
use crate::color::Rgb;
use crate::config::OrganismConfig;
use crate::organism::Organism;
use crate::particles::{ParticleKind, Species};
use crate::snapshot::NetworkSnapshot;

/// Geometry shared by every layer of one frame.
struct FrameGeometry {
    width: f32,
    height: f32,
    center: Vec2,
    min_dim: f32,
    max_dim: f32,
}

/// Paint one frame. Layers run in a fixed order, each over the last.
pub fn draw(canvas: &mut impl Canvas, org: &Organism) {
    if !canvas.is_ready() {
        return;
    }
    let geo = FrameGeometry {
        width: org.viewport.width,
        height: org.viewport.height,
        center: org.viewport.center(),
        min_dim: org.viewport.min_dim(),
        max_dim: org.viewport.max_dim(),
    };
    let config = &org.config;

    draw_deep_space(canvas, &geo, config);

    let Some(data) = org.data.as_ref() else {
        draw_loading(canvas, &geo, org.frame, config);
        return;
    };

    let temp = temperature_color(data.price_change_24h, config);

    draw_nebula(canvas, &geo, org, temp);
    draw_orbit_structure(canvas, &geo, org, data, temp);
    draw_dots(canvas, org, Species::Ambient, config.palette.teal);
    draw_dots(canvas, org, Species::Flow, temp);
    draw_energy_beams(canvas, &geo, org, temp);
    draw_dots(canvas, org, Species::Orbit, config.palette.accent1);
    draw_core(canvas, &geo, org, data, temp);
    draw_shockwaves(canvas, &geo, org, temp);
    draw_burst_particles(canvas, org);
    draw_shimmer(canvas, &geo, org);
}

/// Fraction (0..1) of the way toward the hot or cool color.
pub fn temperature_factor(price_change: f64, cap: f32) -> f32 {
    if price_change.is_nan() {
        return 0.0;
    }
    let magnitude = price_change.abs() as f32;
    if cap <= 0.0 {
        return if magnitude > 0.0 { 1.0 } else { 0.0 };
    }
    (magnitude / cap).min(1.0)
}

/// Teal drifting toward gold on gains and toward blue on losses.
pub fn temperature_color(price_change: f64, config: &OrganismConfig) -> Rgb {
    let palette = &config.palette;
    let t = temperature_factor(price_change, config.physics.price_change_cap);
    if price_change > 0.0 {
        palette.teal.lerp(palette.gold, t)
    } else {
        palette.teal.lerp(palette.blue, t)
    }
}

/// Ring radius multiplier: pool above target expands, below contracts.
pub fn squeeze_factor(data: &NetworkSnapshot, config: &OrganismConfig) -> f32 {
    let target = data.ticket_pool_target;
    let ratio = data.ticket_pool_size / target;
    if !(target > 0.0) || !ratio.is_finite() {
        return 1.0;
    }
    (1.0 + (ratio as f32 - 1.0) * config.rings.squeeze_gain).max(0.0)
}

pub fn ring_radius(ring: usize, min_dim: f32, squeeze: f32, config: &OrganismConfig) -> f32 {
    let fraction = config.rings.radius_fraction.get(ring).copied().unwrap_or(0.0);
    min_dim * fraction * squeeze
}

/// Treasury balance against its reference, clamped to 0..1.
pub fn treasury_health(data: &NetworkSnapshot, config: &OrganismConfig) -> f32 {
    let health = (data.treasury_balance / config.core.treasury_reference as f64) as f32;
    if health.is_nan() {
        0.0
    } else {
        health.clamp(0.0, 1.0)
    }
}

/// Radial fill with the extent sanitised; degenerate gradients are skipped.
fn radial(canvas: &mut impl Canvas, center: Vec2, inner: f32, outer: f32, stops: &[GradientStop]) {
    if !(outer > 0.0) || !center.is_finite() {
        return;
    }
    let inner = if inner.is_finite() { inner.clamp(0.0, outer) } else { 0.0 };
    canvas.fill_radial_gradient(center, inner, outer, stops);
}

fn draw_deep_space(canvas: &mut impl Canvas, geo: &FrameGeometry, config: &OrganismConfig) {
    let palette = &config.palette;
    canvas.fill_rect(
        Rect::new(0.0, 0.0, geo.width, geo.height),
        palette.space_outer.rgba(1.0),
    );
    radial(
        canvas,
        geo.center,
        0.0,
        geo.max_dim * 0.7,
        &[
            stop(0.0, palette.space_inner.rgba(1.0)),
            stop(0.4, palette.space_mid.rgba(1.0)),
            stop(1.0, palette.space_outer.rgba(1.0)),
        ],
    );
}

fn draw_loading(canvas: &mut impl Canvas, geo: &FrameGeometry, frame: u64, config: &OrganismConfig) {
    let palette = &config.palette;
    let frame = frame as f32;
    let pulse = (frame * 0.04).sin() * 0.3 + 0.7;

    canvas.stroke_circle(geo.center, 40.0, 2.0, palette.teal.rgba(pulse * 0.2));

    let start = frame * 0.03;
    canvas.stroke_arc(geo.center, 40.0, start, start + PI * 0.8, 2.0, palette.accent1.rgba(pulse * 0.6));

    canvas.fill_circle(geo.center, 4.0, palette.accent1.rgba(pulse));
}

struct NebulaBlob {
    offset: Vec2,
    radius: f32,
    alpha: f32,
}

fn draw_nebula(canvas: &mut impl Canvas, geo: &FrameGeometry, org: &Organism, temp: Rgb) {
    let palette = &org.config.palette;
    let breathe = (org.phases.pulse * 0.15).sin() * 0.3 + 0.7;
    let drift = org.frame as f32 * org.config.timing.nebula_rotation;

    let blobs = [
        (NebulaBlob { offset: vec2(-0.12, -0.08), radius: 0.55, alpha: 0.45 }, temp),
        (NebulaBlob { offset: vec2(0.15, 0.10), radius: 0.45, alpha: 0.30 }, palette.cyan),
        (NebulaBlob { offset: vec2(-0.08, 0.15), radius: 0.40, alpha: 0.22 }, palette.purple),
        (NebulaBlob { offset: vec2(0.10, -0.12), radius: 0.35, alpha: 0.18 }, palette.blue),
    ];

    for (blob, color) in blobs {
        let wobble = vec2(
            (drift + blob.offset.x * 10.0).sin(),
            (drift + blob.offset.y * 10.0).cos(),
        ) * 20.0;
        let at = geo.center + blob.offset * geo.min_dim + wobble;
        let a = blob.alpha * breathe;
        radial(
            canvas,
            at,
            0.0,
            geo.min_dim * blob.radius,
            &[
                stop(0.0, color.rgba(a)),
                stop(0.5, color.rgba(a * 0.4)),
                stop(1.0, color.transparent()),
            ],
        );
    }
}

fn draw_orbit_structure(
    canvas: &mut impl Canvas,
    geo: &FrameGeometry,
    org: &Organism,
    data: &NetworkSnapshot,
    temp: Rgb,
) {
    let config = &org.config;
    let rings = &config.rings;
    let squeeze = squeeze_factor(data, config);
    let gap = rings.arc_gap;
    let c = geo.center;

    for i in 0..rings.count {
        let base_r = ring_radius(i, geo.min_dim, squeeze, config);
        let rot = org.phases.ring_angles.get(i).copied().unwrap_or(0.0);
        let stroke_alpha = rings.stroke_alpha.get(i).copied().unwrap_or(0.5);
        let stroke_width = rings.stroke_width.get(i).copied().unwrap_or(2.0);
        let a = stroke_alpha + (org.phases.pulse + i as f32 * 1.2).sin() * 0.08;

        // Glow band; the innermost ring gets the widest.
        let band = 20.0 + rings.count.saturating_sub(1 + i) as f32 * 10.0;
        radial(
            canvas,
            c,
            base_r - band,
            base_r + band,
            &[
                stop(0.0, temp.transparent()),
                stop(0.3, temp.rgba(a * 0.20)),
                stop(0.5, temp.rgba(a * 0.40)),
                stop(0.7, temp.rgba(a * 0.20)),
                stop(1.0, temp.transparent()),
            ],
        );

        let (start, end) = (rot + gap, rot + TAU - gap * 0.3);
        canvas.stroke_arc(c, base_r, start, end, stroke_width + 20.0, temp.rgba(a * 0.4));
        canvas.stroke_arc(c, base_r, start, end, stroke_width, temp.rgba(a));

        canvas.stroke_arc(
            c,
            base_r,
            rot + PI + gap * 0.5,
            rot + TAU - gap,
            stroke_width * 0.7,
            config.palette.accent1.rgba(a * 0.5),
        );

        let ticks = 12 + i * 4;
        let inner = base_r - 4.0 - i as f32 * 2.0;
        let outer = base_r + 4.0 + i as f32 * 2.0;
        let tick_color = temp.rgba(a * 0.15);
        for t in 0..ticks {
            let dir = Vec2::from_angle(rot + t as f32 / ticks as f32 * TAU);
            canvas.stroke_line(c + dir * inner, c + dir * outer, 0.5, tick_color);
        }
    }
}

fn draw_dots(canvas: &mut impl Canvas, org: &Organism, species: Species, color: Rgb) {
    let halo = species == Species::Orbit;
    for p in org.particles.of_species(species) {
        canvas.fill_circle(p.pos, p.size, color.rgba(p.alpha));
        if halo && p.alpha > 0.25 {
            canvas.fill_circle(p.pos, p.size * 5.0, color.rgba(p.alpha * 0.15));
        }
    }
}

fn draw_energy_beams(canvas: &mut impl Canvas, geo: &FrameGeometry, org: &Organism, temp: Rgb) {
    let config = &org.config;
    let beams = &config.beams;
    let accent = config.palette.accent1;
    let reach = geo.min_dim * config.rings.outer_fraction() * 1.1;
    let count = beams.count.max(1);

    for i in 0..beams.count {
        let angle = org.phases.beam_angle + i as f32 * TAU / count as f32;
        let tip = geo.center + Vec2::from_angle(angle) * reach;

        canvas.stroke_gradient_line(
            geo.center,
            tip,
            beams.width,
            &[
                stop(0.0, temp.rgba(0.02)),
                stop(0.3, temp.rgba(beams.alpha)),
                stop(0.7, accent.rgba(beams.alpha * 0.6)),
                stop(1.0, temp.transparent()),
            ],
        );

        let glow = 0.3 + (org.frame as f32 * 0.05 + i as f32).sin() * 0.15;
        canvas.fill_circle(tip, 4.0, accent.rgba(glow));
    }
}

fn draw_core(
    canvas: &mut impl Canvas,
    geo: &FrameGeometry,
    org: &Organism,
    data: &NetworkSnapshot,
    temp: Rgb,
) {
    let config = &org.config;
    let palette = &config.palette;
    let core = &config.core;
    let c = geo.center;

    let health = treasury_health(data, config);
    let size = geo.min_dim * core.base_size_fraction * (0.5 + health * 0.8);
    let heartbeat = org.phases.pulse.sin() * 0.5 + 0.5;
    let r = size * (1.0 + heartbeat * core.heartbeat_depth);

    let layers = core.glow_layers;
    for i in (1..=layers).rev() {
        let glow_r = r * (1.0 + i as f32 * 1.2);
        let glow_a = (0.10 + health * 0.12) * (1.0 - i as f32 / (layers + 1) as f32);
        radial(
            canvas,
            c,
            0.0,
            glow_r,
            &[
                stop(0.0, temp.rgba(glow_a * 1.5)),
                stop(0.4, temp.rgba(glow_a)),
                stop(1.0, temp.transparent()),
            ],
        );
    }

    radial(
        canvas,
        c,
        0.0,
        r,
        &[
            stop(0.0, palette.white.rgba(0.9 + heartbeat * 0.1)),
            stop(0.2, palette.accent1.rgba(0.7 + heartbeat * 0.2)),
            stop(0.5, temp.rgba(0.4 + heartbeat * 0.15)),
            stop(0.8, temp.rgba(0.12)),
            stop(1.0, temp.transparent()),
        ],
    );

    canvas.fill_circle(c, r * 0.15, palette.white.rgba(0.95));
    canvas.stroke_circle(c, r * 0.6, 1.0, palette.accent1.rgba(0.15 + heartbeat * 0.1));
}

fn draw_shockwaves(canvas: &mut impl Canvas, geo: &FrameGeometry, org: &Organism, temp: Rgb) {
    let accent = org.config.palette.accent1;
    for sw in &org.shockwaves {
        canvas.stroke_circle(geo.center, sw.radius, sw.line_width, temp.rgba(sw.alpha));
        canvas.stroke_circle(geo.center, sw.radius, sw.line_width + 4.0, accent.rgba(sw.alpha * 0.3));
    }
}

fn draw_burst_particles(canvas: &mut impl Canvas, org: &Organism) {
    for p in org.particles.of_species(Species::Burst) {
        let ParticleKind::Burst { color } = p.kind else {
            continue;
        };
        canvas.fill_circle(p.pos, p.size, color.rgba(p.alpha));
        canvas.fill_circle(p.pos, p.size * 4.0, color.rgba(p.alpha * 0.2));
    }
}

fn draw_shimmer(canvas: &mut impl Canvas, geo: &FrameGeometry, org: &Organism) {
    let Some(t) = org.phases.shimmer else {
        return;
    };
    let palette = &org.config.palette;
    let alpha = org.config.timing.sweep_alpha;
    let band = geo.width * 0.15;
    let x = -band + t * (geo.width + band * 2.0);

    canvas.fill_horizontal_gradient(
        Rect::new(0.0, 0.0, geo.width, geo.height),
        x - band,
        x + band,
        &[
            stop(0.0, palette.accent1.transparent()),
            stop(0.4, palette.accent1.rgba(alpha)),
            stop(0.5, palette.white.rgba(alpha * 1.5)),
            stop(0.6, palette.accent1.rgba(alpha)),
            stop(1.0, palette.accent1.transparent()),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::recording::{DrawOp, RecordingCanvas};
    use crate::viewport::Viewport;

    fn organism(viewport: Viewport) -> Organism {
        Organism::new(OrganismConfig::default(), viewport, 9)
    }

    #[test]
    fn temperature_factor_clamps_at_cap() {
        assert_eq!(temperature_factor(20.0, 10.0), 1.0);
        assert_eq!(temperature_factor(-35.0, 10.0), 1.0);
        assert!((temperature_factor(5.0, 10.0) - 0.5).abs() < 1e-6);
        assert_eq!(temperature_factor(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn temperature_color_runs_hot_and_cool() {
        let config = OrganismConfig::default();
        let p = &config.palette;
        assert_eq!(temperature_color(20.0, &config), p.gold);
        assert_eq!(temperature_color(-20.0, &config), p.blue);
        assert_eq!(temperature_color(0.0, &config), p.teal);
    }

    #[test]
    fn squeeze_at_double_target_is_one_and_a_half() {
        let config = OrganismConfig::default();
        let data = NetworkSnapshot {
            ticket_pool_size: 81_920.0,
            ticket_pool_target: 40_960.0,
            ..NetworkSnapshot::fallback()
        };
        let squeeze = squeeze_factor(&data, &config);
        assert!((squeeze - 1.5).abs() < 1e-6);
        let r = ring_radius(1, 600.0, squeeze, &config);
        assert!((r - 600.0 * 0.28 * 1.5).abs() < 1e-3);
    }

    #[test]
    fn squeeze_tolerates_missing_target() {
        let config = OrganismConfig::default();
        let data = NetworkSnapshot {
            ticket_pool_target: 0.0,
            ..NetworkSnapshot::fallback()
        };
        assert_eq!(squeeze_factor(&data, &config), 1.0);
    }

    #[test]
    fn treasury_health_is_clamped() {
        let config = OrganismConfig::default();
        let mut data = NetworkSnapshot::fallback();
        data.treasury_balance = 5_000_000.0;
        assert_eq!(treasury_health(&data, &config), 1.0);
        data.treasury_balance = -10.0;
        assert_eq!(treasury_health(&data, &config), 0.0);
        data.treasury_balance = f64::NAN;
        assert_eq!(treasury_health(&data, &config), 0.0);
        data.treasury_balance = 500_000.0;
        assert!((treasury_health(&data, &config) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn loading_state_stops_after_indicator() {
        let org = organism(Viewport::new(800.0, 600.0, 1.0));
        let mut canvas = RecordingCanvas::new();
        draw(&mut canvas, &org);

        assert!(matches!(canvas.ops[0], DrawOp::Rect { .. }));
        assert!(matches!(canvas.ops[1], DrawOp::Radial { .. }));
        assert!(matches!(canvas.ops[2], DrawOp::Ring { radius, .. } if radius == 40.0));
        assert!(matches!(canvas.ops[3], DrawOp::Arc { .. }));
        assert!(matches!(canvas.ops[4], DrawOp::Disc { radius, .. } if radius == 4.0));
        assert_eq!(canvas.ops.len(), 5);
    }

    #[test]
    fn unavailable_surface_drops_frame() {
        let mut org = organism(Viewport::new(800.0, 600.0, 1.0));
        org.set_data(NetworkSnapshot::fallback());
        let mut canvas = RecordingCanvas { unavailable: true, ..RecordingCanvas::new() };
        draw(&mut canvas, &org);
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn zero_viewport_draws_without_degenerate_gradients() {
        let mut org = organism(Viewport::default());
        org.set_data(NetworkSnapshot::fallback());
        for _ in 0..5 {
            org.update();
        }
        let mut canvas = RecordingCanvas::new();
        draw(&mut canvas, &org);
        assert!(!canvas.ops.is_empty());
        for (inner, outer) in canvas.radials() {
            assert!(inner.is_finite() && outer.is_finite());
            assert!(0.0 <= inner && inner <= outer);
        }
    }

    #[test]
    fn band_gradients_never_invert() {
        let mut org = organism(Viewport::new(120.0, 90.0, 1.0));
        org.set_data(NetworkSnapshot {
            ticket_pool_size: 1.0,
            ..NetworkSnapshot::fallback()
        });
        let mut canvas = RecordingCanvas::new();
        draw(&mut canvas, &org);
        for (inner, outer) in canvas.radials() {
            assert!(0.0 <= inner && inner <= outer);
        }
    }

    #[test]
    fn ring_layer_draws_ticks_per_ring() {
        let mut org = organism(Viewport::new(800.0, 600.0, 1.0));
        org.set_data(NetworkSnapshot::fallback());
        let mut canvas = RecordingCanvas::new();
        draw(&mut canvas, &org);
        let ticks = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { width, .. } if *width == 0.5))
            .count();
        assert_eq!(ticks, 12 + 16 + 20);
        let arcs = canvas.ops.iter().filter(|op| matches!(op, DrawOp::Arc { .. })).count();
        assert_eq!(arcs, 3 * 3);
    }

    #[test]
    fn bursts_and_shimmer_paint_last() {
        let mut org = organism(Viewport::new(800.0, 600.0, 1.0));
        org.set_data(NetworkSnapshot::fallback());
        org.update();
        let mut next = NetworkSnapshot::fallback();
        next.block_height += 1;
        org.set_data(next);
        // Frame 0 starts a sweep.
        assert!(org.phases.shimmer.is_some());

        let mut canvas = RecordingCanvas::new();
        draw(&mut canvas, &org);

        assert!(matches!(canvas.ops.last(), Some(DrawOp::Horizontal { .. })));
        let last_ring = canvas
            .ops
            .iter()
            .rposition(|op| matches!(op, DrawOp::Ring { .. }))
            .unwrap();
        let tail = &canvas.ops[last_ring + 1..canvas.ops.len() - 1];
        // A dot and a halo per burst particle, after the shockwaves.
        assert_eq!(tail.len(), 2 * 20);
        assert!(tail.iter().all(|op| matches!(op, DrawOp::Disc { .. })));
    }
}
