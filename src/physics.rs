use std::f32::consts::TAU;

use macroquad::prelude::Vec2;

use crate::config::OrganismConfig;
use crate::events::Shockwave;
use crate::particles::{Particle, ParticleKind, ParticleStore};
use crate::viewport::Viewport;

/// Frames per second the per-frame constants were tuned for.
const NOMINAL_FPS: f32 = 60.0;
/// Shimmer progress past which the sweep has left the screen.
const SHIMMER_END: f32 = 1.5;
const FLOW_ANGULAR_DRIFT: f32 = 0.008;

/// Aggregate animation phases advanced once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Phases {
    /// Heartbeat phase, radians.
    pub pulse: f32,
    pub ring_angles: Vec<f32>,
    pub beam_angle: f32,
    /// Sweep progress 0..1.5 while a shimmer crosses the screen.
    pub shimmer: Option<f32>,
}

impl Phases {
    pub fn new(ring_count: usize) -> Self {
        Self {
            pulse: 0.0,
            ring_angles: vec![0.0; ring_count],
            beam_angle: 0.0,
            shimmer: None,
        }
    }

    pub fn advance(&mut self, frame: u64, config: &OrganismConfig) {
        let beats_per_second = config.core.heartbeat_bpm / 60.0;
        self.pulse += TAU * beats_per_second / NOMINAL_FPS;

        for (angle, speed) in self.ring_angles.iter_mut().zip(&config.rings.rotation_speed) {
            *angle += speed;
        }
        self.beam_angle += config.beams.rotation_speed;

        let timing = &config.timing;
        if self.shimmer.is_none() && frame % timing.shimmer_interval.max(1) == 0 {
            self.shimmer = Some(0.0);
        }
        if let Some(progress) = self.shimmer {
            let next = progress + timing.shimmer_speed;
            self.shimmer = (next <= SHIMMER_END).then_some(next);
        }
    }
}

/// Grow, fade and prune shockwaves.
pub fn update_shockwaves(shockwaves: &mut Vec<Shockwave>, config: &OrganismConfig) {
    let cfg = &config.shockwaves;
    for sw in shockwaves.iter_mut() {
        sw.radius += sw.speed;
        sw.alpha *= cfg.decay;
    }
    shockwaves.retain(|sw| sw.alpha > cfg.prune_alpha);
}

/// Advance every particle one frame and remove the dead.
///
/// `pointer` is `None` when the cursor is parked off-screen.
pub fn step_particles(
    store: &mut ParticleStore,
    viewport: &Viewport,
    pointer: Option<Vec2>,
    config: &OrganismConfig,
) {
    let center = viewport.center();
    let min_dim = viewport.min_dim();

    store.retain_mut(|p| {
        p.life += 1.0;

        if !integrate(p, center, min_dim, viewport, config) {
            return false;
        }

        if let Some(pointer) = pointer {
            apply_pointer(p, pointer, config);
        }

        !p.expired()
    });
}

/// Kind-specific kinematics. Returns false when the particle dies early.
fn integrate(
    p: &mut Particle,
    center: Vec2,
    min_dim: f32,
    viewport: &Viewport,
    config: &OrganismConfig,
) -> bool {
    let phys = &config.physics;
    match &mut p.kind {
        ParticleKind::Orbit { angle, radius, speed, .. } => {
            *angle += *speed;
            p.pos = center + Vec2::from_angle(*angle) * *radius;
            p.alpha = 0.45 + (p.life * 0.018 + *angle * 3.0).sin() * 0.3;
        }
        ParticleKind::Flow { angle, radius, speed } => {
            *radius -= *speed;
            *angle += FLOW_ANGULAR_DRIFT;
            p.pos = center + Vec2::from_angle(*angle) * *radius;
            let fade_in = (p.life / phys.flow_fade_in_frames).min(1.0);
            p.alpha = fade_in * 0.65 * (*radius / (min_dim * 0.3)).max(0.15);
            if *radius < phys.flow_death_radius {
                return false;
            }
        }
        ParticleKind::Ambient => {
            p.pos += p.velocity;
            p.alpha = 0.06 + (p.life * 0.008).sin() * 0.08;
            p.pos = viewport.wrap(p.pos, phys.wrap_margin);
        }
        ParticleKind::Burst { .. } => {
            p.pos += p.velocity;
            p.velocity *= phys.burst_drag;
            p.alpha = match p.max_life {
                Some(max) if max > 0.0 => (1.0 - p.life / max).max(0.0),
                _ => 0.0,
            };
        }
    }
    true
}

/// Orbit and flow particles near the pointer brighten; orbit ones also get
/// pushed outward. Runs after integration so it adds to the base alpha.
fn apply_pointer(p: &mut Particle, pointer: Vec2, config: &OrganismConfig) {
    let phys = &config.physics;
    let reach = phys.pointer_radius;
    if !matches!(p.kind, ParticleKind::Orbit { .. } | ParticleKind::Flow { .. }) {
        return;
    }

    let dist = p.pos.distance(pointer);
    if dist >= reach {
        return;
    }
    let force = (reach - dist) / reach;
    p.alpha = (p.alpha + force * phys.pointer_alpha_boost).min(1.0);

    if let ParticleKind::Orbit { radius, .. } = &mut p.kind {
        *radius += force * phys.pointer_push;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::particles::Species;
    use macroquad::prelude::vec2;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0, 1.0)
    }

    fn flow(radius: f32, speed: f32) -> Particle {
        Particle {
            pos: vec2(0.0, 0.0),
            velocity: Vec2::ZERO,
            size: 1.0,
            alpha: 0.5,
            life: 0.0,
            max_life: Some(10_000.0),
            kind: ParticleKind::Flow { angle: 0.0, radius, speed },
        }
    }

    fn flow_radius(store: &ParticleStore) -> Option<f32> {
        store.iter().find_map(|p| match p.kind {
            ParticleKind::Flow { radius, .. } => Some(radius),
            _ => None,
        })
    }

    #[test]
    fn flow_radius_shrinks_until_removed() {
        let config = OrganismConfig::default();
        let mut store = ParticleStore::new();
        store.push(flow(40.0, 2.0));

        let mut last = 40.0;
        let mut frames = 0;
        while let Some(r) = flow_radius(&store) {
            step_particles(&mut store, &viewport(), None, &config);
            frames += 1;
            if let Some(next) = flow_radius(&store) {
                assert!((last - next - 2.0).abs() < 1e-4);
                assert!(next >= config.physics.flow_death_radius);
                last = next;
            }
            assert!(r > 0.0);
            assert!(frames < 100);
        }
        // 40 -> 14 after 13 frames
        assert_eq!(frames, 13);
        assert_eq!(store.count(Species::Flow), 0);
    }

    #[test]
    fn flow_alpha_fades_in() {
        let config = OrganismConfig::default();
        let mut store = ParticleStore::new();
        store.push(flow(200.0, 0.1));
        step_particles(&mut store, &viewport(), None, &config);
        let first = store.iter().next().unwrap().alpha;
        for _ in 0..30 {
            step_particles(&mut store, &viewport(), None, &config);
        }
        let later = store.iter().next().unwrap().alpha;
        assert!(first < later);
        assert!(later <= 0.65 * 200.0 / 180.0 + 1e-4);
    }

    #[test]
    fn ambient_wraps_and_keeps_velocity() {
        let config = OrganismConfig::default();
        let v = viewport();
        let margin = config.physics.wrap_margin;
        let cases = [
            (vec2(-margin, 300.0), vec2(-1.0, 0.0), vec2(v.width + margin, 300.0)),
            (vec2(v.width + margin, 300.0), vec2(1.0, 0.0), vec2(-margin, 300.0)),
            (vec2(400.0, -margin), vec2(0.0, -1.0), vec2(400.0, v.height + margin)),
            (vec2(400.0, v.height + margin), vec2(0.0, 1.0), vec2(400.0, -margin)),
        ];
        for (start, velocity, expected) in cases {
            let mut store = ParticleStore::new();
            store.push(Particle {
                pos: start,
                velocity,
                size: 1.0,
                alpha: 0.1,
                life: 0.0,
                max_life: None,
                kind: ParticleKind::Ambient,
            });
            step_particles(&mut store, &v, None, &config);
            let p = store.iter().next().unwrap();
            assert_eq!(p.pos, expected);
            assert_eq!(p.velocity, velocity);
        }
    }

    #[test]
    fn burst_slows_fades_and_dies() {
        let config = OrganismConfig::default();
        let mut store = ParticleStore::new();
        store.push(Particle {
            pos: vec2(400.0, 300.0),
            velocity: vec2(3.0, 0.0),
            size: 2.0,
            alpha: 1.0,
            life: 0.0,
            max_life: Some(10.0),
            kind: ParticleKind::Burst { color: Rgb::WHITE },
        });
        step_particles(&mut store, &viewport(), None, &config);
        let p = *store.iter().next().unwrap();
        assert!((p.velocity.x - 3.0 * 0.97).abs() < 1e-5);
        assert!((p.alpha - 0.9).abs() < 1e-5);

        for _ in 0..9 {
            step_particles(&mut store, &viewport(), None, &config);
        }
        assert_eq!(store.iter().next().unwrap().alpha, 0.0);
        step_particles(&mut store, &viewport(), None, &config);
        assert!(store.is_empty());
    }

    #[test]
    fn pointer_brightens_and_pushes_orbit() {
        let config = OrganismConfig::default();
        let v = viewport();
        let orbit = Particle {
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: 2.0,
            alpha: 0.5,
            life: 0.0,
            max_life: None,
            kind: ParticleKind::Orbit { angle: 0.0, radius: 100.0, speed: 0.0, ring: 0 },
        };

        let mut idle = ParticleStore::new();
        idle.push(orbit);
        step_particles(&mut idle, &v, None, &config);

        let mut touched = ParticleStore::new();
        touched.push(orbit);
        // Particle lands at center + (100, 0); pointer right on it.
        step_particles(&mut touched, &v, Some(v.center() + vec2(100.0, 0.0)), &config);

        let a = idle.iter().next().unwrap();
        let b = touched.iter().next().unwrap();
        assert!((b.alpha - (a.alpha + 0.3).min(1.0)).abs() < 1e-5);
        let ParticleKind::Orbit { radius, .. } = b.kind else { unreachable!() };
        assert!((radius - 100.5).abs() < 1e-5);
    }

    #[test]
    fn pointer_brightens_flow_without_pushing_it() {
        let config = OrganismConfig::default();
        let v = viewport();

        let mut idle = ParticleStore::new();
        idle.push(flow(150.0, 1.0));
        step_particles(&mut idle, &v, None, &config);
        let a = *idle.iter().next().unwrap();

        let mut touched = ParticleStore::new();
        touched.push(flow(150.0, 1.0));
        step_particles(&mut touched, &v, Some(a.pos), &config);
        let b = touched.iter().next().unwrap();

        assert!((b.alpha - (a.alpha + 0.3).min(1.0)).abs() < 1e-5);
        let ParticleKind::Flow { radius, .. } = b.kind else { unreachable!() };
        assert!((radius - 149.0).abs() < 1e-5);
        assert_eq!(b.pos, a.pos);
    }

    #[test]
    fn pointer_ignores_far_and_ambient_particles() {
        let config = OrganismConfig::default();
        let v = viewport();
        let mut store = ParticleStore::new();
        store.push(Particle {
            pos: vec2(10.0, 10.0),
            velocity: Vec2::ZERO,
            size: 1.0,
            alpha: 0.1,
            life: 0.0,
            max_life: None,
            kind: ParticleKind::Ambient,
        });
        step_particles(&mut store, &v, Some(vec2(10.0, 10.0)), &config);
        let expected = 0.06 + (0.008f32).sin() * 0.08;
        assert!((store.iter().next().unwrap().alpha - expected).abs() < 1e-6);
    }

    #[test]
    fn shockwave_alpha_decays_geometrically() {
        let config = OrganismConfig::default();
        let mut waves = vec![Shockwave { radius: 0.0, alpha: 0.7, speed: 4.0, line_width: 3.0 }];
        let n = 50;
        for _ in 0..n {
            update_shockwaves(&mut waves, &config);
        }
        let expected = 0.7 * 0.982f32.powi(n);
        assert!((waves[0].alpha - expected).abs() < 1e-4);
        assert!((waves[0].radius - 200.0).abs() < 1e-3);
    }

    #[test]
    fn shockwave_pruned_below_epsilon() {
        let config = OrganismConfig::default();
        let mut waves = vec![Shockwave { radius: 0.0, alpha: 0.4, speed: 2.5, line_width: 1.5 }];
        let mut ticks = 0;
        while !waves.is_empty() {
            update_shockwaves(&mut waves, &config);
            ticks += 1;
            assert!(ticks < 1_000);
        }
        // 0.4 * 0.982^n <= 0.008  =>  n >= ln(0.02) / ln(0.982) ~ 215.4
        assert_eq!(ticks, 216);
    }

    #[test]
    fn shimmer_starts_on_interval_and_ends_past_threshold() {
        let config = OrganismConfig::default();
        let mut phases = Phases::new(3);
        phases.advance(1, &config);
        assert_eq!(phases.shimmer, None);

        phases.advance(480, &config);
        assert!((phases.shimmer.unwrap() - 0.015).abs() < 1e-6);

        let mut frame = 481;
        while phases.shimmer.is_some() {
            phases.advance(frame, &config);
            frame += 1;
            assert!(frame < 1_000);
        }
        // 1.5 / 0.015 = 100 frames of sweep
        assert!((frame - 480) >= 100 && (frame - 480) <= 101);
    }

    #[test]
    fn rings_and_beams_rotate_at_configured_speeds() {
        let config = OrganismConfig::default();
        let mut phases = Phases::new(3);
        for f in 1..=10 {
            phases.advance(f, &config);
        }
        assert!((phases.ring_angles[1] - -0.002).abs() < 1e-6);
        assert!((phases.beam_angle - 0.04).abs() < 1e-5);
        // 72 bpm -> 1.2 beats/s -> TAU * 1.2 / 60 per frame
        assert!((phases.pulse - TAU * 1.2 / 60.0 * 10.0).abs() < 1e-4);
    }
}
