use std::f32::consts::TAU;

use macroquad::prelude::{vec2, Vec2};
use rand::Rng;

use crate::config::{OrganismConfig, PopulationBounds};
use crate::particles::{Particle, ParticleKind, ParticleStore, Species};
use crate::snapshot::NetworkSnapshot;
use crate::viewport::Viewport;

/// Stake ratio assumed before the first snapshot arrives.
const NEUTRAL_STAKE_RATIO: f32 = 0.5;

/// Orbit population follows ticket-pool size, clamped to the configured bounds.
pub fn orbit_target(snapshot: Option<&NetworkSnapshot>, config: &OrganismConfig) -> usize {
    let bounds = config.population.orbit;
    let Some(s) = snapshot else {
        return bounds.min;
    };
    let per_particle = config.population.orbit_pool_divisor as f64;
    let raw = s.ticket_pool_size / per_particle;
    if !raw.is_finite() || raw <= 0.0 {
        return bounds.min;
    }
    (raw.floor() as usize).clamp(bounds.min, bounds.max)
}

/// Flow population interpolates between its bounds by stake participation.
pub fn flow_target(snapshot: Option<&NetworkSnapshot>, config: &OrganismConfig) -> usize {
    let bounds = config.population.flow;
    let ratio = snapshot.map_or(NEUTRAL_STAKE_RATIO, stake_ratio);
    let span = (bounds.max - bounds.min) as f32;
    bounds.min + (ratio * span).floor() as usize
}

pub fn ambient_target(config: &OrganismConfig) -> usize {
    config.population.ambient.min
}

/// Stake participation as a 0..1 ratio. Garbage input falls back to neutral.
pub fn stake_ratio(snapshot: &NetworkSnapshot) -> f32 {
    let ratio = (snapshot.stake_participation / 100.0) as f32;
    if ratio.is_nan() {
        NEUTRAL_STAKE_RATIO
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// How many to spawn this frame: the shortfall, capped at the spawn rate.
pub fn spawn_budget(current: usize, target: usize, bounds: &PopulationBounds) -> usize {
    target.saturating_sub(current).min(bounds.spawn_rate)
}

/// Top every population up toward its target. Never removes anything.
pub fn maintain(
    store: &mut ParticleStore,
    snapshot: Option<&NetworkSnapshot>,
    viewport: &Viewport,
    config: &OrganismConfig,
    rng: &mut impl Rng,
) {
    let pop = &config.population;

    let orbit = spawn_budget(store.count(Species::Orbit), orbit_target(snapshot, config), &pop.orbit);
    for _ in 0..orbit {
        store.push(spawn_orbit(viewport, config, rng));
    }

    let flow = spawn_budget(store.count(Species::Flow), flow_target(snapshot, config), &pop.flow);
    for _ in 0..flow {
        store.push(spawn_flow(viewport, rng));
    }

    let ambient = spawn_budget(store.count(Species::Ambient), ambient_target(config), &pop.ambient);
    for _ in 0..ambient {
        store.push(spawn_ambient(viewport, rng));
    }
}

fn random_sign(rng: &mut impl Rng) -> f32 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}

pub fn spawn_orbit(viewport: &Viewport, config: &OrganismConfig, rng: &mut impl Rng) -> Particle {
    let rings = &config.rings;
    let ring = rng.gen_range(0..rings.count.max(1));
    let min_dim = viewport.min_dim();
    let fraction = rings.radius_fraction.get(ring).copied().unwrap_or(0.0);
    let jitter = (rng.gen::<f32>() - 0.5) * min_dim * 0.03;
    let angle = rng.gen_range(0.0..TAU);
    let speed = rng.gen_range(0.0008..0.0033) * random_sign(rng);
    let radius = min_dim * fraction + jitter;

    Particle {
        pos: viewport.center() + Vec2::from_angle(angle) * radius,
        velocity: Vec2::ZERO,
        size: rng.gen_range(1.5..4.5),
        alpha: rng.gen_range(0.3..0.8),
        life: 0.0,
        max_life: None,
        kind: ParticleKind::Orbit { angle, radius, speed, ring },
    }
}

pub fn spawn_flow(viewport: &Viewport, rng: &mut impl Rng) -> Particle {
    let angle = rng.gen_range(0.0..TAU);
    let radius = viewport.min_dim() * rng.gen_range(0.35..0.65);

    Particle {
        pos: viewport.center() + Vec2::from_angle(angle) * radius,
        velocity: Vec2::ZERO,
        size: rng.gen_range(1.0..3.2),
        alpha: rng.gen_range(0.2..0.6),
        life: 0.0,
        max_life: Some(rng.gen_range(180.0..440.0)),
        kind: ParticleKind::Flow {
            angle,
            radius,
            speed: rng.gen_range(0.4..1.6),
        },
    }
}

pub fn spawn_ambient(viewport: &Viewport, rng: &mut impl Rng) -> Particle {
    let w = viewport.width.max(1.0);
    let h = viewport.height.max(1.0);

    Particle {
        pos: vec2(rng.gen_range(0.0..w), rng.gen_range(0.0..h)),
        velocity: vec2(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * 0.25,
        size: rng.gen_range(0.5..2.0),
        alpha: rng.gen_range(0.08..0.23),
        life: 0.0,
        max_life: None,
        kind: ParticleKind::Ambient,
    }
}
