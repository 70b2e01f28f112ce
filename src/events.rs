use std::f32::consts::TAU;

use macroquad::prelude::Vec2;
use rand::Rng;

use crate::config::{OrganismConfig, ShockwaveSpec};
use crate::particles::{Particle, ParticleKind, ParticleStore};
use crate::snapshot::NetworkSnapshot;

/// Expanding ring emitted on a new block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shockwave {
    pub radius: f32,
    pub alpha: f32,
    pub speed: f32,
    pub line_width: f32,
}

impl Shockwave {
    pub fn from_spec(spec: &ShockwaveSpec) -> Self {
        Self {
            radius: 0.0,
            alpha: spec.alpha,
            speed: spec.speed,
            line_width: spec.line_width,
        }
    }
}

/// A block arrived only if there was a previous height and the new one is
/// strictly higher. The first snapshot never counts.
pub fn is_new_block(previous: Option<&NetworkSnapshot>, next: &NetworkSnapshot) -> bool {
    previous.is_some_and(|prev| next.block_height > prev.block_height)
}

/// Inject the celebration: two shockwaves and a burst of short-lived particles
/// radiating from `center`. Returns the number of burst particles added.
pub fn trigger_new_block(
    store: &mut ParticleStore,
    shockwaves: &mut Vec<Shockwave>,
    center: Vec2,
    config: &OrganismConfig,
    rng: &mut impl Rng,
) -> usize {
    shockwaves.push(Shockwave::from_spec(&config.shockwaves.primary));
    shockwaves.push(Shockwave::from_spec(&config.shockwaves.secondary));

    let palette = &config.palette;
    let count = config.population.burst;
    for _ in 0..count {
        let angle = rng.gen_range(0.0..TAU);
        let speed = rng.gen_range(1.5..4.5);
        let color = if rng.gen_bool(0.5) { palette.accent1 } else { palette.gold };
        store.push(Particle {
            pos: center,
            velocity: Vec2::from_angle(angle) * speed,
            size: rng.gen_range(1.5..4.0),
            alpha: rng.gen_range(0.8..1.0),
            life: 0.0,
            max_life: Some(rng.gen_range(60.0..120.0)),
            kind: ParticleKind::Burst { color },
        });
    }
    count
}
