use macroquad::prelude::Vec2;

use crate::color::Rgb;

/// Which population a particle belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Species {
    Orbit,
    Flow,
    Ambient,
    Burst,
}

impl Species {
    pub const ALL: [Species; 4] = [Species::Orbit, Species::Flow, Species::Ambient, Species::Burst];

    fn slot(self) -> usize {
        match self {
            Species::Orbit => 0,
            Species::Flow => 1,
            Species::Ambient => 2,
            Species::Burst => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Species::Orbit => "orbit",
            Species::Flow => "flow",
            Species::Ambient => "ambient",
            Species::Burst => "burst",
        }
    }
}

/// Kind-specific state. Each variant carries only what its kinematics need.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParticleKind {
    /// Circles the center on one of the rings. `speed` is signed radians/frame.
    Orbit { angle: f32, radius: f32, speed: f32, ring: usize },
    /// Spirals inward; `speed` is pixels/frame of radius lost.
    Flow { angle: f32, radius: f32, speed: f32 },
    /// Drifts with its velocity and wraps at the viewport edges.
    Ambient,
    /// Radiates outward from a new block.
    Burst { color: Rgb },
}

impl ParticleKind {
    pub fn species(&self) -> Species {
        match self {
            ParticleKind::Orbit { .. } => Species::Orbit,
            ParticleKind::Flow { .. } => Species::Flow,
            ParticleKind::Ambient => Species::Ambient,
            ParticleKind::Burst { .. } => Species::Burst,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    /// May exceed 1 between updates; clamped when drawn.
    pub alpha: f32,
    /// Frames lived.
    pub life: f32,
    /// `None` lives forever.
    pub max_life: Option<f32>,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn species(&self) -> Species {
        self.kind.species()
    }

    pub fn expired(&self) -> bool {
        self.max_life.is_some_and(|max| self.life > max)
    }
}

/// Owns every live particle. Per-species counts are kept in step with the
/// vector so population checks stay O(1).
#[derive(Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    counts: [usize; 4],
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            counts: [0; 4],
        }
    }

    pub fn push(&mut self, particle: Particle) {
        self.counts[particle.species().slot()] += 1;
        self.particles.push(particle);
    }

    pub fn count(&self, species: Species) -> usize {
        self.counts[species.slot()]
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.particles.iter()
    }

    pub fn of_species(&self, species: Species) -> impl Iterator<Item = &Particle> + '_ {
        self.particles.iter().filter(move |p| p.species() == species)
    }

    /// Mutate every particle in place and drop those for which `keep` returns
    /// false. The species of a particle never changes, so counts only shrink.
    pub fn retain_mut(&mut self, mut keep: impl FnMut(&mut Particle) -> bool) {
        let counts = &mut self.counts;
        self.particles.retain_mut(|p| {
            let kept = keep(p);
            if !kept {
                counts[p.species().slot()] -= 1;
            }
            kept
        });
    }
}
