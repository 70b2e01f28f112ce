use macroquad::prelude::{vec2, Vec2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::canvas::Canvas;
use crate::config::{OrganismConfig, POINTER_SENTINEL};
use crate::events::{self, Shockwave};
use crate::particles::ParticleStore;
use crate::physics::{self, Phases};
use crate::population;
use crate::renderer;
use crate::snapshot::NetworkSnapshot;
use crate::viewport::Viewport;

/// The living animation: particles, shockwaves, phases and the latest network
/// snapshot. All mutation happens through `update`, `set_data`, `set_mouse`
/// and `resize`.
pub struct Organism {
    pub config: OrganismConfig,
    pub particles: ParticleStore,
    pub shockwaves: Vec<Shockwave>,
    /// Frames simulated so far.
    pub frame: u64,
    /// `None` until the first snapshot arrives; the loading indicator shows.
    pub data: Option<NetworkSnapshot>,
    pub pointer: Vec2,
    pub phases: Phases,
    pub viewport: Viewport,
    rng: ChaCha8Rng,
}

impl Organism {
    pub fn new(config: OrganismConfig, viewport: Viewport, seed: u64) -> Self {
        let phases = Phases::new(config.rings.count);
        let capacity = config.population.orbit.max
            + config.population.flow.max
            + config.population.ambient.max
            + config.population.burst * 2;
        Self {
            config,
            particles: ParticleStore::with_capacity(capacity),
            shockwaves: Vec::new(),
            frame: 0,
            data: None,
            pointer: vec2(POINTER_SENTINEL, POINTER_SENTINEL),
            phases,
            viewport,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Adopt new surface dimensions. Existing particles keep their positions;
    /// orbit and flow particles re-anchor to the new center on their next step.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        let (pw, ph) = viewport.pixel_size();
        log::info!(
            "resize: {:.0}x{:.0} logical, {pw}x{ph} physical (dpi {:.2})",
            viewport.width,
            viewport.height,
            viewport.dpi
        );
        self.viewport = viewport;
    }

    /// Replace the snapshot. Returns true when it carried a new block, in which
    /// case the celebration has already been injected.
    pub fn set_data(&mut self, snapshot: NetworkSnapshot) -> bool {
        let new_block = events::is_new_block(self.data.as_ref(), &snapshot);
        if new_block {
            let previous = self.data.as_ref().map_or(0, |d| d.block_height);
            let burst = events::trigger_new_block(
                &mut self.particles,
                &mut self.shockwaves,
                self.viewport.center(),
                &self.config,
                &mut self.rng,
            );
            log::info!(
                "new block: {previous} -> {} ({burst} burst particles)",
                snapshot.block_height
            );
        }
        self.data = Some(snapshot);
        new_block
    }

    pub fn set_mouse(&mut self, x: f32, y: f32) {
        self.pointer = vec2(x, y);
    }

    /// The pointer if it is on the surface. The sentinel and any negative
    /// coordinate count as absent.
    pub fn pointer_position(&self) -> Option<Vec2> {
        (self.pointer.x >= 0.0 && self.pointer.y >= 0.0).then_some(self.pointer)
    }

    /// Advance the simulation by one fixed frame.
    pub fn update(&mut self) {
        let pointer = self.pointer_position();
        self.phases.advance(self.frame, &self.config);
        physics::update_shockwaves(&mut self.shockwaves, &self.config);
        population::maintain(
            &mut self.particles,
            self.data.as_ref(),
            &self.viewport,
            &self.config,
            &mut self.rng,
        );
        physics::step_particles(
            &mut self.particles,
            &self.viewport,
            pointer,
            &self.config,
        );
        self.frame += 1;
    }

    pub fn render(&self, canvas: &mut impl Canvas) {
        renderer::draw(canvas, self);
    }
}
