//! Scrolling heartbeat trace for the overlay. Quiet chatter between blocks,
//! one PQRST complex per new block.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::stats::RingBuffer;

/// Spike progress added per sample.
const SPIKE_STEP: f32 = 0.02;
/// Chance per sample of an isolated transaction blip.
const MICRO_PULSE_CHANCE: f64 = 0.02;
/// Samples above this magnitude draw a larger leading dot.
pub const LOUD_SAMPLE: f32 = 10.0;

pub struct Ekg {
    trace: RingBuffer,
    spike: Option<f32>,
    rng: ChaCha8Rng,
}

impl Ekg {
    pub fn new(capacity: usize, seed: u64) -> Self {
        let mut trace = RingBuffer::new(capacity);
        for _ in 0..capacity {
            trace.push(0.0);
        }
        Self {
            trace,
            spike: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Start a heartbeat; restarts one already in flight.
    pub fn trigger(&mut self) {
        self.spike = Some(0.0);
    }

    /// Append the next sample. `time` is seconds and drives the slow
    /// activity swell of the baseline.
    pub fn step(&mut self, time: f64) -> f32 {
        let value = match self.spike {
            Some(progress) => {
                let next = progress + SPIKE_STEP;
                self.spike = (next <= 1.0).then_some(next);
                pqrst(progress)
            }
            None => self.chatter(time),
        };
        self.trace.push(value);
        value
    }

    fn chatter(&mut self, time: f64) -> f32 {
        let noise = self.rng.gen_range(-1.5f32..1.5);
        let activity = ((time / 2.0).sin() * 0.5 + 0.5) as f32;
        let pulse = if self.rng.gen_bool(MICRO_PULSE_CHANCE) {
            self.rng.gen_range(-7.5f32..7.5)
        } else {
            0.0
        };
        noise * (1.0 + activity) + pulse
    }

    pub fn trace(&self) -> &RingBuffer {
        &self.trace
    }
}

/// Trace height at `progress` through one heartbeat, in pixels above the
/// midline.
pub fn pqrst(progress: f32) -> f32 {
    match progress {
        p if p < 0.10 => -5.0,
        p if p < 0.15 => 5.0,
        p if p < 0.20 => -20.0,
        p if p < 0.30 => 40.0,
        p if p < 0.35 => -15.0,
        p if p < 0.50 => 0.0,
        p if p < 0.70 => 8.0,
        _ => 0.0,
    }
}
