// All tunable organism constants in one place.
//
// Everything is read-only after startup. `OrganismConfig::default()` carries the
// tuned values; a JSON file may override any subset of them.

use std::f32::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{OrganismError, Result};

// Frame loop
pub const FIXED_DT: f64 = 1.0 / 60.0;
pub const MAX_FRAME_TIME: f64 = 0.1;

// Pointer parked off-screen means "no active pointer".
pub const POINTER_SENTINEL: f32 = -9999.0;

// Window
pub const WINDOW_WIDTH: i32 = 1280;
pub const WINDOW_HEIGHT: i32 = 800;

// Feeds
pub const DEFAULT_POLL_INTERVAL: f64 = 30.0;
pub const DEFAULT_BLOCK_INTERVAL: f64 = 20.0;
pub const NEW_BLOCK_TOAST_SECS: f64 = 3.0;

// Overlay heartbeat trace, 3 px per sample.
pub const EKG_SAMPLES: usize = 120;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganismConfig {
    pub palette: Palette,
    pub population: Population,
    pub rings: Rings,
    pub core: Core,
    pub beams: Beams,
    pub timing: Timing,
    pub shockwaves: Shockwaves,
    pub physics: Physics,
}

impl Default for OrganismConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            population: Population::default(),
            rings: Rings::default(),
            core: Core::default(),
            beams: Beams::default(),
            timing: Timing::default(),
            shockwaves: Shockwaves::default(),
            physics: Physics::default(),
        }
    }
}

impl OrganismConfig {
    /// Load overrides from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| OrganismError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: OrganismConfig =
            serde_json::from_str(&text).map_err(|source| OrganismError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let rings = &self.rings;
        if rings.count == 0 {
            return Err(OrganismError::InvalidConfig("rings.count must be at least 1".into()));
        }
        for (name, len) in [
            ("radius_fraction", rings.radius_fraction.len()),
            ("stroke_alpha", rings.stroke_alpha.len()),
            ("stroke_width", rings.stroke_width.len()),
            ("rotation_speed", rings.rotation_speed.len()),
        ] {
            if len != rings.count {
                return Err(OrganismError::InvalidConfig(format!(
                    "rings.{name} has {len} entries, expected {}",
                    rings.count
                )));
            }
        }
        for (name, bounds) in [
            ("orbit", &self.population.orbit),
            ("flow", &self.population.flow),
            ("ambient", &self.population.ambient),
        ] {
            if bounds.min > bounds.max {
                return Err(OrganismError::InvalidConfig(format!(
                    "population.{name}: min {} exceeds max {}",
                    bounds.min, bounds.max
                )));
            }
        }
        if !(self.population.orbit_pool_divisor > 0.0) {
            return Err(OrganismError::InvalidConfig(
                "population.orbit_pool_divisor must be positive".into(),
            ));
        }
        if !(self.shockwaves.decay > 0.0 && self.shockwaves.decay < 1.0) {
            return Err(OrganismError::InvalidConfig(
                "shockwaves.decay must lie in (0, 1)".into(),
            ));
        }
        if self.timing.shimmer_interval == 0 {
            return Err(OrganismError::InvalidConfig(
                "timing.shimmer_interval must be at least 1 frame".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub teal: Rgb,
    pub teal_dim: Rgb,
    pub blue: Rgb,
    pub purple: Rgb,
    pub gold: Rgb,
    pub red: Rgb,
    pub green: Rgb,
    pub cyan: Rgb,
    pub white: Rgb,
    pub bg: Rgb,
    pub bg_deep: Rgb,
    /// Bright mint for highlights.
    pub accent1: Rgb,
    /// Warm pop for celebrations.
    pub accent2: Rgb,
    // Deep-space background stops, center to edge.
    pub space_inner: Rgb,
    pub space_mid: Rgb,
    pub space_outer: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            teal: Rgb::new(0x2e, 0xd6, 0xa1),
            teal_dim: Rgb::new(0x1a, 0x7a, 0x5c),
            blue: Rgb::new(0x29, 0x70, 0xff),
            purple: Rgb::new(0x6d, 0x28, 0xd9),
            gold: Rgb::new(0xf0, 0xb0, 0x40),
            red: Rgb::new(0xef, 0x44, 0x44),
            green: Rgb::new(0x22, 0xc5, 0x5e),
            cyan: Rgb::new(0x06, 0xb6, 0xd4),
            white: Rgb::WHITE,
            bg: Rgb::new(0x05, 0x0a, 0x12),
            bg_deep: Rgb::new(0x02, 0x06, 0x10),
            accent1: Rgb::new(0x3b, 0xf0, 0xc0),
            accent2: Rgb::new(0xff, 0x6b, 0x35),
            space_inner: Rgb::new(0x0f, 0x20, 0x40),
            space_mid: Rgb::new(0x0a, 0x18, 0x30),
            space_outer: Rgb::new(0x03, 0x08, 0x12),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationBounds {
    pub min: usize,
    pub max: usize,
    /// Most particles of this kind spawned in a single frame.
    pub spawn_rate: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Population {
    pub orbit: PopulationBounds,
    pub flow: PopulationBounds,
    pub ambient: PopulationBounds,
    /// Burst particles injected per new block.
    pub burst: usize,
    /// Tickets per orbit particle.
    pub orbit_pool_divisor: f32,
}

impl Default for Population {
    fn default() -> Self {
        Self {
            orbit: PopulationBounds { min: 200, max: 350, spawn_rate: 4 },
            flow: PopulationBounds { min: 100, max: 200, spawn_rate: 3 },
            ambient: PopulationBounds { min: 60, max: 120, spawn_rate: 2 },
            burst: 20,
            orbit_pool_divisor: 160.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rings {
    pub count: usize,
    /// Fraction of min(width, height).
    pub radius_fraction: Vec<f32>,
    pub stroke_alpha: Vec<f32>,
    pub stroke_width: Vec<f32>,
    /// Radians per frame.
    pub rotation_speed: Vec<f32>,
    /// Gap left open in each ring arc, radians.
    pub arc_gap: f32,
    /// How strongly pool/target deviation scales ring radii.
    pub squeeze_gain: f32,
}

impl Default for Rings {
    fn default() -> Self {
        Self {
            count: 3,
            radius_fraction: vec![0.18, 0.28, 0.40],
            stroke_alpha: vec![0.8, 0.65, 0.5],
            stroke_width: vec![3.5, 2.5, 2.0],
            rotation_speed: vec![0.0003, -0.0002, 0.00015],
            arc_gap: PI * 0.25,
            squeeze_gain: 0.5,
        }
    }
}

impl Rings {
    pub fn outer_fraction(&self) -> f32 {
        self.radius_fraction.last().copied().unwrap_or(0.4)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Core {
    pub base_size_fraction: f32,
    pub glow_layers: usize,
    pub heartbeat_bpm: f32,
    /// Scale oscillation amplitude.
    pub heartbeat_depth: f32,
    /// Treasury balance (DCR) that counts as fully healthy.
    pub treasury_reference: f32,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            base_size_fraction: 0.045,
            glow_layers: 5,
            heartbeat_bpm: 72.0,
            heartbeat_depth: 0.2,
            treasury_reference: 1_000_000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Beams {
    pub count: usize,
    pub rotation_speed: f32,
    pub alpha: f32,
    pub width: f32,
}

impl Default for Beams {
    fn default() -> Self {
        Self {
            count: 3,
            rotation_speed: 0.004,
            alpha: 0.4,
            width: 2.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub nebula_rotation: f32,
    /// Frames between diagonal sweeps.
    pub shimmer_interval: u64,
    pub shimmer_speed: f32,
    pub sweep_alpha: f32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            nebula_rotation: 0.0004,
            shimmer_interval: 480,
            shimmer_speed: 0.015,
            sweep_alpha: 0.07,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShockwaveSpec {
    pub speed: f32,
    pub alpha: f32,
    pub line_width: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shockwaves {
    pub primary: ShockwaveSpec,
    pub secondary: ShockwaveSpec,
    /// Per-frame alpha multiplier.
    pub decay: f32,
    pub prune_alpha: f32,
}

impl Default for Shockwaves {
    fn default() -> Self {
        Self {
            primary: ShockwaveSpec { speed: 4.0, alpha: 0.7, line_width: 3.0 },
            secondary: ShockwaveSpec { speed: 2.5, alpha: 0.4, line_width: 1.5 },
            decay: 0.982,
            prune_alpha: 0.008,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Physics {
    /// Pixel radius of the pointer highlight/repulsion.
    pub pointer_radius: f32,
    pub pointer_alpha_boost: f32,
    pub pointer_push: f32,
    /// Flow particles die once their radius drops below this.
    pub flow_death_radius: f32,
    pub flow_fade_in_frames: f32,
    pub burst_drag: f32,
    /// Ambient particles wrap this far outside the viewport.
    pub wrap_margin: f32,
    /// 24h price change (percent) that maps to the full temperature color.
    pub price_change_cap: f32,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            pointer_radius: 80.0,
            pointer_alpha_boost: 0.3,
            pointer_push: 0.5,
            flow_death_radius: 15.0,
            flow_fade_in_frames: 20.0,
            burst_drag: 0.97,
            wrap_margin: 20.0,
            price_change_cap: 10.0,
        }
    }
}
