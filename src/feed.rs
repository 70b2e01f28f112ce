use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{OrganismError, Result};
use crate::snapshot::NetworkSnapshot;

/// Something that produces network snapshots over time. `now` is wall-clock
/// unix seconds; a feed yields at most one snapshot per poll interval.
pub trait MetricsFeed {
    fn poll(&mut self, now: f64) -> Result<Option<NetworkSnapshot>>;

    fn describe(&self) -> String;
}

/// Fires immediately, then once per interval.
#[derive(Clone, Debug)]
pub struct PollSchedule {
    interval: f64,
    last: Option<f64>,
}

impl PollSchedule {
    pub fn new(interval: f64) -> Self {
        Self {
            interval: interval.max(0.0),
            last: None,
        }
    }

    /// True if a poll is due at `now`; marks it taken.
    pub fn due(&mut self, now: f64) -> bool {
        let due = self.last.map_or(true, |last| now - last >= self.interval);
        if due {
            self.last = Some(now);
        }
        due
    }
}

/// The fallback snapshot, over and over. Its height never moves.
pub struct StaticFeed {
    schedule: PollSchedule,
    snapshot: NetworkSnapshot,
}

impl StaticFeed {
    pub fn new(poll_interval: f64) -> Self {
        Self {
            schedule: PollSchedule::new(poll_interval),
            snapshot: NetworkSnapshot::fallback(),
        }
    }
}

impl MetricsFeed for StaticFeed {
    fn poll(&mut self, now: f64) -> Result<Option<NetworkSnapshot>> {
        Ok(self.schedule.due(now).then(|| self.snapshot.clone()))
    }

    fn describe(&self) -> String {
        "static fallback".to_string()
    }
}

/// Synthetic chain: a block every `block_interval` seconds and small random
/// drift in market, pool and treasury figures.
pub struct SimulatedFeed {
    schedule: PollSchedule,
    block_interval: f64,
    last_block: Option<f64>,
    state: NetworkSnapshot,
    rng: ChaCha8Rng,
}

impl SimulatedFeed {
    pub fn new(poll_interval: f64, block_interval: f64, seed: u64) -> Self {
        Self {
            schedule: PollSchedule::new(poll_interval),
            block_interval: block_interval.max(1.0),
            last_block: None,
            state: NetworkSnapshot::fallback(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn advance_chain(&mut self, now: f64) {
        let Some(mut last) = self.last_block else {
            self.last_block = Some(now);
            self.state.block_time = now;
            return;
        };
        while now - last >= self.block_interval {
            last += self.block_interval;
            self.state.block_height += 1;
            self.state.block_time = last;
            self.state.coin_supply += self.rng.gen_range(8.0..12.0);
        }
        self.last_block = Some(last);
    }

    fn drift(&mut self) {
        let s = &mut self.state;
        let rng = &mut self.rng;
        s.price_change_24h = (s.price_change_24h + rng.gen_range(-0.6..0.6)).clamp(-25.0, 25.0);
        s.price = (s.price * (1.0 + rng.gen_range(-0.003..0.003))).max(0.01);
        s.market_cap = s.price * s.coin_supply;
        s.volume_24h = (s.volume_24h * (1.0 + rng.gen_range(-0.02..0.02))).max(0.0);
        s.ticket_pool_size = (s.ticket_pool_size + rng.gen_range(-60.0..60.0)).max(0.0);
        s.ticket_price = (s.ticket_price + rng.gen_range(-0.5..0.5)).max(1.0);
        s.ticket_pool_value = s.ticket_pool_size * s.ticket_price;
        s.treasury_balance = (s.treasury_balance + rng.gen_range(-600.0..900.0)).max(0.0);
        s.hashrate = (s.hashrate * (1.0 + rng.gen_range(-0.01..0.01))).max(0.0);
    }
}

impl MetricsFeed for SimulatedFeed {
    fn poll(&mut self, now: f64) -> Result<Option<NetworkSnapshot>> {
        if !self.schedule.due(now) {
            return Ok(None);
        }
        self.advance_chain(now);
        self.drift();
        self.state = self.state.clone().derive();
        self.state.is_live = false;
        Ok(Some(self.state.clone()))
    }

    fn describe(&self) -> String {
        format!("simulated (block every {:.0}s)", self.block_interval)
    }
}

/// Snapshots recorded to a JSON array, played back in order. The last one is
/// held once the file runs out. Recorded values are delivered as-is; fields
/// missing from the file take their fallback values.
pub struct ReplayFeed {
    schedule: PollSchedule,
    path: PathBuf,
    snapshots: Vec<NetworkSnapshot>,
    cursor: usize,
}

impl ReplayFeed {
    pub fn load(path: &Path, poll_interval: f64) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| OrganismError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshots: Vec<NetworkSnapshot> =
            serde_json::from_str(&text).map_err(|source| OrganismError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_snapshots(path, snapshots, poll_interval)
    }

    pub fn from_snapshots(
        path: &Path,
        snapshots: Vec<NetworkSnapshot>,
        poll_interval: f64,
    ) -> Result<Self> {
        if snapshots.is_empty() {
            return Err(OrganismError::EmptyReplay(path.to_path_buf()));
        }
        Ok(Self {
            schedule: PollSchedule::new(poll_interval),
            path: path.to_path_buf(),
            snapshots,
            cursor: 0,
        })
    }

    fn len(&self) -> usize {
        self.snapshots.len()
    }
}

impl MetricsFeed for ReplayFeed {
    fn poll(&mut self, now: f64) -> Result<Option<NetworkSnapshot>> {
        if !self.schedule.due(now) {
            return Ok(None);
        }
        let index = self.cursor.min(self.snapshots.len() - 1);
        self.cursor = (self.cursor + 1).min(self.snapshots.len());
        Ok(self.snapshots.get(index).cloned())
    }

    fn describe(&self) -> String {
        format!("replay of {} ({} snapshots)", self.path.display(), self.len())
    }
}
