use crate::canvas::Canvas;
use crate::config::{FIXED_DT, MAX_FRAME_TIME};
use crate::organism::Organism;

/// Source of elapsed wall time per host frame.
pub trait FrameClock {
    fn frame_time(&mut self) -> f64;
}

/// macroquad's frame timer.
pub struct HostClock;

impl FrameClock for HostClock {
    fn frame_time(&mut self) -> f64 {
        macroquad::time::get_frame_time() as f64
    }
}

/// Constant frame time, for headless runs and tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub f64);

impl FrameClock for FixedClock {
    fn frame_time(&mut self) -> f64 {
        self.0
    }
}

/// Handle for the next scheduled frame. At most one exists at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameToken(u64);

/// Runs the organism one frame at a time once started. Stopping cancels the
/// pending frame so no further update or render happens.
pub struct AnimationDriver {
    pub organism: Organism,
    pending: Option<FrameToken>,
    next_token: u64,
    accumulator: f64,
}

impl AnimationDriver {
    pub fn new(organism: Organism) -> Self {
        Self {
            organism,
            pending: None,
            next_token: 0,
            accumulator: 0.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Schedule the first frame. A second call while running does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.accumulator = 0.0;
        self.schedule();
        log::debug!("animation driver started at frame {}", self.organism.frame);
    }

    /// Cancel the pending frame. Safe before `start` and when already stopped.
    pub fn stop(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("animation driver stopped at frame {}", self.organism.frame);
        }
    }

    fn schedule(&mut self) {
        self.next_token = self.next_token.wrapping_add(1);
        self.pending = Some(FrameToken(self.next_token));
    }

    /// One animation frame: a single update and a single render, then
    /// reschedule. Returns false when no frame was pending.
    pub fn tick(&mut self, canvas: &mut impl Canvas) -> bool {
        if self.pending.take().is_none() {
            return false;
        }
        self.organism.update();
        self.organism.render(canvas);
        self.schedule();
        true
    }

    /// Host-paced frame: run as many fixed updates as the elapsed time
    /// covers, render once, reschedule. Returns the number of updates run.
    pub fn pump(&mut self, clock: &mut impl FrameClock, canvas: &mut impl Canvas) -> u32 {
        if self.pending.take().is_none() {
            return 0;
        }
        let elapsed = clock.frame_time();
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator += elapsed.min(MAX_FRAME_TIME);
        }

        let mut steps = 0;
        while self.accumulator >= FIXED_DT {
            self.organism.update();
            self.accumulator -= FIXED_DT;
            steps += 1;
        }

        self.organism.render(canvas);
        self.schedule();
        steps
    }
}
