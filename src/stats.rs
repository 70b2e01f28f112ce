//! Rolling frame-rate and population history for the overlay.

/// Fixed-capacity buffer of the most recent samples.
pub struct RingBuffer {
    data: Vec<f32>,
    head: usize,
    len: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn push(&mut self, value: f32) {
        let capacity = self.capacity();
        self.data[self.head] = value;
        self.head = (self.head + 1) % capacity;
        self.len = (self.len + 1).min(capacity);
    }

    /// Samples oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let capacity = self.capacity();
        let start = if self.len < capacity { 0 } else { self.head };
        (0..self.len).map(move |i| self.data[(start + i) % capacity])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn last(&self) -> Option<f32> {
        (self.len > 0).then(|| self.data[(self.head + self.capacity() - 1) % self.capacity()])
    }

    pub fn mean(&self) -> Option<f32> {
        (self.len > 0).then(|| self.iter().sum::<f32>() / self.len as f32)
    }
}

/// Host-frame timings and particle totals, sampled once per rendered frame.
pub struct FrameStats {
    pub frame_times: RingBuffer,
    pub particle_totals: RingBuffer,
    sample_interval: u32,
    frames: u32,
}

impl FrameStats {
    pub fn new(capacity: usize) -> Self {
        Self {
            frame_times: RingBuffer::new(capacity),
            particle_totals: RingBuffer::new(capacity),
            sample_interval: 10,
            frames: 0,
        }
    }

    /// Frame time goes in every call; the particle total every tenth.
    pub fn record(&mut self, frame_time: f32, particles: usize) {
        if frame_time.is_finite() && frame_time > 0.0 {
            self.frame_times.push(frame_time);
        }
        self.frames = self.frames.wrapping_add(1);
        if self.frames % self.sample_interval == 0 {
            self.particle_totals.push(particles as f32);
        }
    }

    /// Mean frames per second over the buffered window.
    pub fn fps(&self) -> f32 {
        match self.frame_times.mean() {
            Some(dt) if dt > 0.0 => 1.0 / dt,
            _ => 0.0,
        }
    }
}
