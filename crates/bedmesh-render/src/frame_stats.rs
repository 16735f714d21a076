#![forbid(unsafe_code)]

//! Rolling frame-time window.
//!
//! A fixed-capacity ring buffer of the most recent render durations. Memory
//! is bounded by `N` regardless of how long the panel stays open.

use web_time::Duration;

/// Default window length, in frames.
pub const FPS_WINDOW: usize = 10;

/// Reported average FPS before any frame was measured.
pub const DEFAULT_FPS: f64 = 60.0;

/// Ring buffer of the last `N` frame times, in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTimeWindow<const N: usize = FPS_WINDOW> {
    samples: [f64; N],
    /// Next slot to write.
    head: usize,
    len: usize,
}

impl<const N: usize> Default for FrameTimeWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameTimeWindow<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            samples: [0.0; N],
            head: 0,
            len: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len == N
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Record one frame, overwriting the oldest once full.
    pub fn record(&mut self, frame: Duration) {
        self.record_ms(frame.as_secs_f64() * 1000.0);
    }

    /// Record one frame time in milliseconds. Negative or non-finite
    /// samples are dropped.
    pub fn record_ms(&mut self, ms: f64) {
        if N == 0 || !ms.is_finite() || ms < 0.0 {
            return;
        }
        self.samples[self.head] = ms;
        self.head = (self.head + 1) % N;
        self.len = (self.len + 1).min(N);
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let start = (self.head + N - self.len) % N.max(1);
        (0..self.len).map(move |i| self.samples[(start + i) % N])
    }

    /// Mean frame time, if any frame was recorded.
    #[must_use]
    pub fn average_ms(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        Some(self.iter().sum::<f64>() / self.len as f64)
    }

    /// Mean FPS over the window, [`DEFAULT_FPS`] when empty.
    #[must_use]
    pub fn average_fps(&self) -> f64 {
        match self.average_ms() {
            None => DEFAULT_FPS,
            Some(ms) => 1000.0 / ms.max(1e-3),
        }
    }
}
