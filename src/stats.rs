//! Pipeline counters shared with the supervisor
//!
//! Each counter has exactly one writing task; the supervisor only reads.

use portable_atomic::{AtomicU32, Ordering};

pub struct PipelineStats {
    reads_requested: AtomicU32,
    samples_forwarded: AtomicU32,
    frames_drawn: AtomicU32,
    lines_printed: AtomicU32,
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsSnapshot {
    pub reads_requested: u32,
    pub samples_forwarded: u32,
    pub frames_drawn: u32,
    pub lines_printed: u32,
}

impl PipelineStats {
    pub const fn new() -> Self {
        Self {
            reads_requested: AtomicU32::new(0),
            samples_forwarded: AtomicU32::new(0),
            frames_drawn: AtomicU32::new(0),
            lines_printed: AtomicU32::new(0),
        }
    }

    pub fn record_read_request(&self) {
        self.reads_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_samples(&self, count: usize) {
        self.samples_forwarded
            .fetch_add(count as u32, Ordering::Relaxed);
    }

    pub fn record_frame(&self) {
        self.frames_drawn.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_line(&self) {
        self.lines_printed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reads_requested: self.reads_requested.load(Ordering::Relaxed),
            samples_forwarded: self.samples_forwarded.load(Ordering::Relaxed),
            frames_drawn: self.frames_drawn.load(Ordering::Relaxed),
            lines_printed: self.lines_printed.load(Ordering::Relaxed),
        }
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}
