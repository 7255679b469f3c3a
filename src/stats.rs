// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::{
    sync::LazyLock,
    time::{Duration, Instant},
};

struct Totals {
    frames: u64,
    elapsed: Duration,
    since: Instant,
}

impl Totals {
    fn zero() -> Self {
        Self {
            frames: 0,
            elapsed: Duration::ZERO,
            since: Instant::now(),
        }
    }
}

/// Frame count and cumulative processing time.
///
/// Both values are updated under one lock, so a reader never sees a frame
/// counted without its time.
pub struct ThroughputCounters {
    totals: Mutex<Totals>,
}

/// Point-in-time view of a [`ThroughputCounters`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub frames: u64,
    pub total: Duration,
    /// Wall time since construction or the last reset.
    pub window: Duration,
}

impl StatsSnapshot {
    pub fn average(&self) -> Duration {
        if self.frames == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos((self.total.as_nanos() / u128::from(self.frames)) as u64)
        }
    }

    pub fn fps(&self) -> f64 {
        let secs = self.window.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "frames": self.frames,
            "total_us": self.total.as_micros() as u64,
            "average_us": self.average().as_micros() as u64,
            "fps": (self.fps() * 10.0).round() / 10.0,
        })
    }
}

impl Default for ThroughputCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl ThroughputCounters {
    pub fn new() -> Self {
        Self {
            totals: Mutex::new(Totals::zero()),
        }
    }

    /// Counts one frame that took `duration` to process.
    pub fn record(&self, duration: Duration) {
        let mut t = self.totals.lock();
        t.frames += 1;
        t.elapsed += duration;
    }

    /// Returns `(frame count, total processing time)`.
    pub fn query(&self) -> (u64, Duration) {
        let t = self.totals.lock();
        (t.frames, t.elapsed)
    }

    pub fn reset(&self) {
        *self.totals.lock() = Totals::zero();
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let t = self.totals.lock();
        StatsSnapshot {
            frames: t.frames,
            total: t.elapsed,
            window: t.since.elapsed(),
        }
    }
}

static GLOBAL: LazyLock<ThroughputCounters> = LazyLock::new(ThroughputCounters::new);

/// Process-wide counters reported through the JNI stats entry points.
pub fn global() -> &'static ThroughputCounters {
    &GLOBAL
}
