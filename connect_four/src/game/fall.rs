//! Timing contract for the cosmetic falling-piece animation.
//!
//! The authority settles a piece synchronously when it accepts a drop. Presenters get a
//! [`FallTiming`] with the outcome and step a [`FallAnimation`] from their own frame loop;
//! nothing here blocks or feeds back into the authority.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::entities::Row;

/// Where a piece starts and ends its fall, and how long the fall lasts.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct FallTiming {
    /// Row coordinate the piece enters from, one above the top row.
    pub origin_row: Row,
    pub landing_row: Row,
    pub duration_ms: u64,
}

impl FallTiming {
    #[must_use]
    pub fn new(rows: usize, landing_row: Row, drop_speed: f32) -> Self {
        let rate = progress_rate(rows, landing_row, drop_speed);
        Self {
            origin_row: rows,
            landing_row,
            duration_ms: (1000.0 / rate).ceil() as u64,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Progress gained per second. Pieces that stop higher up fall proportionally faster.
fn progress_rate(rows: usize, landing_row: Row, drop_speed: f32) -> f32 {
    let distance = rows.saturating_sub(landing_row) as f32;
    drop_speed * ((rows as f32 - distance) + 1.0)
}

/// One rendered step of a fall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallFrame {
    /// Interpolated row coordinate (fractional while in transit).
    pub row_position: f32,
    pub settled: bool,
}

/// Resumable interpolation from the entry row down to the landing row.
#[derive(Clone, Debug)]
pub struct FallAnimation {
    origin: f32,
    landing: f32,
    rate: f32,
    progress: f32,
}

impl FallAnimation {
    #[must_use]
    pub fn new(rows: usize, landing_row: Row, drop_speed: f32) -> Self {
        Self {
            origin: rows as f32,
            landing: landing_row as f32,
            rate: progress_rate(rows, landing_row, drop_speed),
            progress: 0.0,
        }
    }

    #[must_use]
    pub fn from_timing(timing: &FallTiming, rows: usize, drop_speed: f32) -> Self {
        Self::new(rows, timing.landing_row, drop_speed).with_origin(timing.origin_row)
    }

    fn with_origin(mut self, origin_row: Row) -> Self {
        self.origin = origin_row as f32;
        self
    }

    pub fn is_settled(&self) -> bool {
        self.progress >= 1.0
    }

    /// Advance by one frame of `dt` and return the position to draw.
    pub fn advance(&mut self, dt: Duration) -> FallFrame {
        if !self.is_settled() {
            self.progress = (self.progress + dt.as_secs_f32() * self.rate).min(1.0);
        }
        self.frame()
    }

    #[must_use]
    pub fn frame(&self) -> FallFrame {
        FallFrame {
            row_position: self.origin + (self.landing - self.origin) * self.progress,
            settled: self.is_settled(),
        }
    }
}
