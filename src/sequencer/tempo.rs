// Tempo - Beats per minute and the subdivision durations derived from it

use std::fmt;
use std::time::Duration;

/// Lowest tempo the trainer plays
pub const MIN_BPM: u32 = 40;
/// Highest tempo the trainer plays
pub const MAX_BPM: u32 = 200;
/// Granularity of tempo controls
pub const BPM_STEP: u32 = 5;
/// Tempo a fresh session starts at
pub const DEFAULT_BPM: u32 = 70;

/// Duration of one beat (quarter note) in milliseconds
pub fn beat_duration_ms(bpm: u32) -> f64 {
    60_000.0 / bpm as f64
}

/// Tempo in BPM (Beats Per Minute)
///
/// Always within [`MIN_BPM`, `MAX_BPM`]; constructors clamp rather than fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tempo {
    bpm: u32,
}

impl Tempo {
    /// Creates a tempo, clamped into the playable range
    pub fn new(bpm: u32) -> Self {
        Self {
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
        }
    }

    /// Tempo as set from a user control: clamped and snapped to the nearest
    /// multiple of [`BPM_STEP`]
    pub fn from_control(bpm: u32) -> Self {
        let snapped = bpm.saturating_add(BPM_STEP / 2) / BPM_STEP * BPM_STEP;
        Self::new(snapped)
    }

    /// Get BPM value
    pub fn bpm(self) -> u32 {
        self.bpm
    }

    /// Duration of one beat in milliseconds
    pub fn beat_duration_ms(self) -> f64 {
        beat_duration_ms(self.bpm)
    }

    /// Duration of one beat
    pub fn beat_duration(self) -> Duration {
        Duration::from_secs_f64(self.beat_duration_ms() / 1000.0)
    }

    /// Duration of one subdivision of a beat split into `subdivisions` equal parts
    pub fn subdivision_duration(self, subdivisions: usize) -> Duration {
        let parts = subdivisions.max(1) as f64;
        Duration::from_secs_f64(self.beat_duration_ms() / parts / 1000.0)
    }

    /// Raise by `step`, never above `ceiling`
    pub fn raised_by(self, step: u32, ceiling: u32) -> Self {
        Self::new(self.bpm.saturating_add(step).min(ceiling))
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

impl From<u32> for Tempo {
    fn from(bpm: u32) -> Self {
        Self::new(bpm)
    }
}

impl From<Tempo> for u32 {
    fn from(tempo: Tempo) -> Self {
        tempo.bpm
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.bpm)
    }
}
