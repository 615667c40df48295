// Tempo ramp - Raises the tempo after a number of full sequence loops

use crate::sequencer::tempo::{BPM_STEP, MAX_BPM, Tempo};
use crate::sequencer::transport::TransportState;

/// Ceiling the ramp never exceeds
pub const RAMP_CEILING_BPM: u32 = MAX_BPM;
/// Increment applied at each threshold crossing
pub const RAMP_STEP_BPM: u32 = BPM_STEP;

/// Number of loops between two tempo increases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RampCycles {
    #[default]
    Four,
    Eight,
    Sixteen,
    ThirtyTwo,
}

impl RampCycles {
    pub const ALL: [RampCycles; 4] = [
        RampCycles::Four,
        RampCycles::Eight,
        RampCycles::Sixteen,
        RampCycles::ThirtyTwo,
    ];

    pub fn count(self) -> u32 {
        match self {
            RampCycles::Four => 4,
            RampCycles::Eight => 8,
            RampCycles::Sixteen => 16,
            RampCycles::ThirtyTwo => 32,
        }
    }

    pub fn from_count(count: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|cycles| cycles.count() == count)
    }
}

/// Tempo ramp state, a pure reducer over loop-completion events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoRampState {
    pub enabled: bool,
    pub cycles_threshold: RampCycles,
    pub cycle_count: u32,
    pub ceiling_bpm: u32,
    pub step_bpm: u32,
}

impl TempoRampState {
    pub fn new(enabled: bool, cycles_threshold: RampCycles) -> Self {
        Self {
            enabled,
            cycles_threshold,
            cycle_count: 0,
            ceiling_bpm: RAMP_CEILING_BPM,
            step_bpm: RAMP_STEP_BPM,
        }
    }

    /// Ramp turned off
    pub fn disabled() -> Self {
        Self::new(false, RampCycles::default())
    }

    /// React to one full traversal of the sequence
    ///
    /// Returns the next state and, when the threshold is reached, the tempo
    /// the scheduler should switch to. Events observed while idle are ignored.
    pub fn on_loop_completed(
        self,
        current: Tempo,
        transport: TransportState,
    ) -> (Self, Option<Tempo>) {
        if !self.enabled || !transport.is_running() {
            return (self, None);
        }

        let cycle_count = self.cycle_count + 1;
        if cycle_count < self.cycles_threshold.count() {
            return (
                Self {
                    cycle_count,
                    ..self
                },
                None,
            );
        }

        let raised = current.raised_by(self.step_bpm, self.ceiling_bpm);
        (
            Self {
                cycle_count: 0,
                ..self
            },
            Some(raised),
        )
    }

    /// Discard in-progress ramp progress
    pub fn with_count_reset(self) -> Self {
        Self {
            cycle_count: 0,
            ..self
        }
    }
}

impl Default for TempoRampState {
    fn default() -> Self {
        Self::disabled()
    }
}
