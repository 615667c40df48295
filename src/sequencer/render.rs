// Offline render - Drives the scheduler on virtual time and records every trigger

use std::time::Duration;

use crate::audio::trigger::{RecordingTrigger, TriggerEvent, TriggerGate};
use crate::sequencer::clock::{ManualClock, Timer};
use crate::sequencer::scheduler::{PlaybackError, PlaybackScheduler};
use crate::sequencer::sequence::Sequence;
use crate::sequencer::tempo::Tempo;
use crate::sequencer::tempo_ramp::TempoRampState;
use crate::sequencer::transport::PlaybackPosition;

/// One trigger with the virtual time it fired at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedTrigger {
    pub at: Duration,
    pub event: TriggerEvent,
    pub position: PlaybackPosition,
}

/// Result of [`render_timeline`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedTimeline {
    pub triggers: Vec<TimedTrigger>,
    pub completed_loops: u64,
    pub final_tempo: Option<Tempo>,
}

impl RenderedTimeline {
    /// Triggers of one kind of event, in firing order
    pub fn times_of(&self, event: TriggerEvent) -> Vec<Duration> {
        self.triggers
            .iter()
            .filter(|t| t.event == event)
            .map(|t| t.at)
            .collect()
    }

    /// Subdivision boundaries: every distinct firing time
    pub fn boundaries(&self) -> Vec<Duration> {
        let mut times: Vec<Duration> = self.triggers.iter().map(|t| t.at).collect();
        times.dedup();
        times
    }
}

/// Play `sequence` from t=0 up to and including `horizon`
///
/// Boundaries whose deadline falls after the horizon are not fired; playback
/// is stopped at the end so no timer is left armed.
pub fn render_timeline(
    sequence: &Sequence,
    tempo: Tempo,
    ramp: TempoRampState,
    gate: TriggerGate,
    horizon: Duration,
) -> Result<RenderedTimeline, PlaybackError> {
    let mut clock = ManualClock::new();
    let mut sink = RecordingTrigger::new();
    let mut scheduler = PlaybackScheduler::new(tempo)
        .with_ramp(ramp)
        .with_gate(gate);

    let mut timeline = RenderedTimeline::default();

    let tick = scheduler.start(sequence, tempo, &mut clock, &mut sink)?;
    record(&mut timeline, &mut sink, clock.now(), tick.position);

    while let Some(deadline) = clock.pending_deadline() {
        if deadline > horizon {
            break;
        }
        let Some(handle) = clock.fire_next() else {
            break;
        };
        if let Some(tick) = scheduler.advance(handle, &mut clock, &mut sink) {
            record(&mut timeline, &mut sink, clock.now(), tick.position);
        }
    }

    timeline.completed_loops = scheduler.completed_loops();
    timeline.final_tempo = Some(scheduler.tempo());
    scheduler.stop(&mut clock);

    Ok(timeline)
}

fn record(
    timeline: &mut RenderedTimeline,
    sink: &mut RecordingTrigger,
    at: Duration,
    position: PlaybackPosition,
) {
    timeline
        .triggers
        .extend(sink.drain().into_iter().map(|event| TimedTrigger {
            at,
            event,
            position,
        }));
}
