// Playback scheduler - Turns a sequence into timed click and strike triggers
//
// The scheduler is an explicit state machine driven by a single owned timer
// handle: start() fires subdivision 0 and arms the timer, every advance() fires
// one subdivision and re-arms it, stop() cancels it. A firing whose handle is
// not the pending one is stale and dropped.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::audio::trigger::{AudioTrigger, TriggerGate};
use crate::sequencer::clock::{Timer, TimerHandle};
use crate::sequencer::note::{NoteInstance, Strike};
use crate::sequencer::sequence::Sequence;
use crate::sequencer::tempo::Tempo;
use crate::sequencer::tempo_ramp::{RampCycles, TempoRampState};
use crate::sequencer::transport::{
    PlaybackPosition, PlaybackState, SharedPlaybackState, TransportState,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("Cannot start playback: the sequence is empty")]
    EmptySequence,
}

/// What happened on one subdivision boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Position that was just triggered
    pub position: PlaybackPosition,
    /// Strike of that subdivision, `None` on rests
    pub strike: Option<Strike>,
    /// The sequence wrapped back to its first note on this boundary
    pub loop_completed: bool,
    /// Tempo the ramp switched to on this boundary
    pub tempo_change: Option<Tempo>,
    /// Delay until the next boundary
    pub next_in: Duration,
}

/// Playback scheduler
pub struct PlaybackScheduler {
    state: PlaybackState,
    ramp: TempoRampState,
    gate: TriggerGate,
    // Snapshot taken at start; edits to the caller's sequence apply on the next start
    notes: Vec<NoteInstance>,
    pending: Option<TimerHandle>,
    shared: Arc<SharedPlaybackState>,
}

impl PlaybackScheduler {
    /// Create an idle scheduler
    pub fn new(tempo: Tempo) -> Self {
        Self {
            state: PlaybackState::idle(tempo),
            ramp: TempoRampState::disabled(),
            gate: TriggerGate::default(),
            notes: Vec::new(),
            pending: None,
            shared: SharedPlaybackState::new(tempo),
        }
    }

    pub fn with_ramp(mut self, ramp: TempoRampState) -> Self {
        self.ramp = ramp;
        self
    }

    pub fn with_gate(mut self, gate: TriggerGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn tempo(&self) -> Tempo {
        self.state.current_tempo
    }

    /// Position of the last trigger, `None` while not playing
    pub fn position(&self) -> Option<PlaybackPosition> {
        self.state.position
    }

    pub fn completed_loops(&self) -> u64 {
        self.state.completed_loops
    }

    /// Handle of the armed timer
    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.pending
    }

    /// Atomically readable mirror of the playback state
    pub fn shared_state(&self) -> Arc<SharedPlaybackState> {
        Arc::clone(&self.shared)
    }

    pub fn ramp(&self) -> &TempoRampState {
        &self.ramp
    }

    pub fn set_ramp_enabled(&mut self, enabled: bool) {
        self.ramp.enabled = enabled;
        if !enabled {
            self.ramp = self.ramp.with_count_reset();
        }
    }

    pub fn set_ramp_cycles(&mut self, cycles: RampCycles) {
        self.ramp.cycles_threshold = cycles;
    }

    pub fn gate(&self) -> TriggerGate {
        self.gate
    }

    pub fn set_click_enabled(&mut self, enabled: bool) {
        self.gate.click_enabled = enabled;
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.gate.sound_enabled = enabled;
    }

    /// Change the tempo, in both idle and running states.
    /// Takes effect from the next subdivision boundary.
    pub fn set_tempo(&mut self, tempo: Tempo) {
        // Tempo values are clamped on construction; re-clamp raw bpm anyway
        self.state.current_tempo = Tempo::new(tempo.bpm());
        self.shared.publish(&self.state);
    }

    /// Start playing `sequence` from its first note
    ///
    /// Fires subdivision 0 of note 0 immediately and arms the timer for the
    /// next boundary. Restarts from the top when already running.
    pub fn start<C, T>(
        &mut self,
        sequence: &Sequence,
        tempo: Tempo,
        timer: &mut C,
        sink: &mut T,
    ) -> Result<Tick, PlaybackError>
    where
        C: Timer + ?Sized,
        T: AudioTrigger + ?Sized,
    {
        if sequence.is_empty() {
            return Err(PlaybackError::EmptySequence);
        }
        if self.is_running() {
            self.stop(timer);
        }

        self.notes = sequence.notes().to_vec();
        self.state = PlaybackState {
            transport: TransportState::Running,
            position: Some(PlaybackPosition::default()),
            current_tempo: Tempo::new(tempo.bpm()),
            completed_loops: 0,
        };
        log::debug!(
            "Playback started: {} notes at {}",
            self.notes.len(),
            self.state.current_tempo
        );

        Ok(self.trigger_and_rearm(
            PlaybackPosition::default(),
            self.state.current_tempo,
            false,
            None,
            timer,
            sink,
        ))
    }

    /// Handle a timer firing: trigger the next subdivision and re-arm
    ///
    /// Returns `None` for a stale firing (stopped meanwhile or superseded).
    pub fn advance<C, T>(
        &mut self,
        fired: TimerHandle,
        timer: &mut C,
        sink: &mut T,
    ) -> Option<Tick>
    where
        C: Timer + ?Sized,
        T: AudioTrigger + ?Sized,
    {
        if !self.is_running() || self.pending != Some(fired) {
            log::trace!("Dropping stale timer firing {}", fired.generation());
            return None;
        }
        self.pending = None;

        let mut position = self.state.position?;
        // Read once per firing; a change made during this firing applies to the next one
        let tempo = self.state.current_tempo;

        position.subdivision_index += 1;
        let mut loop_completed = false;
        let mut tempo_change = None;

        let note_len = self.notes.get(position.note_index)?.subdivisions();
        if position.subdivision_index >= note_len {
            position.note_index += 1;
            position.subdivision_index = 0;

            if position.note_index >= self.notes.len() {
                position.note_index = 0;
                loop_completed = true;
                tempo_change = self.complete_loop();
            }
        }

        Some(self.trigger_and_rearm(position, tempo, loop_completed, tempo_change, timer, sink))
    }

    /// Stop playback and reset the position. Safe to call when idle.
    pub fn stop<C: Timer + ?Sized>(&mut self, timer: &mut C) {
        if let Some(handle) = self.pending.take() {
            timer.cancel(handle);
        }
        if self.is_running() {
            log::debug!(
                "Playback stopped after {} loops",
                self.state.completed_loops
            );
        }

        self.state = PlaybackState::idle(self.state.current_tempo);
        self.ramp = self.ramp.with_count_reset();
        self.notes.clear();
        self.shared.publish(&self.state);
    }

    fn complete_loop(&mut self) -> Option<Tempo> {
        self.state.completed_loops += 1;

        let (ramp, change) = self
            .ramp
            .on_loop_completed(self.state.current_tempo, self.state.transport);
        self.ramp = ramp;

        if let Some(new_tempo) = change {
            log::debug!(
                "Tempo ramp: {} -> {} after loop {}",
                self.state.current_tempo,
                new_tempo,
                self.state.completed_loops
            );
            self.set_tempo(new_tempo);
        }
        change
    }

    fn trigger_and_rearm<C, T>(
        &mut self,
        position: PlaybackPosition,
        tempo: Tempo,
        loop_completed: bool,
        tempo_change: Option<Tempo>,
        timer: &mut C,
        sink: &mut T,
    ) -> Tick
    where
        C: Timer + ?Sized,
        T: AudioTrigger + ?Sized,
    {
        let note = &self.notes[position.note_index];
        let strike = note.strike_at(position.subdivision_index);
        let next_in = tempo.subdivision_duration(note.subdivisions());

        self.gate.fire(sink, strike);

        self.state.position = Some(position);
        self.shared.publish(&self.state);
        self.pending = Some(timer.schedule(next_in));

        Tick {
            position,
            strike,
            loop_completed,
            tempo_change,
            next_in,
        }
    }
}
