// Practice session - Single entry point for editing and playing a sequence
//
// The session owns the sequence, the scheduler, the trigger sink and the clock.
// Every state change goes through it, on one thread.

pub mod runner;

use std::ops::ControlFlow;
use std::time::Duration;

use rand::Rng;
use ringbuf::traits::Producer;
use thiserror::Error;

use crate::audio::trigger::{AudioTrigger, TriggerGate};
use crate::config::PracticeConfig;
use crate::messaging::channels::NotificationProducer;
use crate::messaging::command::Command;
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::sequencer::clock::{Timer, TimerHandle};
use crate::sequencer::hand_pattern::{HandPattern, HandPatternBook};
use crate::sequencer::note::{NoteError, NoteId, NoteInstance, NoteKind, Strike};
use crate::sequencer::practice_timer::PracticeTimer;
use crate::sequencer::scheduler::{PlaybackError, PlaybackScheduler, Tick};
use crate::sequencer::sequence::{FillSummary, Sequence};
use crate::sequencer::tempo::Tempo;
use crate::sequencer::tempo_ramp::{RampCycles, TempoRampState};
use crate::sequencer::transport::PlaybackPosition;

pub use runner::{COMMAND_POLL_INTERVAL, run_realtime};

/// Session error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("The sequence cannot be edited while playing")]
    EditWhileRunning,

    #[error("Invalid note: {0}")]
    Note(#[from] NoteError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

/// A practice session
pub struct PracticeSession<T: AudioTrigger, C: Timer> {
    sequence: Sequence,
    scheduler: PlaybackScheduler,
    sink: T,
    clock: C,
    patterns: HandPatternBook,
    kick_enabled: bool,
    include_rest: bool,
    fill_target: usize,
    fill_max_instances: usize,
    practice_timer: PracticeTimer,
    notifications: Option<NotificationProducer>,
}

impl<T: AudioTrigger, C: Timer> PracticeSession<T, C> {
    /// Create an idle session with an empty sequence
    pub fn new(config: &PracticeConfig, sink: T, clock: C) -> Self {
        let scheduler = PlaybackScheduler::new(config.tempo())
            .with_ramp(config.ramp_state())
            .with_gate(config.gate());

        Self {
            sequence: Sequence::new(),
            scheduler,
            sink,
            clock,
            patterns: HandPatternBook::new(),
            kick_enabled: config.kick_enabled,
            include_rest: config.include_rest,
            fill_target: config.fill_target,
            fill_max_instances: config.fill_max_instances,
            practice_timer: PracticeTimer::new(),
            notifications: None,
        }
    }

    /// Publish user-facing notifications on `producer`
    pub fn with_notifications(mut self, producer: NotificationProducer) -> Self {
        self.notifications = Some(producer);
        self
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    pub fn sink(&self) -> &T {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut T {
        &mut self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn tempo(&self) -> Tempo {
        self.scheduler.tempo()
    }

    /// Note and subdivision being played, `None` while stopped
    pub fn position(&self) -> Option<PlaybackPosition> {
        self.scheduler.position()
    }

    pub fn gate(&self) -> TriggerGate {
        self.scheduler.gate()
    }

    pub fn ramp(&self) -> &TempoRampState {
        self.scheduler.ramp()
    }

    pub fn kick_enabled(&self) -> bool {
        self.kick_enabled
    }

    pub fn include_rest(&self) -> bool {
        self.include_rest
    }

    /// Pattern the next `add_note(kind)` will use
    pub fn hand_pattern(&self, kind: NoteKind) -> &HandPattern {
        self.patterns.current(kind)
    }

    // ========== Editing ==========

    /// Append a note of `kind` with its current hand pattern
    pub fn add_note(&mut self, kind: NoteKind) -> Result<NoteId, SessionError> {
        self.ensure_idle()?;

        let pattern = self.patterns.current(kind).clone();
        if pattern.contains_kick() && !self.kick_enabled {
            return Err(NoteError::KickDisabled.into());
        }
        let id = self.sequence.append(kind, pattern)?;
        log::debug!("Added {} (id {})", kind, id);
        Ok(id)
    }

    /// Remove a note by ID
    pub fn remove_note(&mut self, id: NoteId) -> Result<Option<NoteInstance>, SessionError> {
        self.ensure_idle()?;
        Ok(self.sequence.remove(id))
    }

    /// Advance the hand pattern used for new notes of `kind`
    pub fn cycle_hand_pattern(&mut self, kind: NoteKind) -> HandPattern {
        self.patterns.cycle(kind, self.kick_enabled).clone()
    }

    /// Append a random fill, drawing kinds from the sounding catalog
    /// (plus rests when enabled)
    pub fn generate_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<FillSummary, SessionError> {
        self.ensure_idle()?;

        let mut pool = NoteKind::SOUNDING.to_vec();
        if self.include_rest {
            pool.push(NoteKind::Rest);
        }

        let summary =
            self.sequence
                .auto_fill(&pool, self.fill_target, self.fill_max_instances, rng)?;
        log::info!(
            "Random fill: {} notes, {} subdivisions",
            summary.notes_added,
            summary.subdivisions_added
        );
        self.notify(Notification::info(
            NotificationCategory::Sequence,
            "Random sequence added",
            format!("{} notes added", summary.notes_added),
        ));
        Ok(summary)
    }

    /// Stop playback, empty the sequence and reset the practice timer
    pub fn clear(&mut self) {
        self.stop();
        self.sequence.clear();
        let now = self.clock.now();
        self.practice_timer.reset(now);
        log::info!("Sequence cleared");
        self.notify(Notification::info(
            NotificationCategory::Sequence,
            "Sequence cleared",
            "All notes removed",
        ));
    }

    // ========== Playback ==========

    /// Start playing from the first note at the current tempo
    pub fn start(&mut self) -> Result<Tick, SessionError> {
        let tempo = self.scheduler.tempo();
        let result = self
            .scheduler
            .start(&self.sequence, tempo, &mut self.clock, &mut self.sink);

        match result {
            Ok(tick) => {
                self.practice_timer.start(self.clock.now());
                log::info!("Practice started at {}", tempo);
                Ok(tick)
            }
            Err(e) => {
                log::warn!("{}", e);
                self.notify(Notification::warning(
                    NotificationCategory::Playback,
                    "Empty sequence",
                    "Please add some notes to the sequence first",
                ));
                Err(e.into())
            }
        }
    }

    /// Stop playback. Safe to call when stopped.
    pub fn stop(&mut self) {
        let was_running = self.scheduler.is_running();
        self.scheduler.stop(&mut self.clock);
        self.practice_timer.stop(self.clock.now());
        if was_running {
            log::info!(
                "Practice stopped, total {}",
                self.practice_timer.display(self.clock.now())
            );
        }
    }

    /// Set the tempo from a raw control value (clamped, snapped to steps of 5)
    pub fn set_tempo(&mut self, bpm: u32) -> Tempo {
        let tempo = Tempo::from_control(bpm);
        self.scheduler.set_tempo(tempo);
        tempo
    }

    /// Handle a firing of the session clock
    pub fn on_timer(&mut self, handle: TimerHandle) -> Option<Tick> {
        self.scheduler
            .advance(handle, &mut self.clock, &mut self.sink)
    }

    /// Total time spent playing
    pub fn practice_time(&self) -> Duration {
        self.practice_timer.elapsed(self.clock.now())
    }

    /// Practice time as `HH:MM:SS`
    pub fn practice_time_display(&self) -> String {
        self.practice_timer.display(self.clock.now())
    }

    // ========== Settings ==========

    pub fn set_click_enabled(&mut self, enabled: bool) {
        self.scheduler.set_click_enabled(enabled);
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.scheduler.set_sound_enabled(enabled);
    }

    pub fn set_ramp_enabled(&mut self, enabled: bool) {
        self.scheduler.set_ramp_enabled(enabled);
    }

    pub fn set_ramp_cycles(&mut self, cycles: RampCycles) {
        self.scheduler.set_ramp_cycles(cycles);
    }

    pub fn set_include_rest(&mut self, enabled: bool) {
        self.include_rest = enabled;
    }

    /// Toggle kick strikes. Disabling resets the current pattern of every
    /// kind that holds a kick back to all-right.
    pub fn set_kick_enabled(&mut self, enabled: bool) {
        self.kick_enabled = enabled;
        if enabled {
            return;
        }
        for kind in NoteKind::SOUNDING {
            if self.patterns.current(kind).contains_kick() {
                let reset = HandPattern::uniform(Strike::Right, kind.subdivisions());
                if let Err(e) = self.patterns.set(kind, reset) {
                    log::error!("Failed to reset {} pattern: {}", kind, e);
                }
            }
        }
    }

    /// Apply a control message. Breaks on [`Command::Quit`].
    pub fn apply(&mut self, command: Command) -> ControlFlow<()> {
        log::trace!("Command: {:?}", command);
        match command {
            Command::Start => {
                if let Err(e) = self.start() {
                    log::debug!("Start command ignored: {}", e);
                }
            }
            Command::Stop => self.stop(),
            Command::SetTempo(bpm) => {
                self.set_tempo(bpm);
            }
            Command::SetClickEnabled(enabled) => self.set_click_enabled(enabled),
            Command::SetSoundEnabled(enabled) => self.set_sound_enabled(enabled),
            Command::SetRampEnabled(enabled) => self.set_ramp_enabled(enabled),
            Command::SetRampCycles(cycles) => self.set_ramp_cycles(cycles),
            Command::Quit => {
                self.stop();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.scheduler.is_running() {
            return Err(SessionError::EditWhileRunning);
        }
        Ok(())
    }

    fn notify(&mut self, notification: Notification) {
        if let Some(tx) = self.notifications.as_mut() {
            if tx.try_push(notification).is_err() {
                log::warn!("Notification queue full, dropping notification");
            }
        }
    }
}
