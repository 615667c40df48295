// Transport - Playback state and the position shown to the user
// The scheduler owns the state; other threads observe it through SharedPlaybackState

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, Ordering};

use crate::sequencer::tempo::Tempo;

/// Transport state (no pause: stopping always resets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Idle,
    Running,
}

impl TransportState {
    pub fn is_running(&self) -> bool {
        matches!(self, TransportState::Running)
    }
}

/// Current note and subdivision within the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackPosition {
    pub note_index: usize,
    pub subdivision_index: usize,
}

impl PlaybackPosition {
    pub fn new(note_index: usize, subdivision_index: usize) -> Self {
        Self {
            note_index,
            subdivision_index,
        }
    }
}

/// Playback state, owned and mutated exclusively by the scheduler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub(crate) transport: TransportState,
    pub(crate) position: Option<PlaybackPosition>,
    pub(crate) current_tempo: Tempo,
    pub(crate) completed_loops: u64,
}

impl PlaybackState {
    /// Idle state at the given tempo
    pub fn idle(tempo: Tempo) -> Self {
        Self {
            transport: TransportState::Idle,
            position: None,
            current_tempo: tempo,
            completed_loops: 0,
        }
    }

    pub fn transport(&self) -> TransportState {
        self.transport
    }

    pub fn is_running(&self) -> bool {
        self.transport.is_running()
    }

    /// `None` while not playing
    pub fn position(&self) -> Option<PlaybackPosition> {
        self.position
    }

    pub fn current_tempo(&self) -> Tempo {
        self.current_tempo
    }

    /// Full traversals of the sequence since playback started
    pub fn completed_loops(&self) -> u64 {
        self.completed_loops
    }
}

/// Sentinel stored in the shared indices while not playing
pub const NOT_PLAYING: i64 = -1;

/// Shared playback state
/// Thread-safe via atomics so a display thread can follow a running session
#[derive(Debug)]
pub struct SharedPlaybackState {
    running: AtomicBool,
    note_index: AtomicI64,
    subdivision_index: AtomicI64,
    tempo_bpm: AtomicU32,
    completed_loops: AtomicU64,
}

impl SharedPlaybackState {
    /// Create new shared state (idle)
    pub fn new(tempo: Tempo) -> Arc<Self> {
        Arc::new(Self {
            running: AtomicBool::new(false),
            note_index: AtomicI64::new(NOT_PLAYING),
            subdivision_index: AtomicI64::new(NOT_PLAYING),
            tempo_bpm: AtomicU32::new(tempo.bpm()),
            completed_loops: AtomicU64::new(0),
        })
    }

    /// Mirror the scheduler's state
    pub(crate) fn publish(&self, state: &PlaybackState) {
        let (note, subdivision) = match state.position {
            Some(pos) => (pos.note_index as i64, pos.subdivision_index as i64),
            None => (NOT_PLAYING, NOT_PLAYING),
        };
        self.note_index.store(note, Ordering::Relaxed);
        self.subdivision_index.store(subdivision, Ordering::Relaxed);
        self.tempo_bpm
            .store(state.current_tempo.bpm(), Ordering::Relaxed);
        self.completed_loops
            .store(state.completed_loops, Ordering::Relaxed);
        self.running
            .store(state.transport.is_running(), Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Note index, or [`NOT_PLAYING`]
    pub fn note_index(&self) -> i64 {
        self.note_index.load(Ordering::Relaxed)
    }

    /// Subdivision index, or [`NOT_PLAYING`]
    pub fn subdivision_index(&self) -> i64 {
        self.subdivision_index.load(Ordering::Relaxed)
    }

    pub fn position(&self) -> Option<PlaybackPosition> {
        let note = self.note_index();
        let subdivision = self.subdivision_index();
        if note < 0 || subdivision < 0 {
            return None;
        }
        Some(PlaybackPosition::new(note as usize, subdivision as usize))
    }

    pub fn tempo(&self) -> Tempo {
        Tempo::new(self.tempo_bpm.load(Ordering::Relaxed))
    }

    pub fn completed_loops(&self) -> u64 {
        self.completed_loops.load(Ordering::Relaxed)
    }
}
