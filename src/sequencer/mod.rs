// Sequencer module - Note catalog, practice sequences and the playback scheduler

pub mod clock;
pub mod hand_pattern;
pub mod note;
pub mod practice_timer;
pub mod render;
pub mod scheduler;
pub mod sequence;
pub mod tempo;
pub mod tempo_ramp;
pub mod transport;

pub use clock::{ManualClock, RealtimeClock, Timer, TimerHandle};
pub use hand_pattern::{HandPattern, HandPatternBook, cycle_pattern, random_pattern};
pub use note::{NoteError, NoteId, NoteInstance, NoteKind, Strike};
pub use practice_timer::{PracticeTimer, format_hms};
pub use render::{RenderedTimeline, TimedTrigger, render_timeline};
pub use scheduler::{PlaybackError, PlaybackScheduler, Tick};
pub use sequence::{FillSummary, Sequence};
pub use tempo::{MAX_BPM, MIN_BPM, Tempo, beat_duration_ms};
pub use tempo_ramp::{RampCycles, TempoRampState};
pub use transport::{PlaybackPosition, PlaybackState, SharedPlaybackState, TransportState};
