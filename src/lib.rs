// Rudiment Trainer - Library exports for the CLI, tests and benchmarks

pub mod audio;
pub mod config;
pub mod messaging;
pub mod sequencer;
pub mod session;

// Re-export commonly used types for convenience
pub use audio::trigger::{AudioTrigger, QueueTrigger, RecordingTrigger, TriggerEvent, TriggerGate};
pub use config::{ConfigError, PracticeConfig};
pub use messaging::channels::{
    create_command_channel, create_notification_channel, create_trigger_channel,
};
pub use messaging::{Command, Notification};
pub use sequencer::{
    HandPattern, ManualClock, NoteInstance, NoteKind, PlaybackError, PlaybackPosition,
    PlaybackScheduler, RampCycles, RealtimeClock, Sequence, Strike, Tempo, TempoRampState, Timer,
    render_timeline,
};
pub use session::{PracticeSession, SessionError, run_realtime};
