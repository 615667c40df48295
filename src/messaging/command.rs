// Commands - Control messages for a session running on the playback loop

use crate::sequencer::tempo_ramp::RampCycles;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    /// Raw control value, clamped and snapped by the session
    SetTempo(u32),
    SetClickEnabled(bool),
    SetSoundEnabled(bool),
    SetRampEnabled(bool),
    SetRampCycles(RampCycles),
    Quit,
}
