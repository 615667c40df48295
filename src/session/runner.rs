// Realtime runner - Wall-clock loop that drives a session and services commands

use std::ops::ControlFlow;
use std::time::Duration;

use ringbuf::traits::Consumer;

use crate::audio::trigger::AudioTrigger;
use crate::messaging::channels::CommandConsumer;
use crate::sequencer::clock::RealtimeClock;
use crate::session::PracticeSession;

/// Longest time the loop sleeps before checking for commands
pub const COMMAND_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Run `session` until a [`Command::Quit`](crate::messaging::Command::Quit) arrives
///
/// Commands are applied between timer firings on this thread, so the
/// scheduler state never sees concurrent mutation.
pub fn run_realtime<T: AudioTrigger>(
    session: &mut PracticeSession<T, RealtimeClock>,
    commands: &mut CommandConsumer,
) {
    log::info!("Playback loop started");

    loop {
        while let Some(command) = commands.try_pop() {
            if let ControlFlow::Break(()) = session.apply(command) {
                log::info!(
                    "Playback loop finished, practice time {}, worst timer lateness {:.3} ms",
                    session.practice_time_display(),
                    session.clock().max_lateness().as_secs_f64() * 1000.0
                );
                return;
            }
        }

        if let Some(handle) = session.clock_mut().wait_next(COMMAND_POLL_INTERVAL) {
            session.on_timer(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::trigger::RecordingTrigger;
    use crate::config::PracticeConfig;
    use crate::messaging::channels::create_command_channel;
    use crate::messaging::command::Command;
    use crate::sequencer::note::NoteKind;
    use ringbuf::traits::Producer;

    #[test]
    fn test_quit_stops_loop() {
        let mut session = PracticeSession::new(
            &PracticeConfig::default(),
            RecordingTrigger::new(),
            RealtimeClock::new(),
        );
        session.add_note(NoteKind::Sixteenth).unwrap();

        let (mut tx, mut rx) = create_command_channel(8);
        tx.try_push(Command::SetTempo(200)).unwrap();
        tx.try_push(Command::Start).unwrap();
        tx.try_push(Command::Quit).unwrap();

        run_realtime(&mut session, &mut rx);

        assert!(!session.is_running());
        assert_eq!(session.tempo().bpm(), 200);
        assert_eq!(session.sink().click_count(), 1);
    }

    #[test]
    fn test_plays_between_commands() {
        let mut session = PracticeSession::new(
            &PracticeConfig::default(),
            RecordingTrigger::new(),
            RealtimeClock::new(),
        );
        session.add_note(NoteKind::ThirtySecond).unwrap();
        session.set_tempo(200);

        let (mut tx, mut rx) = create_command_channel(8);
        tx.try_push(Command::Start).unwrap();

        let handle = std::thread::spawn(move || {
            run_realtime(&mut session, &mut rx);
            session
        });

        // 200 BPM thirty-seconds fire every 37.5 ms
        std::thread::sleep(Duration::from_millis(300));
        tx.try_push(Command::Quit).unwrap();

        let session = handle.join().unwrap();
        assert!(session.sink().click_count() >= 3);
        assert!(!session.is_running());
    }
}
