// Audio triggers - The sink the scheduler fires click and strike cues into
//
// Triggers are fire-and-forget: a sink never blocks and never reports a failure
// back to the scheduler. Failures are logged and counted inside the sink.

use ringbuf::traits::Producer;
use thiserror::Error;

use crate::messaging::channels::TriggerProducer;
use crate::sequencer::note::Strike;

/// A cue produced on a subdivision boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    Click,
    Strike(Strike),
}

/// Failure inside a trigger sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("Trigger queue full, dropped {0:?}")]
    QueueFull(TriggerEvent),
}

/// Audio trigger sink
pub trait AudioTrigger {
    /// Metronome click, fired on every subdivision while clicks are enabled
    fn trigger_click(&mut self);

    /// Percussive strike, fired on sounding subdivisions while sound is enabled
    fn trigger_strike(&mut self, strike: Strike);
}

impl<T: AudioTrigger + ?Sized> AudioTrigger for &mut T {
    fn trigger_click(&mut self) {
        (**self).trigger_click();
    }

    fn trigger_strike(&mut self, strike: Strike) {
        (**self).trigger_strike(strike);
    }
}

impl<T: AudioTrigger + ?Sized> AudioTrigger for Box<T> {
    fn trigger_click(&mut self) {
        (**self).trigger_click();
    }

    fn trigger_strike(&mut self, strike: Strike) {
        (**self).trigger_strike(strike);
    }
}

/// Enable flags of the two trigger channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerGate {
    pub click_enabled: bool,
    pub sound_enabled: bool,
}

impl TriggerGate {
    pub fn new(click_enabled: bool, sound_enabled: bool) -> Self {
        Self {
            click_enabled,
            sound_enabled,
        }
    }

    /// Both channels open
    pub fn all() -> Self {
        Self::new(true, true)
    }

    /// Fire one subdivision: the click (if enabled), then the strike
    /// (if there is one and sound is enabled)
    pub fn fire<T: AudioTrigger + ?Sized>(&self, sink: &mut T, strike: Option<Strike>) {
        if self.click_enabled {
            sink.trigger_click();
        }
        if let Some(strike) = strike {
            if self.sound_enabled {
                sink.trigger_strike(strike);
            }
        }
    }
}

impl Default for TriggerGate {
    fn default() -> Self {
        Self::new(true, false)
    }
}

/// Keeps every trigger in memory (tests, offline rendering)
#[derive(Debug, Clone, Default)]
pub struct RecordingTrigger {
    events: Vec<TriggerEvent>,
}

impl RecordingTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TriggerEvent] {
        &self.events
    }

    /// Take the recorded events, leaving the recorder empty
    pub fn drain(&mut self) -> Vec<TriggerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn strikes(&self) -> Vec<Strike> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TriggerEvent::Strike(strike) => Some(*strike),
                TriggerEvent::Click => None,
            })
            .collect()
    }

    pub fn click_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TriggerEvent::Click))
            .count()
    }
}

impl AudioTrigger for RecordingTrigger {
    fn trigger_click(&mut self) {
        self.events.push(TriggerEvent::Click);
    }

    fn trigger_strike(&mut self, strike: Strike) {
        self.events.push(TriggerEvent::Strike(strike));
    }
}

/// Forwards triggers to the audio thread through a lock-free ring buffer
pub struct QueueTrigger {
    producer: TriggerProducer,
    dropped: u64,
}

impl QueueTrigger {
    pub fn new(producer: TriggerProducer) -> Self {
        Self {
            producer,
            dropped: 0,
        }
    }

    fn push(&mut self, event: TriggerEvent) -> Result<(), TriggerError> {
        self.producer
            .try_push(event)
            .map_err(TriggerError::QueueFull)
    }

    fn send(&mut self, event: TriggerEvent) {
        if let Err(e) = self.push(event) {
            self.dropped += 1;
            log::warn!("{} ({} dropped so far)", e, self.dropped);
        }
    }

    /// Triggers lost because the audio thread fell behind
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl AudioTrigger for QueueTrigger {
    fn trigger_click(&mut self) {
        self.send(TriggerEvent::Click);
    }

    fn trigger_strike(&mut self, strike: Strike) {
        self.send(TriggerEvent::Strike(strike));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::channels::create_trigger_channel;
    use ringbuf::traits::Consumer;

    #[test]
    fn test_gate_channels_are_independent() {
        let mut sink = RecordingTrigger::new();

        TriggerGate::new(true, true).fire(&mut sink, Some(Strike::Left));
        assert_eq!(
            sink.drain(),
            vec![TriggerEvent::Click, TriggerEvent::Strike(Strike::Left)]
        );

        TriggerGate::new(false, true).fire(&mut sink, Some(Strike::Kick));
        assert_eq!(sink.drain(), vec![TriggerEvent::Strike(Strike::Kick)]);

        TriggerGate::new(true, false).fire(&mut sink, Some(Strike::Right));
        assert_eq!(sink.drain(), vec![TriggerEvent::Click]);

        TriggerGate::new(false, false).fire(&mut sink, Some(Strike::Right));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_rest_still_clicks() {
        let mut sink = RecordingTrigger::new();
        TriggerGate::all().fire(&mut sink, None);
        assert_eq!(sink.events(), &[TriggerEvent::Click]);
    }

    #[test]
    fn test_recording_helpers() {
        let mut sink = RecordingTrigger::new();
        let gate = TriggerGate::all();
        gate.fire(&mut sink, Some(Strike::Right));
        gate.fire(&mut sink, None);
        gate.fire(&mut sink, Some(Strike::Left));

        assert_eq!(sink.click_count(), 3);
        assert_eq!(sink.strikes(), vec![Strike::Right, Strike::Left]);
    }

    #[test]
    fn test_queue_trigger_forwards_events() {
        let (producer, mut consumer) = create_trigger_channel(8);
        let mut sink = QueueTrigger::new(producer);

        sink.trigger_click();
        sink.trigger_strike(Strike::Kick);

        assert_eq!(consumer.try_pop(), Some(TriggerEvent::Click));
        assert_eq!(consumer.try_pop(), Some(TriggerEvent::Strike(Strike::Kick)));
        assert_eq!(consumer.try_pop(), None);
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn test_queue_full_is_swallowed() {
        let (producer, _consumer) = create_trigger_channel(2);
        let mut sink = QueueTrigger::new(producer);

        for _ in 0..5 {
            sink.trigger_click();
        }

        assert_eq!(sink.dropped(), 3);
    }

    #[test]
    fn test_boxed_sink() {
        let mut recorder = RecordingTrigger::new();
        {
            let mut boxed: Box<dyn AudioTrigger + '_> = Box::new(&mut recorder);
            boxed.trigger_click();
        }
        assert_eq!(recorder.click_count(), 1);
    }
}
