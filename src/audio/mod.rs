// Audio module - Trigger sinks the playback scheduler fires into

pub mod trigger;

pub use trigger::{
    AudioTrigger, QueueTrigger, RecordingTrigger, TriggerError, TriggerEvent, TriggerGate,
};
