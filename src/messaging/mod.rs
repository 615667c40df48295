// Messaging between the playback loop and the threads that control or observe it

pub mod channels;
pub mod command;
pub mod notification;

pub use channels::{
    CommandConsumer, CommandProducer, NotificationConsumer, NotificationProducer,
    TriggerConsumer, TriggerProducer, create_command_channel, create_notification_channel,
    create_trigger_channel,
};
pub use command::Command;
pub use notification::{Notification, NotificationCategory, NotificationLevel};
