// Notifications - User-facing messages emitted by a practice session

use std::time::{SystemTime, UNIX_EPOCH};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
}

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    Playback,
    Sequence,
}

/// Notification with timestamp and metadata
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub category: NotificationCategory,
    pub title: String,
    pub message: String,
    pub timestamp: u64, // Unix timestamp in milliseconds
}

impl Notification {
    /// Creates a notification stamped with the current time
    pub fn new(
        level: NotificationLevel,
        category: NotificationCategory,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        Self {
            level,
            category,
            title: title.into(),
            message: message.into(),
            timestamp,
        }
    }

    pub fn info(
        category: NotificationCategory,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(NotificationLevel::Info, category, title, message)
    }

    pub fn warning(
        category: NotificationCategory,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(NotificationLevel::Warning, category, title, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_creation() {
        let notif = Notification::warning(
            NotificationCategory::Playback,
            "Empty sequence",
            "Please add some notes to the sequence first",
        );

        assert_eq!(notif.level, NotificationLevel::Warning);
        assert_eq!(notif.category, NotificationCategory::Playback);
        assert_eq!(notif.title, "Empty sequence");
        assert!(notif.timestamp > 0);
    }

    #[test]
    fn test_notification_helpers() {
        let info = Notification::info(NotificationCategory::Sequence, "Info", "");
        let warning = Notification::warning(NotificationCategory::Playback, "Warning", "");

        assert_eq!(info.level, NotificationLevel::Info);
        assert_eq!(warning.level, NotificationLevel::Warning);
        assert_eq!(info.category, NotificationCategory::Sequence);
    }
}
