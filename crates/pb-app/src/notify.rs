//! Transient notifications
//!
//! A single slot: showing a notification replaces the visible one, and it
//! disappears once its display duration has passed.
//!
//! Expiry only governs what is on screen. Every notification is also queued
//! until a front end takes it, so one raised before a slow reload is still
//! delivered after it.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Undelivered notifications kept before the oldest is dropped
const MAX_UNREAD: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

impl Severity {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✔",
            Self::Error => "✖",
            Self::Info => "ℹ",
            Self::Warning => "⚠",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    shown_at: Instant,
}

impl Notification {
    pub fn shown_at(&self) -> Instant {
        self.shown_at
    }
}

#[derive(Debug, Clone)]
pub struct Notifier {
    duration: Duration,
    current: Option<Notification>,
    unread: VecDeque<Notification>,
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            current: None,
            unread: VecDeque::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn show(&mut self, message: impl Into<String>, severity: Severity) {
        self.show_at(message, severity, Instant::now());
    }

    pub fn show_at(&mut self, message: impl Into<String>, severity: Severity, now: Instant) {
        let note = Notification {
            message: message.into(),
            severity,
            shown_at: now,
        };
        if self.unread.len() == MAX_UNREAD {
            self.unread.pop_front();
        }
        self.unread.push_back(note.clone());
        self.current = Some(note);
    }

    /// Notifications raised since the last call, oldest first, whether or
    /// not they are still visible
    pub fn take_unread(&mut self) -> Vec<Notification> {
        self.unread.drain(..).collect()
    }

    /// The notification still on screen at `now`
    pub fn visible_at(&self, now: Instant) -> Option<&Notification> {
        self.current
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.shown_at) < self.duration)
    }

    pub fn visible(&self) -> Option<&Notification> {
        self.visible_at(Instant::now())
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_hide_after_duration() {
        let mut notifier = Notifier::new(Duration::from_secs(3));
        let start = Instant::now();
        notifier.show_at("Contact added", Severity::Success, start);

        let visible = notifier.visible_at(start + Duration::from_millis(2999)).unwrap();
        assert_eq!(visible.message, "Contact added");
        assert_eq!(visible.severity.icon(), "✔");

        assert!(notifier.visible_at(start + Duration::from_secs(3)).is_none());
    }

    #[test]
    fn test_new_notification_overwrites() {
        let mut notifier = Notifier::new(Duration::from_secs(3));
        let start = Instant::now();
        notifier.show_at("first", Severity::Info, start);
        notifier.show_at("second", Severity::Error, start + Duration::from_secs(2));

        // Timer restarts with the replacement
        let visible = notifier.visible_at(start + Duration::from_secs(4)).unwrap();
        assert_eq!(visible.message, "second");
        assert_eq!(visible.severity, Severity::Error);
    }

    #[test]
    fn test_expired_notification_is_still_delivered_once() {
        let mut notifier = Notifier::new(Duration::from_millis(50));
        let start = Instant::now();
        notifier.show_at("Contact deleted", Severity::Success, start);

        let later = start + Duration::from_millis(120);
        assert!(notifier.visible_at(later).is_none());

        let unread = notifier.take_unread();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].message, "Contact deleted");
        assert!(notifier.take_unread().is_empty());
    }

    #[test]
    fn test_unread_keeps_order_and_is_bounded() {
        let mut notifier = Notifier::new(Duration::from_secs(3));
        for i in 0..MAX_UNREAD + 2 {
            notifier.show(format!("note {}", i), Severity::Info);
        }
        let unread = notifier.take_unread();
        assert_eq!(unread.len(), MAX_UNREAD);
        assert_eq!(unread[0].message, "note 2");
        assert_eq!(unread[MAX_UNREAD - 1].message, format!("note {}", MAX_UNREAD + 1));
    }

    #[test]
    fn test_dismiss() {
        let mut notifier = Notifier::new(Duration::from_secs(3));
        notifier.show("bye", Severity::Warning);
        notifier.dismiss();
        assert!(notifier.visible().is_none());
    }
}
