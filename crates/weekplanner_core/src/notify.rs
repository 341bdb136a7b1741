//! User-facing notification channel.
//!
//! # Responsibility
//! - Carry rollback and persistence failures to the presentation layer.
//!
//! # Invariants
//! - `notify` never fails and never panics.
//! - Blank titles or messages are dropped.

use std::cell::RefCell;

/// One user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    /// Returns `None` when either part is blank.
    pub fn new(title: &str, message: &str) -> Option<Self> {
        if title.trim().is_empty() || message.trim().is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            message: message.to_string(),
        })
    }
}

/// Best-effort sink for user-visible errors.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// Notifier that queues notifications for a presentation layer to drain.
#[derive(Debug, Default)]
pub struct QueuedNotifier {
    pending: RefCell<Vec<Notification>>,
}

impl QueuedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns all queued notifications in arrival order.
    pub fn drain(&self) -> Vec<Notification> {
        self.pending.take()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

impl Notifier for QueuedNotifier {
    fn notify(&self, title: &str, message: &str) {
        if let Some(notification) = Notification::new(title, message) {
            // A re-entrant notify from inside a borrow would panic; drop instead.
            if let Ok(mut pending) = self.pending.try_borrow_mut() {
                pending.push(notification);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Notification, Notifier, QueuedNotifier};

    #[test]
    fn blank_notifications_are_dropped() {
        assert!(Notification::new(" ", "message").is_none());
        assert!(Notification::new("title", "").is_none());
    }

    #[test]
    fn queued_notifier_drains_in_order() {
        let notifier = QueuedNotifier::new();
        notifier.notify("first", "a");
        notifier.notify("", "ignored");
        notifier.notify("second", "b");

        let drained = notifier.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].title, "first");
        assert_eq!(drained[1].title, "second");
        assert!(notifier.is_empty());
    }
}
