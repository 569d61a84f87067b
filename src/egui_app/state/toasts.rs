//! Transient notifications stacked in the top-right corner.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::train::{Notification, NotificationTone};

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(5);
const MAX_TOASTS: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub tone: NotificationTone,
    pub title: String,
    pub description: String,
    pub created_at: Instant,
}

#[derive(Clone, Debug, Default)]
pub struct ToastQueue {
    items: VecDeque<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn items(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, notification: Notification, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push_back(Toast {
            id,
            tone: notification.tone,
            title: notification.title,
            description: notification.description,
            created_at: now,
        });
        while self.items.len() > MAX_TOASTS {
            self.items.pop_front();
        }
        id
    }

    /// Drop toasts older than [`TOAST_TTL`]. Returns whether any expired.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        self.items
            .retain(|toast| now.saturating_duration_since(toast.created_at) < TOAST_TTL);
        before != self.items.len()
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|toast| toast.id != id);
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.items.back()
    }
}
