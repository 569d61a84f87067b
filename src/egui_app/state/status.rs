//! Footer status line and its short history.

use std::collections::VecDeque;
use std::time::Instant;

use crate::train::progress::READY_STATUS;

const HISTORY_LIMIT: usize = 50;

/// Severity of a footer status message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Idle,
    Busy,
    Info,
    Warning,
    Error,
}

impl StatusTone {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Busy => "Working",
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

/// A message that has been replaced in the footer.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusEntry {
    pub tone: StatusTone,
    pub text: String,
    pub shown_at: Instant,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusBarState {
    pub text: String,
    pub tone: StatusTone,
    shown_at: Instant,
    /// Replaced messages, newest first.
    history: VecDeque<StatusEntry>,
}

impl StatusBarState {
    pub fn idle() -> Self {
        Self {
            text: READY_STATUS.into(),
            tone: StatusTone::Idle,
            shown_at: Instant::now(),
            history: VecDeque::new(),
        }
    }

    pub fn badge_label(&self) -> &'static str {
        self.tone.label()
    }

    pub fn history(&self) -> impl Iterator<Item = &StatusEntry> {
        self.history.iter()
    }

    /// Show `text`. Repeating the current text only changes the tone.
    pub(crate) fn set(&mut self, text: String, tone: StatusTone) {
        if self.text != text {
            let replaced = StatusEntry {
                tone: self.tone,
                text: std::mem::replace(&mut self.text, text),
                shown_at: self.shown_at,
            };
            self.history.push_front(replaced);
            self.history.truncate(HISTORY_LIMIT);
            self.shown_at = Instant::now();
        }
        self.tone = tone;
    }
}
