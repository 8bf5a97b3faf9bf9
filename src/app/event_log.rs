//! Bounded in-memory event log.
//!
//! Keeps the last [`LOG_CAPACITY`] events as timestamped text lines for a
//! logs endpoint or the local display.  Storage is fixed-capacity; once
//! full the oldest line is dropped to make room.  Telemetry snapshots are
//! not recorded.

use core::fmt::Write as _;

use heapless::{Deque, String};

use super::events::AppEvent;
use super::ports::{Clock, EventSink};

/// Number of lines retained.
pub const LOG_CAPACITY: usize = 100;

/// Maximum length of one line; longer lines are truncated.
pub const LINE_LEN: usize = 128;

pub type LogLine = String<LINE_LEN>;

pub struct EventLog<C: Clock> {
    clock: C,
    lines: Deque<LogLine, LOG_CAPACITY>,
}

impl<C: Clock> EventLog<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            lines: Deque::new(),
        }
    }

    /// Append a free-form line, stamped with the clock's current time.
    pub fn record(&mut self, message: impl core::fmt::Display) {
        let mut line = Truncating(LogLine::new());
        let _ = write!(line, "[{:>10}] {}", self.clock.now_ms(), message);
        let line = line.0;
        if self.lines.is_full() {
            self.lines.pop_front();
        }
        let _ = self.lines.push_back(line);
    }

    /// Lines oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(LogLine::as_str)
    }

    /// The newest `count` lines, oldest first.
    pub fn last(&self, count: usize) -> impl Iterator<Item = &str> {
        let skip = self.lines.len().saturating_sub(count);
        self.entries().skip(skip)
    }

    /// All lines joined with `\n`, each newline-terminated.
    pub fn render(&self) -> std::string::String {
        let mut out = std::string::String::with_capacity(self.lines.len() * 48);
        for line in self.entries() {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Writer that keeps as much of the text as fits, cut on a char boundary.
struct Truncating(LogLine);

impl core::fmt::Write for Truncating {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let room = LINE_LEN - self.0.len();
        let mut end = s.len().min(room);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        // `end` fits by construction.
        let _ = self.0.push_str(&s[..end]);
        Ok(())
    }
}

impl<C: Clock> EventSink for EventLog<C> {
    fn emit(&mut self, event: &AppEvent) {
        if matches!(event, AppEvent::Telemetry(_)) {
            return;
        }
        self.record(event);
    }
}
