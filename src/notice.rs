//! Transient error/success banners.
//!
//! Nothing schedules their removal: every render asks `active_*(now)` and an
//! expired notice is simply not shown.

use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub created_at: Instant,
}

impl Notice {
    pub fn new(message: impl Into<String>, created_at: Instant) -> Self {
        Self { message: message.into(), created_at }
    }

    pub fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.created_at) >= window
    }
}

#[derive(Clone, Debug)]
pub struct Notices {
    error: Option<Notice>,
    success: Option<Notice>,
    error_window: Duration,
    success_window: Duration,
}

impl Default for Notices {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(5))
    }
}

impl Notices {
    pub fn new(error_window: Duration, success_window: Duration) -> Self {
        Self { error: None, success: None, error_window, success_window }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(Notice::new(message, Instant::now()));
    }

    pub fn set_success(&mut self, message: impl Into<String>) {
        self.success = Some(Notice::new(message, Instant::now()));
    }

    pub fn clear(&mut self) {
        self.error = None;
        self.success = None;
    }

    /// Last error, regardless of age.
    pub fn last_error(&self) -> Option<&Notice> {
        self.error.as_ref()
    }

    pub fn last_success(&self) -> Option<&Notice> {
        self.success.as_ref()
    }

    pub fn active_error(&self, now: Instant) -> Option<&str> {
        self.error
            .as_ref()
            .filter(|n| !n.is_expired(now, self.error_window))
            .map(|n| n.message.as_str())
    }

    pub fn active_success(&self, now: Instant) -> Option<&str> {
        self.success
            .as_ref()
            .filter(|n| !n.is_expired(now, self.success_window))
            .map(|n| n.message.as_str())
    }
}
