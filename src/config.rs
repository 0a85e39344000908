#![cfg(feature = "std")]

//! Runtime timing configuration.

use std::time::Duration;

use crate::core::config::{
    BUTTON_DEBOUNCE_MS, DISPLAY_PERIOD_MS, FEEDBACK_PERIOD_MS, KEY_DEBOUNCE_MS, POLL_PERIOD_MS,
};

/// Shortest period any periodic task may run at.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Periods and windows used by the runtime tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KernelConfig {
    /// Digit multiplexer tick.
    pub display_period: Duration,
    /// LED/buzzer toggle tick.
    pub feedback_period: Duration,
    /// Foreground poll tick (keypad scan, load detection).
    pub poll_period: Duration,
    /// Minimum spacing of accepted keypad presses.
    pub key_debounce: Duration,
    /// Minimum spacing of forwarded confirm-button edges.
    pub button_debounce: Duration,
    /// Give up if the map has not fully arrived within this time.
    pub load_timeout: Option<Duration>,
    /// Capacity of the event queue into the foreground loop.
    pub event_queue: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            display_period: Duration::from_millis(DISPLAY_PERIOD_MS),
            feedback_period: Duration::from_millis(FEEDBACK_PERIOD_MS),
            poll_period: Duration::from_millis(POLL_PERIOD_MS),
            key_debounce: Duration::from_millis(KEY_DEBOUNCE_MS),
            button_debounce: Duration::from_millis(BUTTON_DEBOUNCE_MS),
            load_timeout: None,
            event_queue: 8,
        }
    }
}

impl KernelConfig {
    /// Timings for simulated hardware driven by software: no debounce and
    /// fast feedback, so scripted input is never swallowed.
    pub fn simulated() -> Self {
        Self {
            feedback_period: Duration::from_millis(5),
            key_debounce: Duration::ZERO,
            button_debounce: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Periods clamped to [`MIN_PERIOD`] and a non-empty queue.
    pub fn normalized(mut self) -> Self {
        self.display_period = self.display_period.max(MIN_PERIOD);
        self.feedback_period = self.feedback_period.max(MIN_PERIOD);
        self.poll_period = self.poll_period.max(MIN_PERIOD);
        self.event_queue = self.event_queue.max(1);
        self
    }
}
