//! Remaining-time display
//!
//! Turns a number of remaining seconds into the zero-padded `MM:SS` value
//! shown while a cycle counts down.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Remaining time split into whole minutes and seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    /// Whole minutes remaining
    pub minutes: u64,
    /// Seconds past the last whole minute (0..60)
    pub seconds: u64,
}

impl Countdown {
    /// `00:00`, shown when nothing is counting down
    pub const ZERO: Self = Self {
        minutes: 0,
        seconds: 0,
    };

    /// Split a remaining-seconds value into minutes and seconds
    #[must_use]
    pub const fn from_seconds(remaining: u64) -> Self {
        Self {
            minutes: remaining / 60,
            seconds: remaining % 60,
        }
    }

    /// Remaining time for a countdown of `total` seconds after `elapsed` have passed.
    ///
    /// Elapsed time beyond the total clamps to zero remaining.
    #[must_use]
    pub fn remaining(total: u64, elapsed: u64) -> Self {
        Self::from_seconds(total - elapsed.min(total))
    }

    /// The four digits of `MM:SS`, one per display cell
    #[must_use]
    pub fn digits(self) -> [char; 4] {
        let text = format!("{:02}{:02}", self.minutes, self.seconds);
        let mut chars = text.chars();
        let mut next = || chars.next().unwrap_or('0');
        [next(), next(), next(), next()]
    }

    /// Window title text, e.g. `24:59 - Write report`
    #[must_use]
    pub fn title(self, task: &str) -> String {
        format!("{self} - {task}")
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_pads_both_fields() {
        assert_eq!(Countdown::from_seconds(1).to_string(), "00:01");
        assert_eq!(Countdown::from_seconds(65).to_string(), "01:05");
        assert_eq!(Countdown::from_seconds(25 * 60).to_string(), "25:00");
        assert_eq!(Countdown::ZERO.to_string(), "00:00");
    }

    #[test]
    fn test_remaining_clamps_overrun() {
        assert_eq!(Countdown::remaining(300, 299), Countdown::from_seconds(1));
        assert_eq!(Countdown::remaining(300, 300), Countdown::ZERO);
        assert_eq!(Countdown::remaining(300, 9000), Countdown::ZERO);
        assert_eq!(Countdown::remaining(300, 0).to_string(), "05:00");
    }

    #[test]
    fn test_digits_match_display() {
        assert_eq!(Countdown::from_seconds(59 * 60 + 7).digits(), ['5', '9', '0', '7']);
        assert_eq!(Countdown::ZERO.digits(), ['0', '0', '0', '0']);
    }

    #[test]
    fn test_title_includes_task() {
        assert_eq!(
            Countdown::from_seconds(1499).title("Write report"),
            "24:59 - Write report"
        );
    }
}
