//! Daily capture window evaluation.
//!
//! A window is a pair of wall-clock times at minute granularity. When the
//! start is later than the end the window spans midnight.

use chrono::{NaiveTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// Minutes in one day.
const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    /// Create a time of day from hour (0-23) and minute (0-59).
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self {
                minutes: (hour * 60 + minute) as u16,
            })
        } else {
            None
        }
    }

    /// Truncate a clock reading to its hour and minute. Seconds are dropped.
    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            minutes: (time.hour() * 60 + time.minute()) as u16,
        }
    }

    pub fn hour(&self) -> u32 {
        u32::from(self.minutes / 60)
    }

    pub fn minute(&self) -> u32 {
        u32::from(self.minutes % 60)
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_since_midnight(&self) -> u16 {
        self.minutes
    }

    /// The following minute, wrapping 23:59 to 00:00.
    pub fn next_minute(&self) -> Self {
        Self {
            minutes: (self.minutes + 1) % MINUTES_PER_DAY,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = WindowError;

    /// Parse a 24h `HH:MM` value such as `15:30` or `8:05`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self::from_time)
            .map_err(|_| WindowError::InvalidTime(s.to_string()))
    }
}

/// Errors raised while building or evaluating a capture window.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("Invalid time '{0}'. Use 24h HH:MM format (e.g. 15:30)")]
    InvalidTime(String),

    #[error(
        "Capture start and end are both {time}. To capture around the clock, \
         set the end one minute earlier (e.g. start {time}, end {suggested_end})"
    )]
    EqualBounds {
        time: TimeOfDay,
        suggested_end: TimeOfDay,
    },
}

/// Decide whether `now` falls inside the window `[start, end)`.
///
/// Windows with `start > end` wrap past midnight. Equal bounds are a
/// configuration error.
pub fn is_in_window(now: TimeOfDay, start: TimeOfDay, end: TimeOfDay) -> Result<bool, WindowError> {
    if start < end {
        Ok(start <= now && now < end)
    } else if start > end {
        Ok(now >= start || now < end)
    } else {
        // End one minute before start covers every minute but the last.
        let suggested_end = TimeOfDay {
            minutes: (start.minutes + MINUTES_PER_DAY - 1) % MINUTES_PER_DAY,
        };
        Err(WindowError::EqualBounds {
            time: start,
            suggested_end,
        })
    }
}

/// A validated capture window. Start and end always differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureWindow {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl CaptureWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, WindowError> {
        // Evaluating once surfaces the equal-bounds error up front.
        is_in_window(start, start, end)?;
        Ok(Self { start, end })
    }

    /// Parse both bounds from `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, WindowError> {
        Self::new(start.parse()?, end.parse()?)
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    /// True if the window spans midnight.
    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, now: TimeOfDay) -> bool {
        // Bounds were checked in `new`, so this never sees the error.
        is_in_window(now, self.start, self.end).unwrap_or(false)
    }
}

impl fmt::Display for CaptureWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(t("15:30"), TimeOfDay::new(15, 30).unwrap());
        assert_eq!(t("00:00"), TimeOfDay::new(0, 0).unwrap());
        assert_eq!(t("8:05"), TimeOfDay::new(8, 5).unwrap());
        assert_eq!(t(" 23:59 "), TimeOfDay::new(23, 59).unwrap());
    }

    #[test]
    fn test_parse_time_of_day_rejects_garbage() {
        assert!("25:00".parse::<TimeOfDay>().is_err());
        assert!("12:60".parse::<TimeOfDay>().is_err());
        assert!("noon".parse::<TimeOfDay>().is_err());
        assert!("".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_from_time_drops_seconds() {
        let time = NaiveTime::from_hms_opt(16, 59, 59).unwrap();
        assert_eq!(TimeOfDay::from_time(time), t("16:59"));
    }

    #[test]
    fn test_display_pads() {
        assert_eq!(t("7:05").to_string(), "07:05");
    }

    #[test]
    fn test_next_minute_wraps() {
        assert_eq!(t("23:59").next_minute(), t("00:00"));
        assert_eq!(t("09:59").next_minute(), t("10:00"));
    }

    #[test]
    fn test_same_day_window_boundaries() {
        let (start, end) = (t("09:00"), t("17:00"));
        assert_eq!(is_in_window(t("08:59"), start, end), Ok(false));
        assert_eq!(is_in_window(t("09:00"), start, end), Ok(true));
        assert_eq!(is_in_window(t("09:01"), start, end), Ok(true));
        assert_eq!(is_in_window(t("10:00"), start, end), Ok(true));
        assert_eq!(is_in_window(t("16:59"), start, end), Ok(true));
        assert_eq!(is_in_window(t("17:00"), start, end), Ok(false));
        assert_eq!(is_in_window(t("17:01"), start, end), Ok(false));
        assert_eq!(is_in_window(t("00:00"), start, end), Ok(false));
    }

    #[test]
    fn test_overnight_window_boundaries() {
        let (start, end) = (t("22:00"), t("06:00"));
        assert_eq!(is_in_window(t("21:59"), start, end), Ok(false));
        assert_eq!(is_in_window(t("22:00"), start, end), Ok(true));
        assert_eq!(is_in_window(t("23:30"), start, end), Ok(true));
        assert_eq!(is_in_window(t("23:59"), start, end), Ok(true));
        assert_eq!(is_in_window(t("00:00"), start, end), Ok(true));
        assert_eq!(is_in_window(t("05:59"), start, end), Ok(true));
        assert_eq!(is_in_window(t("06:00"), start, end), Ok(false));
        assert_eq!(is_in_window(t("06:01"), start, end), Ok(false));
        assert_eq!(is_in_window(t("12:00"), start, end), Ok(false));
    }

    #[test]
    fn test_window_ending_at_midnight() {
        let (start, end) = (t("18:00"), t("00:00"));
        assert_eq!(is_in_window(t("23:59"), start, end), Ok(true));
        assert_eq!(is_in_window(t("00:00"), start, end), Ok(false));
        assert_eq!(is_in_window(t("17:59"), start, end), Ok(false));
    }

    #[test]
    fn test_window_starting_at_midnight() {
        let (start, end) = (t("00:00"), t("06:00"));
        assert_eq!(is_in_window(t("00:00"), start, end), Ok(true));
        assert_eq!(is_in_window(t("23:59"), start, end), Ok(false));
    }

    #[test]
    fn test_same_day_window_matches_full_cycle() {
        let (start, end) = (t("09:00"), t("17:00"));
        for m in 0..MINUTES_PER_DAY {
            let now = TimeOfDay { minutes: m };
            let expected = (540..1020).contains(&m);
            assert_eq!(is_in_window(now, start, end), Ok(expected), "at {}", now);
        }
    }

    #[test]
    fn test_overnight_window_matches_full_cycle() {
        let (start, end) = (t("22:00"), t("06:00"));
        for m in 0..MINUTES_PER_DAY {
            let now = TimeOfDay { minutes: m };
            let expected = m >= 1320 || m < 360;
            assert_eq!(is_in_window(now, start, end), Ok(expected), "at {}", now);
        }
    }

    #[test]
    fn test_equal_bounds_is_error_for_every_time() {
        let bound = t("12:00");
        for m in [0, 719, 720, 721, 1439] {
            let now = TimeOfDay { minutes: m };
            let result = is_in_window(now, bound, bound);
            assert!(matches!(result, Err(WindowError::EqualBounds { .. })));
        }
    }

    #[test]
    fn test_equal_bounds_message_suggests_one_minute_earlier() {
        let err = is_in_window(t("00:00"), t("00:00"), t("00:00")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("00:00"));
        assert!(msg.contains("end 23:59"));
    }

    #[test]
    fn test_capture_window_rejects_equal_bounds() {
        assert!(CaptureWindow::parse("08:00", "08:00").is_err());
        assert!(CaptureWindow::parse("08:00", "08:01").is_ok());
    }

    #[test]
    fn test_capture_window_contains_agrees_with_function() {
        let window = CaptureWindow::parse("22:00", "06:00").unwrap();
        assert!(window.wraps_midnight());
        for m in 0..MINUTES_PER_DAY {
            let now = TimeOfDay { minutes: m };
            assert_eq!(
                Ok(window.contains(now)),
                is_in_window(now, window.start(), window.end())
            );
        }
    }

    #[test]
    fn test_capture_window_display() {
        let window = CaptureWindow::parse("9:00", "17:30").unwrap();
        assert_eq!(window.to_string(), "09:00-17:30");
        assert!(!window.wraps_midnight());
    }
}
