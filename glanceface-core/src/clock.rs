//! Time and date text
//!
//! Pure functions of a wall-clock reading and the 12h/24h preference.
//! The date is recomputed on every tick even when it has not changed.

use core::fmt::Write;

use heapless::String;

/// `HH:MM`
pub const TIME_TEXT_LEN: usize = 5;

/// `MM/DD`
pub const DATE_TEXT_LEN: usize = 5;

/// Time text: 5 chars, or 4 for 12h hours 1-9
pub type TimeText = String<TIME_TEXT_LEN>;

/// Date text, always 5 chars
pub type DateText = String<DATE_TEXT_LEN>;

/// Reading outside the calendar ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    InvalidHour,
    InvalidMinute,
    InvalidMonth,
    InvalidDay,
}

/// Wall-clock reading taken at a minute tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockReading {
    hour: u8,
    minute: u8,
    month: u8,
    day: u8,
}

impl ClockReading {
    /// Create a reading
    ///
    /// - `hour`: 0-23
    /// - `minute`: 0-59
    /// - `month`: 1-12
    /// - `day`: 1-31
    pub fn new(hour: u8, minute: u8, month: u8, day: u8) -> Result<Self, ClockError> {
        if hour > 23 {
            return Err(ClockError::InvalidHour);
        }
        if minute > 59 {
            return Err(ClockError::InvalidMinute);
        }
        if !(1..=12).contains(&month) {
            return Err(ClockError::InvalidMonth);
        }
        if !(1..=31).contains(&day) {
            return Err(ClockError::InvalidDay);
        }
        Ok(Self {
            hour,
            minute,
            month,
            day,
        })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    /// Hour on a 12-hour dial (1-12)
    pub fn hour12(&self) -> u8 {
        match self.hour % 12 {
            0 => 12,
            h => h,
        }
    }
}

/// User's clock style preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockStyle {
    #[default]
    TwelveHour,
    TwentyFourHour,
}

/// Source of the clock style, queried on every tick
pub trait ClockStyleSource {
    fn is_24h_style(&self) -> bool;
}

impl ClockStyleSource for ClockStyle {
    fn is_24h_style(&self) -> bool {
        matches!(self, ClockStyle::TwentyFourHour)
    }
}

impl ClockStyleSource for bool {
    fn is_24h_style(&self) -> bool {
        *self
    }
}

/// Format a reading as `(time, date)`
pub fn format(reading: &ClockReading, use_24h: bool) -> (TimeText, DateText) {
    (format_time(reading, use_24h), format_date(reading))
}

/// `MM/DD`, independent of clock style
pub fn format_date(reading: &ClockReading) -> DateText {
    let mut text = DateText::new();
    // Validated ranges keep this at 5 chars
    let _ = write!(text, "{:02}/{:02}", reading.month, reading.day);
    text
}

/// `HH:MM` in 24h mode; 12h mode drops a leading zero
///
/// The 12h result is 4 chars wide for hours 1-9 and 5 chars for 10-12.
/// Alignment is left to the renderer.
pub fn format_time(reading: &ClockReading, use_24h: bool) -> TimeText {
    let hour = if use_24h {
        reading.hour
    } else {
        reading.hour12()
    };

    let mut text = TimeText::new();
    let _ = write!(text, "{:02}:{:02}", hour, reading.minute);

    if !use_24h && text.starts_with('0') {
        let mut stripped = TimeText::new();
        let _ = stripped.push_str(&text[1..]);
        return stripped;
    }
    text
}
