//! Battery indicator text
//!
//! Both indicators fit 3 characters by construction: the percentage is
//! only printed for values that need at most two digits.

use core::fmt::Write;

use glanceface_protocol::{BATTERY_CHARGING, BATTERY_UNKNOWN};
use heapless::String;

/// Visible characters of a battery indicator
pub const BATTERY_TEXT_LEN: usize = 3;

/// Battery indicator text
pub type BatteryText = String<BATTERY_TEXT_LEN>;

/// Watch battery levels above this are not shown
pub const LOCAL_BLANK_ABOVE: u8 = 30;

/// Phone battery levels above this are not shown
pub const REMOTE_BLANK_ABOVE: u8 = 60;

const CHARGING_TEXT: &str = "CHR";
const UNKNOWN_TEXT: &str = "Unk";
const BLANK_TEXT: &str = " ";

/// Watch battery state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryState {
    percent: u8,
    charging: bool,
}

impl BatteryState {
    /// Create a battery state, clamping `percent` to 100
    pub fn new(percent: u8, charging: bool) -> Self {
        Self {
            percent: percent.min(100),
            charging,
        }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn is_charging(&self) -> bool {
        self.charging
    }
}

/// Watch battery indicator
///
/// `"CHR"` while charging, blank above 30%, `"<n>%"` otherwise.
pub fn format_local(state: &BatteryState) -> BatteryText {
    if state.charging {
        fixed(CHARGING_TEXT)
    } else if state.percent > LOCAL_BLANK_ABOVE {
        fixed(BLANK_TEXT)
    } else {
        percent(state.percent)
    }
}

/// Phone battery indicator from the raw synced level
///
/// `255` is unknown, `254` is charging, blank above 60%, `"<n>%"` otherwise.
pub fn format_remote(level: u8) -> BatteryText {
    match level {
        BATTERY_UNKNOWN => fixed(UNKNOWN_TEXT),
        BATTERY_CHARGING => fixed(CHARGING_TEXT),
        l if l > REMOTE_BLANK_ABOVE => fixed(BLANK_TEXT),
        l => percent(l),
    }
}

fn fixed(text: &str) -> BatteryText {
    let mut out = BatteryText::new();
    let _ = out.push_str(text);
    out
}

// Callers only pass values up to 60
fn percent(value: u8) -> BatteryText {
    let mut out = BatteryText::new();
    let _ = write!(out, "{}%", value);
    out
}
