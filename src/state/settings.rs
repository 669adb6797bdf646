//! Timer settings and input correction

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Allowed range and default for one minutes setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteBounds {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

pub const FOCUS_BOUNDS: MinuteBounds = MinuteBounds { min: 1, max: 90, default: 25 };
pub const SHORT_BREAK_BOUNDS: MinuteBounds = MinuteBounds { min: 1, max: 15, default: 5 };
pub const LONG_BREAK_BOUNDS: MinuteBounds = MinuteBounds { min: 1, max: 60, default: 30 };

impl MinuteBounds {
    /// Clamp an integer into range
    pub fn clamp(&self, value: i64) -> u32 {
        let clamped = value.clamp(i64::from(self.min), i64::from(self.max));
        u32::try_from(clamped).unwrap_or(self.default)
    }

    /// Correct arbitrary user input into range.
    ///
    /// Numbers are truncated and clamped, strings are parsed by their leading
    /// integer, anything that does not yield a number becomes the default.
    pub fn correct(&self, raw: &Value) -> u32 {
        let parsed = match raw {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
            Value::String(s) => leading_integer(s),
            _ => None,
        };

        match parsed {
            Some(value) => self.clamp(value),
            None => self.default,
        }
    }
}

/// Parse the leading (optionally signed) integer of `s`, ignoring trailing text
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long inputs; they clamp to the max anyway
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * value)
}

/// User-configurable session lengths in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "focusTime")]
    pub focus_minutes: u32,
    #[serde(rename = "shortBreakTime")]
    pub short_break_minutes: u32,
    #[serde(rename = "longBreakTime")]
    pub long_break_minutes: u32,
}

impl Settings {
    pub fn new(focus_minutes: u32, short_break_minutes: u32, long_break_minutes: u32) -> Self {
        Self {
            focus_minutes,
            short_break_minutes,
            long_break_minutes,
        }
        .clamped()
    }

    /// Force every field into its allowed range
    pub fn clamped(self) -> Self {
        Self {
            focus_minutes: FOCUS_BOUNDS.clamp(i64::from(self.focus_minutes)),
            short_break_minutes: SHORT_BREAK_BOUNDS.clamp(i64::from(self.short_break_minutes)),
            long_break_minutes: LONG_BREAK_BOUNDS.clamp(i64::from(self.long_break_minutes)),
        }
    }

    /// Apply a partial update, correcting each provided value
    pub fn patched(&self, patch: &SettingsPatch) -> Self {
        Self {
            focus_minutes: patch
                .focus_time
                .as_ref()
                .map_or(self.focus_minutes, |v| FOCUS_BOUNDS.correct(v)),
            short_break_minutes: patch
                .short_break_time
                .as_ref()
                .map_or(self.short_break_minutes, |v| SHORT_BREAK_BOUNDS.correct(v)),
            long_break_minutes: patch
                .long_break_time
                .as_ref()
                .map_or(self.long_break_minutes, |v| LONG_BREAK_BOUNDS.correct(v)),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_minutes: FOCUS_BOUNDS.default,
            short_break_minutes: SHORT_BREAK_BOUNDS.default,
            long_break_minutes: LONG_BREAK_BOUNDS.default,
        }
    }
}

/// Partial settings update as received from a client; values are unvalidated
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub focus_time: Option<Value>,
    pub short_break_time: Option<Value>,
    pub long_break_time: Option<Value>,
}
