use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("malformed wall-clock time {0:?}, expected HH:MM")]
    Malformed(String),
    #[error("unknown weekday {0:?}")]
    UnknownDay(String),
}

/// A wall-clock "HH:MM" value, locale-less, 24-hour.
///
/// Accepts both zero-padded and unpadded hours ("9:05" and "09:05").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let malformed = || TimeError::Malformed(s.to_string());
        let (hour, minute) = s.split_once(':').ok_or_else(malformed)?;

        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(malformed());
        }
        let hour: u16 = hour.parse().map_err(|_| malformed())?;
        let minute: u16 = minute.parse().map_err(|_| malformed())?;
        if hour > 23 || minute > 59 {
            return Err(malformed());
        }

        Ok(Self(hour * 60 + minute))
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Day tokens used as schedule keys in the festival document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "MONDAY",
            Weekday::Tuesday => "TUESDAY",
            Weekday::Wednesday => "WEDNESDAY",
            Weekday::Thursday => "THURSDAY",
            Weekday::Friday => "FRIDAY",
            Weekday::Saturday => "SATURDAY",
            Weekday::Sunday => "SUNDAY",
        }
    }

    /// The local weekday of `now`.
    pub fn today(now: &jiff::Zoned) -> Self {
        match now.weekday() {
            jiff::civil::Weekday::Monday => Weekday::Monday,
            jiff::civil::Weekday::Tuesday => Weekday::Tuesday,
            jiff::civil::Weekday::Wednesday => Weekday::Wednesday,
            jiff::civil::Weekday::Thursday => Weekday::Thursday,
            jiff::civil::Weekday::Friday => Weekday::Friday,
            jiff::civil::Weekday::Saturday => Weekday::Saturday,
            jiff::civil::Weekday::Sunday => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Weekday::ALL
            .into_iter()
            .find(|day| day.as_str() == upper)
            .ok_or_else(|| TimeError::UnknownDay(s.to_string()))
    }
}

/// The ordered span of days one festival covers. The first entry is the week
/// origin, the day absolute timeline offsets are measured from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FestivalWeek {
    days: Vec<Weekday>,
}

impl FestivalWeek {
    pub fn new(days: Vec<Weekday>) -> Self {
        Self { days }
    }

    pub fn origin(&self) -> Option<Weekday> {
        self.days.first().copied()
    }

    pub fn days(&self) -> &[Weekday] {
        &self.days
    }

    /// Offset in minutes from the festival's first day, or `None` when the
    /// festival does not span `day`.
    pub fn day_offset_minutes(&self, day: Weekday) -> Option<u32> {
        self.days
            .iter()
            .position(|d| *d == day)
            .map(|i| i as u32 * MINUTES_PER_DAY)
    }

    /// Total timeline width in minutes.
    pub fn span_minutes(&self) -> u32 {
        self.days.len() as u32 * MINUTES_PER_DAY
    }
}
