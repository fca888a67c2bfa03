use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Weekday {
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'M' => Some(Weekday::Mon),
            'T' => Some(Weekday::Tue),
            'W' => Some(Weekday::Wed),
            'R' => Some(Weekday::Thu),
            'F' => Some(Weekday::Fri),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Weekday::Mon => 'M',
            Weekday::Tue => 'T',
            Weekday::Wed => 'W',
            Weekday::Thu => 'R',
            Weekday::Fri => 'F',
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
        }
    }
}

/// Meeting days of a course, written on the wire as schedule letter codes (`"MW"`, `"TR"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MeetingDays(BTreeSet<Weekday>);

impl MeetingDays {
    /// Letters outside `MTWRF` are ignored.
    pub fn from_codes(codes: &str) -> Self {
        Self(codes.chars().filter_map(Weekday::from_code).collect())
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `"Mon, Wed"`, or `"TBD"` when no day is known.
    pub fn describe(&self) -> String {
        if self.0.is_empty() {
            return "TBD".to_string();
        }
        self.0
            .iter()
            .map(|d| d.short_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for MeetingDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in &self.0 {
            write!(f, "{}", day.code())?;
        }
        Ok(())
    }
}

impl From<String> for MeetingDays {
    fn from(value: String) -> Self {
        Self::from_codes(&value)
    }
}

impl From<MeetingDays> for String {
    fn from(value: MeetingDays) -> Self {
        value.to_string()
    }
}

static TIME_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2}):(\d{2})\s*(AM|PM)?\s*[-–]\s*(\d{1,2}):(\d{2})\s*(AM|PM)?\s*$")
        .expect("valid time range pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    /// Parses `"10:00-11:30"`, `"2:00-3:30PM"` or `"9:00 AM - 12:00 PM"`.
    /// A trailing meridiem also applies to the start time when the start has none.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = TIME_RANGE_RE.captures(text)?;
        let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        let meridiem = |i: usize| caps.get(i).map(|m| m.as_str().to_ascii_uppercase());

        let end_meridiem = meridiem(6);
        let start_meridiem = meridiem(3);

        let end_hour = to_24h(num(4)?, end_meridiem.as_deref());
        let mut start_hour = to_24h(num(1)?, start_meridiem.as_deref());
        if start_meridiem.is_none() && end_meridiem.as_deref() == Some("PM") && start_hour < 12 {
            let shifted = start_hour + 12;
            if shifted <= end_hour {
                start_hour = shifted;
            }
        }

        let start = NaiveTime::from_hms_opt(start_hour, num(2)?, 0)?;
        let end = NaiveTime::from_hms_opt(end_hour, num(5)?, 0)?;
        Some(Self { start, end })
    }

    /// `"10:00 - 11:30"`.
    pub fn describe(&self) -> String {
        format!("{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

fn to_24h(hour: u32, meridiem: Option<&str>) -> u32 {
    match meridiem {
        Some("PM") if hour < 12 => hour + 12,
        Some("AM") if hour == 12 => 0,
        _ => hour,
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start.hour(),
            self.start.minute(),
            self.end.hour(),
            self.end.minute()
        )
    }
}

impl TryFrom<String> for TimeRange {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid time range: {value}"))
    }
}

impl From<TimeRange> for String {
    fn from(value: TimeRange) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub faculty: String,
    pub credits: f64,
    #[serde(default)]
    pub days: MeetingDays,
    #[serde(default)]
    pub time: Option<TimeRange>,
    pub semester: String,
    #[serde(default)]
    pub delivery_mode: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub(crate) satisfies: BTreeSet<String>,
}

impl Course {
    pub fn new(
        id: impl Into<String>,
        code: impl Into<String>,
        title: impl Into<String>,
        semester: impl Into<String>,
        credits: f64,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            title: title.into(),
            faculty: String::new(),
            credits: sanitize_credits(credits),
            days: MeetingDays::default(),
            time: None,
            semester: semester.into(),
            delivery_mode: String::new(),
            description: String::new(),
            satisfies: BTreeSet::new(),
        }
    }

    pub fn with_faculty(mut self, faculty: impl Into<String>) -> Self {
        self.faculty = faculty.into();
        self
    }

    pub fn with_days(mut self, codes: &str) -> Self {
        self.days = MeetingDays::from_codes(codes);
        self
    }

    pub fn with_time(mut self, time: &str) -> Self {
        self.time = TimeRange::parse(time);
        self
    }

    pub fn with_delivery_mode(mut self, mode: impl Into<String>) -> Self {
        self.delivery_mode = mode.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Requirement ids this course counts toward.
    pub fn satisfies(&self) -> &BTreeSet<String> {
        &self.satisfies
    }

    pub fn satisfies_requirement(&self, requirement_id: &str) -> bool {
        self.satisfies.contains(requirement_id)
    }

    pub fn time_description(&self) -> String {
        self.time
            .map(|t| t.describe())
            .unwrap_or_else(|| "TBD".to_string())
    }

    /// `"{code}_{semester}_{surname}"` with whitespace removed from code and semester.
    pub fn derive_id(code: &str, semester: &str, faculty: &str) -> String {
        let squash = |s: &str| s.split_whitespace().collect::<String>();
        format!("{}_{}_{}", squash(code), squash(semester), surname(faculty))
    }
}

fn surname(faculty: &str) -> String {
    faculty
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';' || c == '/')
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '\''))
        .filter(|token| token.chars().any(char::is_alphabetic))
        .filter(|token| !matches!(token.to_ascii_lowercase().as_str(), "dr" | "prof" | "rev" | "mr" | "ms" | "mrs" | "phd"))
        .last()
        .map(str::to_string)
        .unwrap_or_else(|| "TBA".to_string())
}

/// Credit values are non-negative and finite; anything else collapses to `0.0`.
pub fn sanitize_credits(credits: f64) -> f64 {
    if credits.is_finite() && credits > 0.0 {
        credits
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_days_round_trip_codes() {
        let days = MeetingDays::from_codes("MW");
        assert!(days.contains(Weekday::Mon));
        assert!(days.contains(Weekday::Wed));
        assert_eq!(days.to_string(), "MW");
        assert_eq!(days.describe(), "Mon, Wed");
        assert_eq!(MeetingDays::from_codes("MTWRF").describe(), "Mon, Tue, Wed, Thu, Fri");
        assert_eq!(MeetingDays::from_codes("").describe(), "TBD");
        assert_eq!(Course::new("x", "X 1", "X", "Fall", 1.0).time_description(), "TBD");
    }

    #[test]
    fn time_range_parses_plain_and_meridiem() {
        let plain = TimeRange::parse("10:00-11:30").unwrap();
        assert_eq!(plain.to_string(), "10:00-11:30");
        assert_eq!(plain.describe(), "10:00 - 11:30");
        assert_eq!(plain.duration_minutes(), 90);

        let pm = TimeRange::parse("2:00-3:30PM").unwrap();
        assert_eq!(pm.to_string(), "14:00-15:30");

        let mixed = TimeRange::parse("11:00 AM - 12:30 PM").unwrap();
        assert_eq!(mixed.to_string(), "11:00-12:30");

        assert!(TimeRange::parse("TBA").is_none());
    }

    #[test]
    fn derive_id_uses_surname() {
        assert_eq!(
            Course::derive_id("BIBL 101", "Fall 2025", "Dr. John Smith"),
            "BIBL101_Fall2025_Smith"
        );
        assert_eq!(Course::derive_id("SW501", "Spring 2026", ""), "SW501_Spring2026_TBA");
    }
}
