//! Task date value type.
//!
//! # Responsibility
//! - Represent undefined, fuzzy, and concrete calendar dates as one value.
//! - Provide lenient parsing of user-entered date text.
//! - Compute the next occurrence date for textual recurrence terms.
//!
//! # Invariants
//! - Parsing never fails: unrecognized text maps to `TaskDate::NoDate`.
//! - Every concrete date orders before every fuzzy/undefined value.
//! - Day arithmetic is defined only between two concrete dates.

use chrono::{Datelike, Duration, Local, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from recurrence-term evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// The term cannot be interpreted as a date offset.
    InvalidRecurrenceTerm(String),
}

impl Display for DateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecurrenceTerm(term) => {
                write!(f, "invalid recurrence term `{term}`")
            }
        }
    }
}

impl Error for DateError {}

/// Vague relative date, transparent to due-date constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzyDate {
    /// As soon as possible.
    Now,
    /// Within the next couple of weeks.
    Soon,
    /// Eventually, no commitment.
    Someday,
}

/// Date value attached to task scheduling attributes.
///
/// For due-date ordering purposes fuzzy and undefined values count as
/// "infinitely late": any concrete date sorts before them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskDate {
    /// No date was set.
    NoDate,
    /// A vague relative term such as "someday".
    Fuzzy(FuzzyDate),
    /// A concrete calendar date.
    Concrete(NaiveDate),
}

impl Default for TaskDate {
    fn default() -> Self {
        Self::NoDate
    }
}

impl TaskDate {
    /// Returns the undefined-date sentinel.
    pub fn no_date() -> Self {
        Self::NoDate
    }

    /// Returns today's local calendar date as a concrete value.
    pub fn today() -> Self {
        Self::Concrete(today_local())
    }

    /// True for fuzzy and undefined values.
    ///
    /// Both kinds are transparent to constraint propagation, so they share
    /// one predicate.
    pub fn is_fuzzy(&self) -> bool {
        !matches!(self, Self::Concrete(_))
    }

    /// True only for the undefined sentinel.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::NoDate)
    }

    /// Returns the calendar date when this value is concrete.
    pub fn as_concrete(&self) -> Option<NaiveDate> {
        match self {
            Self::Concrete(date) => Some(*date),
            _ => None,
        }
    }

    /// Parses user-entered date text.
    ///
    /// Recognized: empty text, `now`/`soon`/`someday`, `today`/`tomorrow`,
    /// ISO `YYYY-MM-DD`, weekday names (the next such weekday), and `+Nd`
    /// offsets. Anything else maps to `NoDate`.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::NoDate;
        }
        let lower = trimmed.to_lowercase();
        let today = today_local();
        match lower.as_str() {
            "now" => return Self::Fuzzy(FuzzyDate::Now),
            "soon" => return Self::Fuzzy(FuzzyDate::Soon),
            "someday" => return Self::Fuzzy(FuzzyDate::Someday),
            "today" => return Self::Concrete(today),
            "tomorrow" => return Self::Concrete(today + Duration::days(1)),
            _ => {}
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Self::Concrete(date);
        }
        if let Some(days) = parse_plus_days(&lower) {
            return Self::Concrete(today + Duration::days(days));
        }
        if let Ok(weekday) = lower.parse::<Weekday>() {
            return Self::Concrete(next_weekday(today, weekday, false));
        }
        Self::NoDate
    }

    /// Days from today until this date. `None` unless concrete.
    pub fn days_left(&self) -> Option<i64> {
        self.as_concrete()
            .map(|date| (date - today_local()).num_days())
    }

    /// Signed day difference `self - other`. `None` unless both concrete.
    pub fn days_between(&self, other: &TaskDate) -> Option<i64> {
        match (self.as_concrete(), other.as_concrete()) {
            (Some(a), Some(b)) => Some((a - b).num_days()),
            _ => None,
        }
    }

    /// Computes the occurrence of `term` following this date.
    ///
    /// Fuzzy or undefined bases advance from today. With
    /// `first_occurrence` the result may be the base date itself (used when
    /// a recurrence is first armed); otherwise the result moves past the
    /// base by one period.
    pub fn advance(&self, term: &str, first_occurrence: bool) -> Result<TaskDate, DateError> {
        let base = self.as_concrete().unwrap_or_else(today_local);
        let lower = term.trim().to_lowercase();
        let rule = lower.strip_prefix("every ").unwrap_or(&lower);

        let next = match rule {
            "day" => period(base, 1, first_occurrence),
            "otherday" => period(base, 2, first_occurrence),
            "week" => period(base, 7, first_occurrence),
            "month" => {
                if first_occurrence {
                    base
                } else {
                    add_months_clamped(base, 1)
                }
            }
            "year" => {
                if first_occurrence {
                    base
                } else {
                    add_months_clamped(base, 12)
                }
            }
            _ => {
                if let Ok(weekday) = rule.parse::<Weekday>() {
                    next_weekday(base, weekday, first_occurrence)
                } else if let Some(days) = parse_plus_days(rule) {
                    base + Duration::days(days)
                } else if let Some(day) = parse_day_of_month(rule) {
                    next_day_of_month(base, day, first_occurrence)
                } else {
                    return Err(DateError::InvalidRecurrenceTerm(term.to_string()));
                }
            }
        };
        Ok(TaskDate::Concrete(next))
    }
}

impl Ord for TaskDate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            (Self::Concrete(a), Self::Concrete(b)) => a.cmp(b),
            _ => self.lateness_rank().cmp(&other.lateness_rank()),
        }
    }
}

impl PartialOrd for TaskDate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl TaskDate {
    fn lateness_rank(&self) -> u8 {
        match self {
            Self::Concrete(_) => 0,
            Self::Fuzzy(FuzzyDate::Now) => 1,
            Self::Fuzzy(FuzzyDate::Soon) => 2,
            Self::Fuzzy(FuzzyDate::Someday) => 3,
            Self::NoDate => 4,
        }
    }
}

impl Display for TaskDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDate => Ok(()),
            Self::Fuzzy(FuzzyDate::Now) => write!(f, "now"),
            Self::Fuzzy(FuzzyDate::Soon) => write!(f, "soon"),
            Self::Fuzzy(FuzzyDate::Someday) => write!(f, "someday"),
            Self::Concrete(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

fn period(base: NaiveDate, days: i64, first_occurrence: bool) -> NaiveDate {
    if first_occurrence {
        base
    } else {
        base + Duration::days(days)
    }
}

/// Calendar-month addition with day-of-month clamping (Jan 31 -> Feb 28).
/// Out-of-range results leave the date unchanged.
fn add_months_clamped(base: NaiveDate, months: u32) -> NaiveDate {
    base.checked_add_months(Months::new(months)).unwrap_or(base)
}

fn next_weekday(base: NaiveDate, weekday: Weekday, include_base: bool) -> NaiveDate {
    let offset =
        (7 + weekday.num_days_from_monday() as i64 - base.weekday().num_days_from_monday() as i64)
            % 7;
    if offset == 0 && !include_base {
        base + Duration::days(7)
    } else {
        base + Duration::days(offset)
    }
}

fn next_day_of_month(base: NaiveDate, day: u32, include_base: bool) -> NaiveDate {
    let mut cursor = base;
    loop {
        if let Some(candidate) = cursor.with_day(day) {
            let matches = if include_base {
                candidate >= base
            } else {
                candidate > base
            };
            if matches {
                return candidate;
            }
        }
        cursor = add_months_clamped(cursor.with_day(1).unwrap_or(cursor), 1);
    }
}

fn parse_plus_days(text: &str) -> Option<i64> {
    let rest = text.strip_prefix('+')?;
    let digits = rest.strip_suffix('d')?;
    digits.parse::<i64>().ok().filter(|days| *days >= 0)
}

fn parse_day_of_month(text: &str) -> Option<u32> {
    text.parse::<u32>().ok().filter(|day| (1..=31).contains(day))
}
