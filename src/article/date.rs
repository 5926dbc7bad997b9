//! Publication dates from front-matter.
//!
//! Accepted forms:
//! - `2024-06-15`
//! - `2024-06-15 14:30` / `2024-06-15T14:30`
//! - `2024-06-15T14:30:45`, optionally with fractional seconds (`.5`)
//! - any time followed by `Z` or a `+HH:MM` / `-HH:MM` offset
//!
//! Times with an offset are shifted to UTC; times without one are taken as
//! UTC. Fractional seconds are dropped. Values are compared field by field.

use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArticleDate {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl ArticleDate {
    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    /// Parse a front-matter date. Returns `None` for anything malformed or
    /// out of range (e.g. `2023-02-29`).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().trim_matches(|c| c == '"' || c == '\'');
        let bytes = s.as_bytes();
        if bytes.len() < 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return None;
        }

        let date = Self::from_ymd(
            parse_num(&bytes[0..4])?,
            parse_num(&bytes[5..7])?,
            parse_num(&bytes[8..10])?,
        );

        match &bytes[10..] {
            [] => date.is_valid().then_some(date),
            [b'T' | b't' | b' ', time @ ..] => date.with_time(time),
            _ => None,
        }
    }

    /// `HH:MM[:SS[.fff]][Z|±HH:MM]`
    fn with_time(mut self, time: &[u8]) -> Option<Self> {
        let [h1, h2, b':', m1, m2, rest @ ..] = time else {
            return None;
        };
        let mut rest = rest;
        self.hour = parse_num(&[*h1, *h2])?;
        self.minute = parse_num(&[*m1, *m2])?;

        if let [b':', s1, s2, tail @ ..] = rest {
            self.second = parse_num(&[*s1, *s2])?;
            rest = tail;
            if let [b'.', tail @ ..] = rest {
                let digits = tail.iter().take_while(|b| b.is_ascii_digit()).count();
                if digits == 0 {
                    return None;
                }
                rest = &tail[digits..];
            }
        }

        let offset_minutes = match rest {
            [] | [b'Z' | b'z'] => 0,
            [sign @ (b'+' | b'-'), h1, h2, b':', m1, m2] => {
                let hours: i32 = parse_num(&[*h1, *h2])?;
                let minutes: i32 = parse_num(&[*m1, *m2])?;
                if hours > 23 || minutes > 59 {
                    return None;
                }
                let total = hours * 60 + minutes;
                if *sign == b'+' { total } else { -total }
            }
            _ => return None,
        };

        self.is_valid().then(|| self.shift_minutes(-offset_minutes))
    }

    /// Move by less than a day in either direction, carrying into the date.
    fn shift_minutes(mut self, minutes: i32) -> Self {
        let total = i32::from(self.hour) * 60 + i32::from(self.minute) + minutes;
        let of_day = total.rem_euclid(24 * 60);
        self.hour = (of_day / 60) as u8;
        self.minute = (of_day % 60) as u8;

        match total.div_euclid(24 * 60) {
            1 => self.next_day(),
            -1 => self.prev_day(),
            _ => {}
        }
        self
    }

    fn next_day(&mut self) {
        if self.day < days_in_month(self.year, self.month) {
            self.day += 1;
        } else if self.month < 12 {
            self.month += 1;
            self.day = 1;
        } else {
            self.year += 1;
            self.month = 1;
            self.day = 1;
        }
    }

    fn prev_day(&mut self) {
        if self.day > 1 {
            self.day -= 1;
            return;
        }
        if self.month > 1 {
            self.month -= 1;
        } else {
            self.year = self.year.saturating_sub(1);
            self.month = 12;
        }
        self.day = days_in_month(self.year, self.month);
    }

    fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }

    fn has_time(&self) -> bool {
        self.hour != 0 || self.minute != 0 || self.second != 0
    }
}

const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn parse_num<T: std::str::FromStr>(bytes: &[u8]) -> Option<T> {
    if !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

impl fmt::Display for ArticleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)?;
        if self.has_time() {
            write!(
                f,
                "T{:02}:{:02}:{:02}Z",
                self.hour, self.minute, self.second
            )?;
        }
        Ok(())
    }
}

impl Serialize for ArticleDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
