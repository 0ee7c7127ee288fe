//! Calendar month filters for transactions.
//!
//! Reports and transaction listings are bucketed by calendar month. Clients
//! select a month with a `YYYY-MM` token, which is parsed into a [Period] and
//! then turned into an inclusive date range for SQL queries.

use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

use time::{Date, Month};

use crate::Error;

/// A calendar month, e.g. March 2024.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    year: i32,
    month: Month,
}

impl Period {
    /// Create the period for `month` of `year`.
    pub const fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// Parse an optional month token.
    ///
    /// An empty token means no period was selected and returns `Ok(None)`.
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriod] if `token` is not empty and not in the
    /// `YYYY-MM` format.
    pub fn parse_optional(token: Option<&str>) -> Result<Option<Self>, Error> {
        match token.map(str::trim) {
            None | Some("") => Ok(None),
            Some(token) => token.parse().map(Some),
        }
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Date {
        // Day 1 exists in every month and the year was checked on parsing.
        Date::from_calendar_date(self.year, self.month, 1).unwrap_or(Date::MIN)
    }

    /// The last day of the month.
    pub fn last_day(&self) -> Date {
        let last_day = self.month.length(self.year);

        Date::from_calendar_date(self.year, self.month, last_day).unwrap_or(Date::MAX)
    }

    /// The inclusive range of dates that fall within the month.
    pub fn date_range(&self) -> RangeInclusive<Date> {
        self.first_day()..=self.last_day()
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidPeriod(s.to_owned());

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;

        let is_digits = |text: &str, len: usize| {
            text.len() == len && text.bytes().all(|byte| byte.is_ascii_digit())
        };

        if !is_digits(year, 4) || !is_digits(month, 2) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;

        Ok(Self { year, month })
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}
