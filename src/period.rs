//! The calendar month and year a transaction counts toward.

use serde::{Deserialize, Serialize};
use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::Error;

const MIN_YEAR: i32 = 1000;
const MAX_YEAR: i32 = 9999;

/// A month (1-12) of a four-digit year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferencePeriod {
    /// The month, 1 for January through 12 for December.
    pub month: u8,
    /// The four-digit year.
    pub year: i32,
}

impl ReferencePeriod {
    /// Create a reference period.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `month` is not in 1-12, or
    /// [Error::InvalidYear] if `year` is not a four-digit year.
    pub fn new(month: u8, year: i32) -> Result<Self, Error> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidMonth(month));
        }

        validate_year(year)?;

        Ok(Self { month, year })
    }

    /// The period a transaction on `date` counts toward.
    pub fn from_date(date: Date) -> Self {
        Self {
            month: u8::from(date.month()),
            year: date.year(),
        }
    }

    /// The current month in the timezone `local_offset`.
    pub fn current(local_offset: UtcOffset) -> Self {
        Self::from_date(OffsetDateTime::now_utc().to_offset(local_offset).date())
    }
}

/// Check that `year` is a four-digit year.
pub fn validate_year(year: i32) -> Result<i32, Error> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(Error::InvalidYear(year))
    }
}

/// The English name of `month`, e.g. "January" for 1.
///
/// Returns an empty string for months outside of 1-12.
pub fn month_name(month: u8) -> String {
    Month::try_from(month)
        .map(|month| month.to_string())
        .unwrap_or_default()
}

/// Query parameters that select a month, defaulting to the current one.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// The month, 1-12.
    pub month: Option<u8>,
    /// The four-digit year.
    pub year: Option<i32>,
}

/// Fill in a missing `month` or `year` from the current month and validate the result.
pub fn resolve_period(
    month: Option<u8>,
    year: Option<i32>,
    local_offset: UtcOffset,
) -> Result<ReferencePeriod, Error> {
    let current = ReferencePeriod::current(local_offset);

    ReferencePeriod::new(
        month.unwrap_or(current.month),
        year.unwrap_or(current.year),
    )
}

#[cfg(test)]
mod reference_period_tests {
    use time::{OffsetDateTime, UtcOffset, macros::date};

    use crate::{
        Error,
        period::{PeriodQuery, ReferencePeriod, month_name, resolve_period},
    };

    #[test]
    fn from_date_takes_month_and_year() {
        let period = ReferencePeriod::from_date(date!(2024 - 02 - 29));

        assert_eq!(
            period,
            ReferencePeriod {
                month: 2,
                year: 2024
            }
        );
    }

    #[test]
    fn new_rejects_month_out_of_range() {
        assert_eq!(ReferencePeriod::new(0, 2024), Err(Error::InvalidMonth(0)));
        assert_eq!(ReferencePeriod::new(13, 2024), Err(Error::InvalidMonth(13)));
    }

    #[test]
    fn new_rejects_years_that_are_not_four_digits() {
        assert_eq!(ReferencePeriod::new(1, 999), Err(Error::InvalidYear(999)));
        assert_eq!(
            ReferencePeriod::new(1, 10_000),
            Err(Error::InvalidYear(10_000))
        );
    }

    #[test]
    fn month_names_are_english() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(13), "");
    }

    #[test]
    fn query_defaults_to_current_month() {
        let today = OffsetDateTime::now_utc().date();

        let query = PeriodQuery::default();

        let period = resolve_period(query.month, query.year, UtcOffset::UTC).unwrap();

        // Guard against the test running across midnight at the end of a month.
        let after = ReferencePeriod::from_date(OffsetDateTime::now_utc().date());
        assert!(period == ReferencePeriod::from_date(today) || period == after);
    }

    #[test]
    fn query_keeps_explicit_values() {
        let query = PeriodQuery {
            month: Some(7),
            year: Some(2023),
        };

        assert_eq!(
            resolve_period(query.month, query.year, UtcOffset::UTC),
            Ok(ReferencePeriod {
                month: 7,
                year: 2023
            })
        );
    }
}
