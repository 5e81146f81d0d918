//! Fixed-point monetary amounts.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The number of fractional digits kept for money.
pub const CENTS_SCALE: u32 = 2;

/// The largest amount, positive or negative, accepted from a client.
///
/// Sums of up to ten trillion such amounts still fit in a [Decimal].
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// An amount of money backed by a decimal, so sums are exact.
///
/// Stored in SQLite as TEXT and serialized to JSON as a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero dollars.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wrap a decimal amount.
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Check that the amount is within [MAX_AMOUNT] of zero and has at most
    /// [CENTS_SCALE] fractional digits.
    ///
    /// Trailing zeros do not count, so `1.500` is accepted.
    ///
    /// # Errors
    /// Returns [Error::AmountOutOfRange] for amounts beyond [MAX_AMOUNT], or
    /// [Error::InvalidAmountScale] for amounts with fractions of a cent.
    pub fn validate(self) -> Result<Self, Error> {
        if self.0.abs() > MAX_AMOUNT {
            return Err(Error::AmountOutOfRange(self));
        }

        if self.0.normalize().scale() > CENTS_SCALE {
            return Err(Error::InvalidAmountScale(self));
        }

        Ok(self)
    }

    /// Round to whole cents, with midpoints rounded away from zero (half-up).
    pub fn round_to_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(CENTS_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str_exact(s.trim()).map(Self)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// Arithmetic saturates at the bounds of [Decimal] instead of panicking.

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(text) => {
                let text =
                    std::str::from_utf8(text).map_err(|error| FromSqlError::Other(Box::new(error)))?;

                text.parse()
                    .map_err(|error: rust_decimal::Error| FromSqlError::Other(Box::new(error)))
            }
            ValueRef::Integer(amount) => Ok(Money(Decimal::from(amount))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}


#[cfg(test)]
mod sql_tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;

    use super::Money;

    #[test]
    fn round_trips_through_sqlite_text() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute("CREATE TABLE amount (value TEXT NOT NULL)", ())
            .unwrap();
        let want = Money::new(dec!(1234.56));

        connection
            .execute("INSERT INTO amount (value) VALUES (?1)", (want,))
            .unwrap();
        let got: Money = connection
            .query_row("SELECT value FROM amount", [], |row| row.get(0))
            .unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn reads_integer_columns() {
        let connection = Connection::open_in_memory().unwrap();

        let got: Money = connection
            .query_row("SELECT 42", [], |row| row.get(0))
            .unwrap();

        assert_eq!(got, Money::new(dec!(42)));
    }
}
