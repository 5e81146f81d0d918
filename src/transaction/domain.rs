//! Transaction models and validation.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, Money, TransactionKind,
    account::AccountId,
    category::CategoryId,
    expense_type::ExpenseTypeId,
    payment_method::PaymentMethodId,
    period::{ReferencePeriod, validate_year},
    recurrence_type::RecurrenceTypeId,
};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// An income or expense, with the display names of the rows it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether money came in or went out.
    pub kind: TransactionKind,
    /// What the transaction was for.
    pub description: String,
    /// The amount of money, always positive.
    pub amount: Money,
    /// When the transaction happened.
    pub transaction_date: Date,
    /// The month the transaction counts toward, derived from the date.
    pub reference_month: u8,
    /// The year the transaction counts toward, derived from the date.
    pub reference_year: i32,
    /// Free-form notes.
    pub notes: Option<String>,
    /// The account the money moved through.
    pub account_id: AccountId,
    /// The name of the account.
    pub account: Option<String>,
    /// The category of the transaction.
    pub category_id: CategoryId,
    /// The name of the category.
    pub category: Option<String>,
    /// How the transaction was paid.
    pub payment_method_id: PaymentMethodId,
    /// The name of the payment method.
    pub payment_method: Option<String>,
    /// Whether the expense was essential, non-essential or an investment.
    pub expense_type_id: Option<ExpenseTypeId>,
    /// The name of the expense type.
    pub expense_type: Option<String>,
    /// Whether the transaction is fixed or variable.
    pub recurrence_type_id: Option<RecurrenceTypeId>,
    /// The name of the recurrence type.
    pub recurrence_type: Option<String>,
}

/// The data for creating or overwriting a transaction.
///
/// The reference month and year are not part of the form, they are always
/// derived from `transaction_date`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionForm {
    /// Whether money came in or went out.
    pub kind: TransactionKind,
    /// What the transaction was for.
    pub description: String,
    /// The amount of money, must be greater than zero.
    pub amount: Money,
    /// When the transaction happened.
    pub transaction_date: Date,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// The account the money moved through.
    pub account_id: AccountId,
    /// The category of the transaction.
    pub category_id: CategoryId,
    /// How the transaction was paid.
    pub payment_method_id: PaymentMethodId,
    /// Optional expense type.
    #[serde(default)]
    pub expense_type_id: Option<ExpenseTypeId>,
    /// Optional recurrence type.
    #[serde(default)]
    pub recurrence_type_id: Option<RecurrenceTypeId>,
}

impl TransactionForm {
    /// Check the amount, description and date, and work out the reference period.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NonPositiveAmount] if the amount is zero or negative,
    /// - [Error::InvalidAmountScale] or [Error::AmountOutOfRange] if the amount is not whole cents within range,
    /// - [Error::EmptyDescription] if the description is blank,
    /// - or [Error::InvalidYear] if the date is not in a four-digit year.
    pub fn validate(&self) -> Result<ReferencePeriod, Error> {
        if !self.amount.is_positive() {
            return Err(Error::NonPositiveAmount(self.amount));
        }

        self.amount.validate()?;

        if self.description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }

        let period = ReferencePeriod::from_date(self.transaction_date);
        validate_year(period.year)?;

        Ok(period)
    }
}

/// Optional filters for listing transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct TransactionFilter {
    /// Only transactions that count toward this month.
    pub month: Option<u8>,
    /// Only transactions that count toward this year.
    pub year: Option<i32>,
    /// Only incomes or only expenses.
    pub kind: Option<TransactionKind>,
}

impl TransactionFilter {
    /// Only transactions counting toward `period`.
    pub fn for_period(period: ReferencePeriod) -> Self {
        Self {
            month: Some(period.month),
            year: Some(period.year),
            kind: None,
        }
    }

    /// Check that the month and year, if given, are in range.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(month) = self.month.filter(|month| !(1..=12).contains(month)) {
            return Err(Error::InvalidMonth(month));
        }

        if let Some(year) = self.year {
            validate_year(year)?;
        }

        Ok(())
    }
}
