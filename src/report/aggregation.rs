//! Pure functions that turn transactions, accounts, goals and installment plans into report figures.
//!
//! Nothing in here touches the database, callers pass in the rows they have already fetched.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Money, TransactionKind,
    account::Account,
    money::CENTS_SCALE,
    period::{ReferencePeriod, month_name},
    transaction::Transaction,
};

/// How many of the newest transactions the dashboard shows.
pub const RECENT_TRANSACTION_LIMIT: usize = 10;

/// Totals for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// The sum of all account balances.
    pub total_balance: Money,
    /// The sum of the income transactions.
    pub monthly_income: Money,
    /// The sum of the expense transactions.
    pub monthly_expense: Money,
    /// Income minus expenses.
    pub monthly_result: Money,
    /// The first [RECENT_TRANSACTION_LIMIT] transactions in the order they were given.
    pub recent_transactions: Vec<Transaction>,
    /// The number of transactions given.
    pub transaction_count: usize,
}

/// Income and expenses of one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBalance {
    /// The month, 1-12.
    pub month: u8,
    /// The English name of the month.
    pub month_name: String,
    pub income: Money,
    pub expense: Money,
    /// Income minus expenses.
    pub result: Money,
}

/// An axis that transactions can be grouped along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Category,
    PaymentMethod,
    ExpenseType,
    RecurrenceType,
}

impl Dimension {
    /// The label used for transactions without a value for this dimension.
    pub fn placeholder(self) -> &'static str {
        match self {
            Dimension::Category => "Uncategorized",
            Dimension::PaymentMethod => "No payment method",
            Dimension::ExpenseType => "No expense type",
            Dimension::RecurrenceType => "No recurrence type",
        }
    }

    fn label(self, transaction: &Transaction) -> &str {
        let name = match self {
            Dimension::Category => &transaction.category,
            Dimension::PaymentMethod => &transaction.payment_method,
            Dimension::ExpenseType => &transaction.expense_type,
            Dimension::RecurrenceType => &transaction.recurrence_type,
        };

        name.as_deref().unwrap_or(self.placeholder())
    }

    /// Expense types only make sense for expenses, the other dimensions admit both kinds.
    fn admits(self, kind: TransactionKind) -> bool {
        match self {
            Dimension::ExpenseType => kind == TransactionKind::Expense,
            _ => true,
        }
    }
}

/// The total amount for one label of a [Dimension].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionTotal {
    pub label: String,
    pub total: Money,
}

/// Sum the income and expense amounts of `transactions`.
fn income_and_expense<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> (Money, Money) {
    transactions
        .into_iter()
        .fold((Money::ZERO, Money::ZERO), |(income, expense), transaction| {
            match transaction.kind {
                TransactionKind::Income => (income + transaction.amount, expense),
                TransactionKind::Expense => (income, expense + transaction.amount),
            }
        })
}

/// Compute the dashboard totals.
///
/// `transactions` should be the transactions of a single month, newest first.
/// The balance is summed over every account given.
pub fn compute_dashboard(transactions: &[Transaction], accounts: &[Account]) -> Dashboard {
    let (monthly_income, monthly_expense) = income_and_expense(transactions);

    Dashboard {
        total_balance: accounts.iter().map(|account| account.balance).sum(),
        monthly_income,
        monthly_expense,
        monthly_result: monthly_income - monthly_expense,
        recent_transactions: transactions
            .iter()
            .take(RECENT_TRANSACTION_LIMIT)
            .cloned()
            .collect(),
        transaction_count: transactions.len(),
    }
}

/// Compute the income, expenses and result for every month of `year`.
///
/// `transactions_for_month` is called once per month, January first. The
/// result always has twelve entries, months without transactions are zero.
///
/// # Errors
/// Returns the first error of `transactions_for_month` unchanged.
pub fn compute_monthly_balance<E>(
    year: i32,
    mut transactions_for_month: impl FnMut(ReferencePeriod) -> Result<Vec<Transaction>, E>,
) -> Result<Vec<MonthlyBalance>, E> {
    (1..=12u8)
        .map(|month| {
            let transactions = transactions_for_month(ReferencePeriod { month, year })?;
            let (income, expense) = income_and_expense(&transactions);

            Ok(MonthlyBalance {
                month,
                month_name: month_name(month),
                income,
                expense,
                result: income - expense,
            })
        })
        .collect()
}

/// Total the amounts of `transactions` per label of `dimension`.
///
/// Labels appear in the order they are first seen in `transactions`. If
/// `kind` is given, only transactions of that kind are counted. Grouping by
/// [Dimension::ExpenseType] only ever counts expenses.
pub fn group_by_dimension(
    transactions: &[Transaction],
    dimension: Dimension,
    kind: Option<TransactionKind>,
) -> Vec<DimensionTotal> {
    let mut index_by_label: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<DimensionTotal> = Vec::new();

    let counted = transactions.iter().filter(|transaction| {
        dimension.admits(transaction.kind) && kind.is_none_or(|kind| kind == transaction.kind)
    });

    for transaction in counted {
        let label = dimension.label(transaction);

        match index_by_label.get(label) {
            Some(&index) => totals[index].total += transaction.amount,
            None => {
                index_by_label.insert(label, totals.len());
                totals.push(DimensionTotal {
                    label: label.to_owned(),
                    total: transaction.amount,
                });
            }
        }
    }

    totals
}

/// How far `current` is toward `target` as a percentage, rounded to two decimal places.
///
/// Returns zero when `target` is zero or negative. Ratios too large for a
/// [Decimal] saturate at [Decimal::MAX] or [Decimal::MIN].
pub fn goal_progress(current: Money, target: Money) -> Decimal {
    if !target.is_positive() {
        return Decimal::ZERO;
    }

    let saturated = if current.as_decimal().is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    };

    current
        .as_decimal()
        .checked_div(target.as_decimal())
        .map_or(saturated, |ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED))
        .round_dp_with_strategy(CENTS_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// The number of installments left to pay.
///
/// Not clamped, a plan with more payments than installments gives a negative number.
pub fn installments_remaining(total_installments: i64, installments_paid: i64) -> i64 {
    total_installments - installments_paid
}

/// Split `total_amount` into `total_installments` equal installments rounded to the cent.
///
/// The installments may add up to a cent or so less or more than the total.
///
/// # Errors
/// Returns [Error::InvalidInstallmentCount] if `total_installments` is zero or negative.
pub fn compute_installment_amount(
    total_amount: Money,
    total_installments: i64,
) -> Result<Money, Error> {
    if total_installments <= 0 {
        return Err(Error::InvalidInstallmentCount(total_installments));
    }

    Ok(Money::new(total_amount.as_decimal() / Decimal::from(total_installments)).round_to_cents())
}
