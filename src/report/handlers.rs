//! Report HTTP handlers.
//!
//! Each handler fetches the rows for the requested period and hands them to
//! the functions in [super::aggregation].

use std::{
    mem,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, OwnerId, TransactionKind,
    account::list_accounts,
    db::lock_connection,
    period::{PeriodQuery, ReferencePeriod, resolve_period, validate_year},
    report::aggregation::{
        Dashboard, Dimension, DimensionTotal, MonthlyBalance, compute_dashboard,
        compute_monthly_balance, group_by_dimension,
    },
    timezone::local_offset_or_error,
    transaction::{TransactionFilter, list_transactions},
};

/// The state needed for computing reports.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading transactions and accounts.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Query parameters for the monthly balance.
#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    /// The four-digit year, defaults to the current year.
    pub year: Option<i32>,
}

/// Query parameters for the per-dimension summaries.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub month: Option<u8>,
    pub year: Option<i32>,
    /// Only count transactions of this kind.
    pub kind: Option<TransactionKind>,
}

impl ReportState {
    fn period(&self, month: Option<u8>, year: Option<i32>) -> Result<ReferencePeriod, Error> {
        resolve_period(month, year, local_offset_or_error(&self.local_timezone)?)
    }
}

/// Get the dashboard totals for `?month=&year=`, defaulting to the current month.
pub async fn get_dashboard(
    State(state): State<ReportState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Query(query), _): WithRejection<Query<PeriodQuery>, Error>,
) -> Result<Json<Dashboard>, Error> {
    let period = state.period(query.month, query.year)?;
    let connection = lock_connection(&state.db_connection)?;

    let transactions = list_transactions(
        &owner,
        &TransactionFilter::for_period(period),
        &connection,
    )
    .inspect_err(|error| tracing::error!("Could not get transactions for dashboard: {error}"))?;
    let accounts = list_accounts(&owner, &connection)
        .inspect_err(|error| tracing::error!("Could not get accounts for dashboard: {error}"))?;
    drop(connection);

    Ok(Json(compute_dashboard(&transactions, &accounts)))
}

/// Get the income, expenses and result of every month of `?year=`, defaulting to the current year.
pub async fn get_monthly_balance(
    State(state): State<ReportState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Query(query), _): WithRejection<Query<YearQuery>, Error>,
) -> Result<Json<Vec<MonthlyBalance>>, Error> {
    let year = match query.year {
        Some(year) => validate_year(year)?,
        None => state.period(None, None)?.year,
    };
    let mut transactions_by_month = {
        let connection = lock_connection(&state.db_connection)?;

        (1..=12u8)
            .map(|month| {
                list_transactions(
                    &owner,
                    &TransactionFilter::for_period(ReferencePeriod { month, year }),
                    &connection,
                )
            })
            .collect::<Result<Vec<_>, Error>>()?
    };

    compute_monthly_balance(year, |period| {
        Ok::<_, Error>(
            transactions_by_month
                .get_mut(usize::from(period.month) - 1)
                .map(mem::take)
                .unwrap_or_default(),
        )
    })
    .map(Json)
}

fn summarize(
    state: &ReportState,
    owner: &OwnerId,
    query: &SummaryQuery,
    dimension: Dimension,
) -> Result<Vec<DimensionTotal>, Error> {
    let period = state.period(query.month, query.year)?;
    let connection = lock_connection(&state.db_connection)?;

    let transactions = list_transactions(owner, &TransactionFilter::for_period(period), &connection)?;
    drop(connection);

    Ok(group_by_dimension(&transactions, dimension, query.kind))
}

/// Total the month's transactions by category.
pub async fn get_category_summary(
    State(state): State<ReportState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Query(query), _): WithRejection<Query<SummaryQuery>, Error>,
) -> Result<Json<Vec<DimensionTotal>>, Error> {
    summarize(&state, &owner, &query, Dimension::Category).map(Json)
}

/// Total the month's transactions by payment method.
pub async fn get_payment_method_summary(
    State(state): State<ReportState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Query(query), _): WithRejection<Query<SummaryQuery>, Error>,
) -> Result<Json<Vec<DimensionTotal>>, Error> {
    summarize(&state, &owner, &query, Dimension::PaymentMethod).map(Json)
}

/// Total the month's expenses by expense type.
pub async fn get_expense_type_summary(
    State(state): State<ReportState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Query(query), _): WithRejection<Query<PeriodQuery>, Error>,
) -> Result<Json<Vec<DimensionTotal>>, Error> {
    let query = SummaryQuery {
        month: query.month,
        year: query.year,
        kind: None,
    };

    summarize(&state, &owner, &query, Dimension::ExpenseType).map(Json)
}

/// Total the month's transactions by recurrence type.
pub async fn get_recurrence_type_summary(
    State(state): State<ReportState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Query(query), _): WithRejection<Query<SummaryQuery>, Error>,
) -> Result<Json<Vec<DimensionTotal>>, Error> {
    summarize(&state, &owner, &query, Dimension::RecurrenceType).map(Json)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Query, State},
    };
    use axum_extra::extract::WithRejection;
    use rust_decimal_macros::dec;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, Money, TransactionKind,
        account::{AccountForm, update_account},
        money::MAX_AMOUNT,
        period::PeriodQuery,
        test_utils::{Fixtures, get_test_connection, insert_fixtures, test_owner},
        transaction::{TransactionForm, create_transaction},
    };

    use super::{
        ReportState, SummaryQuery, YearQuery, get_category_summary, get_dashboard,
        get_expense_type_summary, get_monthly_balance,
    };

    fn transaction(
        fixtures: &Fixtures,
        kind: TransactionKind,
        amount: Money,
        transaction_date: time::Date,
    ) -> TransactionForm {
        TransactionForm {
            kind,
            description: "test".to_owned(),
            amount,
            transaction_date,
            notes: None,
            account_id: fixtures.account_id,
            category_id: match kind {
                TransactionKind::Income => fixtures.income_category_id,
                TransactionKind::Expense => fixtures.expense_category_id,
            },
            payment_method_id: fixtures.payment_method_id,
            expense_type_id: None,
            recurrence_type_id: None,
        }
    }

    fn get_state(connection: Connection) -> ReportState {
        ReportState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn march_2025() -> PeriodQuery {
        PeriodQuery {
            month: Some(3),
            year: Some(2025),
        }
    }

    fn setup() -> ReportState {
        let connection = get_test_connection();
        let owner = test_owner();
        let fixtures = insert_fixtures(&owner, &connection);
        update_account(
            &owner,
            fixtures.account_id,
            &AccountForm {
                name: "Checking".to_owned(),
                logo_url: None,
                balance: Money::new(dec!(1000)),
            },
            &connection,
        )
        .unwrap();

        for (kind, amount, date) in [
            (TransactionKind::Income, dec!(500), date!(2025 - 03 - 01)),
            (TransactionKind::Expense, dec!(120), date!(2025 - 03 - 10)),
            (TransactionKind::Expense, dec!(30), date!(2025 - 03 - 20)),
            (TransactionKind::Expense, dec!(99), date!(2025 - 04 - 01)),
        ] {
            create_transaction(
                &owner,
                &transaction(&fixtures, kind, Money::new(amount), date),
                &connection,
            )
            .unwrap();
        }

        get_state(connection)
    }

    #[tokio::test]
    async fn dashboard_totals_the_requested_month() {
        let state = setup();

        let Json(dashboard) = get_dashboard(
            State(state),
            Extension(test_owner()),
            WithRejection(Query(march_2025()), Default::default()),
        )
        .await
        .unwrap();

        assert_eq!(dashboard.total_balance, Money::new(dec!(1000)));
        assert_eq!(dashboard.monthly_income, Money::new(dec!(500)));
        assert_eq!(dashboard.monthly_expense, Money::new(dec!(150)));
        assert_eq!(dashboard.monthly_result, Money::new(dec!(350)));
        assert_eq!(dashboard.transaction_count, 3);
        assert_eq!(
            dashboard.recent_transactions[0].transaction_date,
            date!(2025 - 03 - 20)
        );
    }

    #[tokio::test]
    async fn dashboard_sums_the_largest_accepted_amounts() {
        let connection = get_test_connection();
        let owner = test_owner();
        let fixtures = insert_fixtures(&owner, &connection);
        for _ in 0..2 {
            create_transaction(
                &owner,
                &transaction(
                    &fixtures,
                    TransactionKind::Expense,
                    Money::new(MAX_AMOUNT),
                    date!(2025 - 03 - 05),
                ),
                &connection,
            )
            .unwrap();
        }
        let state = get_state(connection);

        let Json(dashboard) = get_dashboard(
            State(state.clone()),
            Extension(owner),
            WithRejection(Query(march_2025()), Default::default()),
        )
        .await
        .unwrap();

        assert_eq!(dashboard.monthly_expense, Money::new(MAX_AMOUNT * dec!(2)));
        assert!(!state.db_connection.is_poisoned());
    }

    #[tokio::test]
    async fn dashboard_rejects_invalid_month() {
        let state = setup();

        let result = get_dashboard(
            State(state),
            Extension(test_owner()),
            WithRejection(
                Query(PeriodQuery {
                    month: Some(13),
                    year: Some(2025),
                }),
                Default::default(),
            ),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::InvalidMonth(13));
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let mut state = setup();
        state.local_timezone = "Not/AZone".to_owned();

        let result = get_dashboard(
            State(state),
            Extension(test_owner()),
            WithRejection(Query(march_2025()), Default::default()),
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidTimezoneError("Not/AZone".to_owned())
        );
    }

    #[tokio::test]
    async fn monthly_balance_covers_the_year() {
        let state = setup();

        let Json(balance) = get_monthly_balance(
            State(state),
            Extension(test_owner()),
            WithRejection(Query(YearQuery { year: Some(2025) }), Default::default()),
        )
        .await
        .unwrap();

        assert_eq!(balance.len(), 12);
        assert_eq!(balance[2].result, Money::new(dec!(350)));
        assert_eq!(balance[3].expense, Money::new(dec!(99)));
        assert_eq!(balance[11].result, Money::ZERO);
    }

    #[tokio::test]
    async fn category_summary_filters_by_kind() {
        let state = setup();

        let Json(totals) = get_category_summary(
            State(state),
            Extension(test_owner()),
            WithRejection(
                Query(SummaryQuery {
                    month: Some(3),
                    year: Some(2025),
                    kind: Some(TransactionKind::Expense),
                }),
                Default::default(),
            ),
        )
        .await
        .unwrap();

        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].label, "Groceries");
        assert_eq!(totals[0].total, Money::new(dec!(150)));
    }

    #[tokio::test]
    async fn expense_type_summary_ignores_income() {
        let state = setup();

        let Json(totals) = get_expense_type_summary(
            State(state),
            Extension(test_owner()),
            WithRejection(Query(march_2025()), Default::default()),
        )
        .await
        .unwrap();

        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].label, "No expense type");
        assert_eq!(totals[0].total, Money::new(dec!(150)));
    }
}
