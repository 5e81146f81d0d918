//! Starter accounts, categories and payment methods for a new owner.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error, Money, OwnerId, TransactionKind,
    account::{AccountForm, create_account},
    category::{CategoryForm, create_category},
    db::lock_connection,
    payment_method::{PaymentMethodForm, create_payment_method},
};

const STARTER_ACCOUNTS: [&str; 3] = ["Checking account", "Digital wallet", "Savings account"];

/// (name, color, icon)
const INCOME_CATEGORIES: [(&str, &str, &str); 4] = [
    ("Sales", "#10B981", "💰"),
    ("Investments", "#3B82F6", "📈"),
    ("Other income", "#8B5CF6", "💵"),
    ("Salary", "#F59E0B", "💼"),
];

/// (name, color, icon)
const EXPENSE_CATEGORIES: [(&str, &str, &str); 12] = [
    ("Water", "#06B6D4", "💧"),
    ("Electricity", "#F59E0B", "💡"),
    ("Phone", "#EF4444", "📞"),
    ("Internet", "#8B5CF6", "🌐"),
    ("Building fees", "#6B7280", "🏢"),
    ("Streaming", "#EC4899", "📺"),
    ("Food", "#10B981", "🍽️"),
    ("Leisure", "#F97316", "🎉"),
    ("Clothing", "#84CC16", "👕"),
    ("Debt", "#DC2626", "💳"),
    ("Groceries", "#059669", "🛒"),
    ("Other expenses", "#6B7280", "📋"),
];

/// (name, icon)
const PAYMENT_METHODS: [(&str, &str); 5] = [
    ("Instant transfer", "🔄"),
    ("Credit", "💳"),
    ("Debit", "💰"),
    ("Invoice", "📄"),
    ("Bank transfer", "🏦"),
];

/// Create a starter set of accounts, categories and payment methods for `owner`.
///
/// Everything is created in a single SQL transaction, so either all rows are
/// created or none are. Expense and recurrence types are not created since
/// every owner already shares the defaults.
///
/// # Errors
/// Returns an [Error::SqlError] if any row could not be created.
pub fn seed_starter_data(owner: &OwnerId, connection: &mut Connection) -> Result<(), Error> {
    let transaction = connection.transaction()?;

    for name in STARTER_ACCOUNTS {
        create_account(
            owner,
            &AccountForm {
                name: name.to_owned(),
                logo_url: None,
                balance: Money::ZERO,
            },
            &transaction,
        )?;
    }

    let categories = INCOME_CATEGORIES
        .iter()
        .map(|category| (TransactionKind::Income, category))
        .chain(
            EXPENSE_CATEGORIES
                .iter()
                .map(|category| (TransactionKind::Expense, category)),
        );

    for (kind, (name, color, icon)) in categories {
        create_category(
            owner,
            &CategoryForm {
                name: (*name).to_owned(),
                kind,
                color: Some((*color).to_owned()),
                icon: Some((*icon).to_owned()),
            },
            &transaction,
        )?;
    }

    for (name, icon) in PAYMENT_METHODS {
        create_payment_method(
            owner,
            &PaymentMethodForm {
                name: name.to_owned(),
                icon: Some(icon.to_owned()),
            },
            &transaction,
        )?;
    }

    transaction.commit()?;

    Ok(())
}

/// The state needed to seed starter data.
#[derive(Debug, Clone)]
pub struct SeedState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SeedState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that creates the starter data for the caller.
pub async fn seed_data_endpoint(
    State(state): State<SeedState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let mut connection = lock_connection(&state.db_connection)?;

    seed_starter_data(&owner, &mut connection)
        .inspect_err(|error| tracing::error!("Could not seed starter data for {owner}: {error}"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Starter data created successfully" })),
    ))
}
