//! Route handlers for listing, creating, updating and deactivating accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error, OwnerId,
    account::{
        Account, AccountForm, AccountId, create_account, deactivate_account, list_accounts,
        update_account,
    },
    db::lock_connection,
};

/// The state needed to manage accounts.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing the owner's active accounts.
pub async fn list_accounts_endpoint(
    State(state): State<AccountState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<Vec<Account>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_accounts(&owner, &connection)
        .inspect_err(|error| tracing::error!("Could not list accounts for {owner}: {error}"))
        .map(Json)
}

/// A route handler for creating a new account, responds with the created account.
pub async fn create_account_endpoint(
    State(state): State<AccountState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Json(form), _): WithRejection<Json<AccountForm>, Error>,
) -> Result<(StatusCode, Json<Account>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let account = create_account(&owner, &form, &connection)?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// A route handler for overwriting an account's name, logo and balance.
pub async fn update_account_endpoint(
    State(state): State<AccountState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(account_id), _): WithRejection<Path<AccountId>, Error>,
    WithRejection(Json(form), _): WithRejection<Json<AccountForm>, Error>,
) -> Result<Json<Account>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    update_account(&owner, account_id, &form, &connection).map(Json)
}

/// A route handler for deactivating an account.
pub async fn deactivate_account_endpoint(
    State(state): State<AccountState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(account_id), _): WithRejection<Path<AccountId>, Error>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    deactivate_account(&owner, account_id, &connection)?;

    Ok(Json(json!({ "message": "Account deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::WithRejection;
    use rust_decimal_macros::dec;

    use crate::{
        Error, Money,
        account::{
            AccountForm, create_account_endpoint, deactivate_account_endpoint,
            list_accounts_endpoint,
        },
        test_utils::{get_test_connection, test_owner},
    };

    use super::AccountState;

    fn get_state() -> AccountState {
        AccountState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        }
    }

    #[tokio::test]
    async fn can_create_and_list_account() {
        let state = get_state();
        let form = AccountForm {
            name: "test account".to_owned(),
            logo_url: None,
            balance: Money::new(dec!(123.45)),
        };

        let (status, Json(created)) = create_account_endpoint(
            State(state.clone()),
            Extension(test_owner()),
            WithRejection(Json(form), Default::default()),
        )
        .await
        .unwrap();
        let Json(accounts) = list_accounts_endpoint(State(state), Extension(test_owner()))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(accounts, vec![created]);
    }

    #[tokio::test]
    async fn deactivating_missing_account_returns_error() {
        let state = get_state();

        let result = deactivate_account_endpoint(
            State(state),
            Extension(test_owner()),
            WithRejection(Path(42), Default::default()),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::DeleteMissingAccount);
    }
}
