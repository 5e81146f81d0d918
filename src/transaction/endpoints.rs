//! Route handlers for transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error, OwnerId,
    db::lock_connection,
    transaction::{
        Transaction, TransactionFilter, TransactionForm, TransactionId, create_transaction,
        delete_transaction, get_transaction, list_transactions, update_transaction,
    },
};

/// The state needed to manage transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing transactions, optionally filtered with
/// `?month=`, `?year=` and `?kind=`.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Query(filter), _): WithRejection<Query<TransactionFilter>, Error>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_transactions(&owner, &filter, &connection).map(Json)
}

/// A route handler for getting a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(transaction_id), _): WithRejection<Path<TransactionId>, Error>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(&owner, transaction_id, &connection).map(Json)
}

/// A route handler for creating a new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Json(form), _): WithRejection<Json<TransactionForm>, Error>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let transaction = create_transaction(&owner, &form, &connection)?;
    tracing::debug!("Created transaction {} for {owner}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for overwriting a transaction.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(transaction_id), _): WithRejection<Path<TransactionId>, Error>,
    WithRejection(Json(form), _): WithRejection<Json<TransactionForm>, Error>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    update_transaction(&owner, transaction_id, &form, &connection).map(Json)
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(transaction_id), _): WithRejection<Path<TransactionId>, Error>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(&owner, transaction_id, &connection)?;

    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}
