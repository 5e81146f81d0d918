//! Payment methods such as "Debit" or "Instant transfer", and their route handlers.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    AppState, Error, OwnerId,
    db::lock_connection,
    name::{Name, non_empty},
};

/// Database identifier for a payment method.
pub type PaymentMethodId = i64;

/// How a transaction was paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub icon: Option<String>,
    pub active: bool,
}

/// The data for creating a payment method.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodForm {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

pub fn create_payment_method_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS payment_method (
            id INTEGER PRIMARY KEY,
            owner_id TEXT,
            name TEXT NOT NULL,
            icon TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_payment_method_owner ON payment_method(owner_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<PaymentMethod, rusqlite::Error> {
    Ok(PaymentMethod {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get(2)?,
        active: row.get(3)?,
    })
}

pub fn create_payment_method(
    owner: &OwnerId,
    form: &PaymentMethodForm,
    connection: &Connection,
) -> Result<PaymentMethod, Error> {
    let name = Name::new(&form.name)?;

    connection
        .prepare(
            "INSERT INTO payment_method (owner_id, name, icon) VALUES (?1, ?2, ?3)
             RETURNING id, name, icon, active",
        )?
        .query_row(
            params![
                owner.as_str(),
                name.as_ref(),
                non_empty(form.icon.as_deref())
            ],
            map_row,
        )
        .map_err(Error::from)
}

/// The active payment methods of `owner` plus the shared ones, ordered by name.
pub fn list_payment_methods(
    owner: &OwnerId,
    connection: &Connection,
) -> Result<Vec<PaymentMethod>, Error> {
    connection
        .prepare(
            "SELECT id, name, icon, active FROM payment_method
             WHERE active = 1 AND (owner_id = ?1 OR owner_id IS NULL)
             ORDER BY name ASC, id ASC",
        )?
        .query_map([owner.as_str()], map_row)?
        .map(|maybe_method| maybe_method.map_err(Error::from))
        .collect()
}

pub fn deactivate_payment_method(
    owner: &OwnerId,
    id: PaymentMethodId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE payment_method SET active = 0 WHERE id = ?1 AND owner_id = ?2",
        params![id, owner.as_str()],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingPaymentMethod);
    }

    Ok(())
}

/// The state needed to manage payment methods.
#[derive(Debug, Clone)]
pub struct PaymentMethodState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PaymentMethodState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn list_payment_methods_endpoint(
    State(state): State<PaymentMethodState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<Vec<PaymentMethod>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_payment_methods(&owner, &connection).map(Json)
}

pub async fn create_payment_method_endpoint(
    State(state): State<PaymentMethodState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Json(form), _): WithRejection<Json<PaymentMethodForm>, Error>,
) -> Result<(StatusCode, Json<PaymentMethod>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let method = create_payment_method(&owner, &form, &connection)?;

    Ok((StatusCode::CREATED, Json(method)))
}

pub async fn deactivate_payment_method_endpoint(
    State(state): State<PaymentMethodState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(method_id), _): WithRejection<Path<PaymentMethodId>, Error>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    deactivate_payment_method(&owner, method_id, &connection)?;

    Ok(Json(json!({ "message": "Payment method deleted successfully" })))
}
