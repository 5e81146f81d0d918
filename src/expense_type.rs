//! Expense types classify spending as essential, non-essential or investment.

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

/// Database identifier for an expense type.
pub type ExpenseTypeId = i64;

/// The expense types every owner sees, as (name, color).
const DEFAULT_EXPENSE_TYPES: [(&str, &str); 3] = [
    ("Essential", "#DC2626"),
    ("Non-essential", "#F59E0B"),
    ("Investment", "#10B981"),
];

/// A classification for expenses, e.g. "Essential".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseType {
    pub id: ExpenseTypeId,
    pub name: String,
    /// A hex color code.
    pub color: Option<String>,
    pub active: bool,
}

/// The data for creating an expense type.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseTypeForm {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

pub fn create_expense_type_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense_type (
            id INTEGER PRIMARY KEY,
            owner_id TEXT,
            name TEXT NOT NULL,
            color TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_expense_type_owner ON expense_type(owner_id);",
    )?;

    Ok(())
}

/// Insert the shared expense types if the table is empty.
pub fn insert_default_expense_types(connection: &Connection) -> Result<(), rusqlite::Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM expense_type", [], |row| {
        row.get(0)
    })?;

    if count > 0 {
        return Ok(());
    }

    let mut statement =
        connection.prepare("INSERT INTO expense_type (owner_id, name, color) VALUES (NULL, ?1, ?2)")?;

    for (name, color) in DEFAULT_EXPENSE_TYPES {
        statement.execute(params![name, color])?;
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<ExpenseType, rusqlite::Error> {
    Ok(ExpenseType {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        active: row.get(3)?,
    })
}

pub fn create_expense_type(
    owner: &OwnerId,
    form: &ExpenseTypeForm,
    connection: &Connection,
) -> Result<ExpenseType, Error> {
    let name = Name::new(&form.name)?;

    connection
        .prepare(
            "INSERT INTO expense_type (owner_id, name, color) VALUES (?1, ?2, ?3)
             RETURNING id, name, color, active",
        )?
        .query_row(
            params![
                owner.as_str(),
                name.as_ref(),
                non_empty(form.color.as_deref())
            ],
            map_row,
        )
        .map_err(Error::from)
}

/// The active expense types of `owner` plus the shared defaults, ordered by name.
pub fn list_expense_types(
    owner: &OwnerId,
    connection: &Connection,
) -> Result<Vec<ExpenseType>, Error> {
    connection
        .prepare(
            "SELECT id, name, color, active FROM expense_type
             WHERE active = 1 AND (owner_id = ?1 OR owner_id IS NULL)
             ORDER BY name ASC, id ASC",
        )?
        .query_map([owner.as_str()], map_row)?
        .map(|maybe_type| maybe_type.map_err(Error::from))
        .collect()
}

pub fn deactivate_expense_type(
    owner: &OwnerId,
    id: ExpenseTypeId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE expense_type SET active = 0 WHERE id = ?1 AND owner_id = ?2",
        params![id, owner.as_str()],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpenseType);
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub struct ExpenseTypeState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpenseTypeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn list_expense_types_endpoint(
    State(state): State<ExpenseTypeState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<Vec<ExpenseType>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_expense_types(&owner, &connection).map(Json)
}

pub async fn create_expense_type_endpoint(
    State(state): State<ExpenseTypeState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Json(form), _): WithRejection<Json<ExpenseTypeForm>, Error>,
) -> Result<(StatusCode, Json<ExpenseType>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let expense_type = create_expense_type(&owner, &form, &connection)?;

    Ok((StatusCode::CREATED, Json(expense_type)))
}

pub async fn deactivate_expense_type_endpoint(
    State(state): State<ExpenseTypeState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(expense_type_id), _): WithRejection<Path<ExpenseTypeId>, Error>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    deactivate_expense_type(&owner, expense_type_id, &connection)?;

    Ok(Json(json!({ "message": "Expense type deleted successfully" })))
}
