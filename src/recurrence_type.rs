//! Recurrence types tell fixed, repeating transactions apart from variable ones.

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

use crate::{AppState, Error, OwnerId, db::lock_connection, name::Name};

/// Database identifier for a recurrence type.
pub type RecurrenceTypeId = i64;

const DEFAULT_RECURRENCE_TYPES: [&str; 2] = ["Fixed", "Variable"];

/// Whether a transaction recurs with a fixed amount, e.g. rent, or varies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceType {
    pub id: RecurrenceTypeId,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceTypeForm {
    pub name: String,
}

pub fn create_recurrence_type_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS recurrence_type (
            id INTEGER PRIMARY KEY,
            owner_id TEXT,
            name TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_recurrence_type_owner ON recurrence_type(owner_id);",
    )?;

    Ok(())
}

/// Insert the shared recurrence types if the table is empty.
pub fn insert_default_recurrence_types(connection: &Connection) -> Result<(), rusqlite::Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM recurrence_type", [], |row| {
        row.get(0)
    })?;

    if count > 0 {
        return Ok(());
    }

    let mut statement =
        connection.prepare("INSERT INTO recurrence_type (owner_id, name) VALUES (NULL, ?1)")?;

    for name in DEFAULT_RECURRENCE_TYPES {
        statement.execute([name])?;
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<RecurrenceType, rusqlite::Error> {
    Ok(RecurrenceType {
        id: row.get(0)?,
        name: row.get(1)?,
        active: row.get(2)?,
    })
}

pub fn create_recurrence_type(
    owner: &OwnerId,
    form: &RecurrenceTypeForm,
    connection: &Connection,
) -> Result<RecurrenceType, Error> {
    let name = Name::new(&form.name)?;

    connection
        .prepare(
            "INSERT INTO recurrence_type (owner_id, name) VALUES (?1, ?2)
             RETURNING id, name, active",
        )?
        .query_row(params![owner.as_str(), name.as_ref()], map_row)
        .map_err(Error::from)
}

pub fn list_recurrence_types(
    owner: &OwnerId,
    connection: &Connection,
) -> Result<Vec<RecurrenceType>, Error> {
    connection
        .prepare(
            "SELECT id, name, active FROM recurrence_type
             WHERE active = 1 AND (owner_id = ?1 OR owner_id IS NULL)
             ORDER BY name ASC, id ASC",
        )?
        .query_map([owner.as_str()], map_row)?
        .map(|maybe_type| maybe_type.map_err(Error::from))
        .collect()
}

pub fn deactivate_recurrence_type(
    owner: &OwnerId,
    id: RecurrenceTypeId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE recurrence_type SET active = 0 WHERE id = ?1 AND owner_id = ?2",
        params![id, owner.as_str()],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingRecurrenceType);
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub struct RecurrenceTypeState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RecurrenceTypeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn list_recurrence_types_endpoint(
    State(state): State<RecurrenceTypeState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<Vec<RecurrenceType>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_recurrence_types(&owner, &connection).map(Json)
}

pub async fn create_recurrence_type_endpoint(
    State(state): State<RecurrenceTypeState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Json(form), _): WithRejection<Json<RecurrenceTypeForm>, Error>,
) -> Result<(StatusCode, Json<RecurrenceType>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let recurrence_type = create_recurrence_type(&owner, &form, &connection)?;

    Ok((StatusCode::CREATED, Json(recurrence_type)))
}

pub async fn deactivate_recurrence_type_endpoint(
    State(state): State<RecurrenceTypeState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(recurrence_type_id), _): WithRejection<Path<RecurrenceTypeId>, Error>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    deactivate_recurrence_type(&owner, recurrence_type_id, &connection)?;

    Ok(Json(json!({ "message": "Recurrence type deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use crate::{
        Error, OwnerId,
        test_utils::{get_test_connection, test_owner},
    };

    use super::{
        RecurrenceTypeForm, create_recurrence_type, deactivate_recurrence_type,
        list_recurrence_types,
    };

    #[test]
    fn shared_defaults_are_listed() {
        let connection = get_test_connection();

        let names: Vec<_> = list_recurrence_types(&test_owner(), &connection)
            .unwrap()
            .into_iter()
            .map(|recurrence_type| recurrence_type.name)
            .collect();

        assert_eq!(names, vec!["Fixed", "Variable"]);
    }

    #[test]
    fn owned_types_are_private() {
        let connection = get_test_connection();
        let owner = test_owner();
        let yearly = create_recurrence_type(
            &owner,
            &RecurrenceTypeForm {
                name: "Yearly".to_owned(),
            },
            &connection,
        )
        .unwrap();

        let other_owner_types =
            list_recurrence_types(&OwnerId::new("other"), &connection).unwrap();

        assert!(!other_owner_types.contains(&yearly));
        assert_eq!(
            deactivate_recurrence_type(&OwnerId::new("other"), yearly.id, &connection),
            Err(Error::DeleteMissingRecurrenceType)
        );
    }
}
