//! Lifecycle status shared by goals and installment plans.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Where a goal or installment plan is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Still being worked towards or paid off.
    #[default]
    Active,
    /// Reached or fully paid.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Completed => "completed",
            Status::Cancelled => "cancelled",
        }
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "active" => Ok(Status::Active),
            "completed" => Ok(Status::Completed),
            "cancelled" => Ok(Status::Cancelled),
            other => Err(FromSqlError::Other(
                format!("unknown status \"{other}\"").into(),
            )),
        }
    }
}
