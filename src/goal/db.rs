//! The goal model and its database queries.

use rust_decimal::Decimal;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, Money, OwnerId,
    category::CategoryId,
    db::{Reference, ensure_visible},
    name::{Name, non_empty},
    report::goal_progress,
    status::Status,
};

/// Database identifier for a goal.
pub type GoalId = i64;

/// An amount of money to save by a certain date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub name: String,
    pub description: Option<String>,
    /// The amount to reach, always positive.
    pub target_amount: Money,
    /// The amount saved so far.
    pub current_amount: Money,
    pub start_date: Date,
    pub end_date: Date,
    pub status: Status,
    pub category_id: Option<CategoryId>,
    /// The name of the category, if any.
    pub category: Option<String>,
    /// The current amount as a percentage of the target.
    pub progress: Decimal,
}

/// The data for creating or overwriting a goal.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub target_amount: Money,
    #[serde(default)]
    pub current_amount: Money,
    pub start_date: Date,
    pub end_date: Date,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl GoalForm {
    fn validate(&self) -> Result<Name, Error> {
        let name = Name::new(&self.name)?;

        if !self.target_amount.is_positive() {
            return Err(Error::InvalidGoalTarget(self.target_amount));
        }

        if self.current_amount < Money::ZERO {
            return Err(Error::NegativeGoalAmount(self.current_amount));
        }

        self.target_amount.validate()?;
        self.current_amount.validate()?;

        if self.end_date < self.start_date {
            return Err(Error::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }

        Ok(name)
    }
}

pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            target_amount TEXT NOT NULL,
            current_amount TEXT NOT NULL DEFAULT '0',
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'completed', 'cancelled')),
            category_id INTEGER REFERENCES category(id),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_goal_owner ON goal(owner_id);",
    )?;

    Ok(())
}

const SELECT_GOAL: &str = "SELECT g.id, g.name, g.description, g.target_amount,
        g.current_amount, g.start_date, g.end_date, g.status, g.category_id, c.name
    FROM goal g
    LEFT JOIN category c ON c.id = g.category_id";

fn map_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    let target_amount = row.get(3)?;
    let current_amount = row.get(4)?;

    Ok(Goal {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        target_amount,
        current_amount,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        status: row.get(7)?,
        category_id: row.get(8)?,
        category: row.get(9)?,
        progress: goal_progress(current_amount, target_amount),
    })
}

fn get_goal(owner: &OwnerId, id: GoalId, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(&format!("{SELECT_GOAL} WHERE g.id = ?1 AND g.owner_id = ?2"))?
        .query_row(params![id, owner.as_str()], map_row)
        .map_err(Error::from)
}

/// Create a goal for `owner`.
///
/// # Errors
/// Returns [Error::InvalidGoalTarget], [Error::NegativeGoalAmount] or
/// [Error::InvalidDateRange] for invalid amounts or dates, and
/// [Error::InvalidReference] if the category is not visible to `owner`.
pub fn create_goal(owner: &OwnerId, form: &GoalForm, connection: &Connection) -> Result<Goal, Error> {
    let name = form.validate()?;

    if let Some(category_id) = form.category_id {
        ensure_visible(owner, Reference::Category, category_id, connection)?;
    }

    connection.execute(
        "INSERT INTO goal (owner_id, name, description, target_amount, current_amount,
            start_date, end_date, status, category_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            owner.as_str(),
            name.as_ref(),
            non_empty(form.description.as_deref()),
            form.target_amount,
            form.current_amount,
            form.start_date,
            form.end_date,
            form.status,
            form.category_id,
        ],
    )?;

    get_goal(owner, connection.last_insert_rowid(), connection)
}

/// The goals of `owner`, the ones ending soonest first.
pub fn list_goals(owner: &OwnerId, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_GOAL} WHERE g.owner_id = ?1 ORDER BY g.end_date ASC, g.id ASC"
        ))?
        .query_map([owner.as_str()], map_row)?
        .map(|maybe_goal| maybe_goal.map_err(Error::from))
        .collect()
}

/// Overwrite a goal of `owner`.
///
/// # Errors
/// Returns [Error::UpdateMissingGoal] if `owner` has no goal with `id`, or the
/// validation errors of [create_goal].
pub fn update_goal(
    owner: &OwnerId,
    id: GoalId,
    form: &GoalForm,
    connection: &Connection,
) -> Result<Goal, Error> {
    let name = form.validate()?;

    if let Some(category_id) = form.category_id {
        ensure_visible(owner, Reference::Category, category_id, connection)?;
    }

    let rows_affected = connection.execute(
        "UPDATE goal SET name = ?1, description = ?2, target_amount = ?3, current_amount = ?4,
            start_date = ?5, end_date = ?6, status = ?7, category_id = ?8
         WHERE id = ?9 AND owner_id = ?10",
        params![
            name.as_ref(),
            non_empty(form.description.as_deref()),
            form.target_amount,
            form.current_amount,
            form.start_date,
            form.end_date,
            form.status,
            form.category_id,
            id,
            owner.as_str(),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    get_goal(owner, id, connection)
}

pub fn delete_goal(owner: &OwnerId, id: GoalId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM goal WHERE id = ?1 AND owner_id = ?2",
        params![id, owner.as_str()],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingGoal);
    }

    Ok(())
}
