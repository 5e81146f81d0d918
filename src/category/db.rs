//! The category model and its database queries.

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};

use crate::{
    Error, OwnerId, TransactionKind,
    name::{Name, non_empty},
};

/// Database identifier for a category.
pub type CategoryId = i64;

/// A category for grouping transactions (e.g., 'Groceries', 'Salary').
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The id for the category.
    pub id: CategoryId,
    /// The display name.
    pub name: String,
    /// Whether the category is for income or expenses. Fixed at creation.
    pub kind: TransactionKind,
    /// A hex color code, e.g. "#10B981".
    pub color: Option<String>,
    /// An icon, typically an emoji.
    pub icon: Option<String>,
    /// Inactive categories are hidden from listings but kept for old transactions.
    pub active: bool,
}

/// The data for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub kind: TransactionKind,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// The data for updating a category. The kind cannot be changed.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryUpdateForm {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            owner_id TEXT,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            color TEXT,
            icon TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_category_owner ON category(owner_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        color: row.get(3)?,
        icon: row.get(4)?,
        active: row.get(5)?,
    })
}

/// Create a category for `owner` and return it with its generated ID.
pub fn create_category(
    owner: &OwnerId,
    form: &CategoryForm,
    connection: &Connection,
) -> Result<Category, Error> {
    let name = Name::new(&form.name)?;

    connection
        .prepare(
            "INSERT INTO category (owner_id, name, kind, color, icon) VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, name, kind, color, icon, active",
        )?
        .query_row(
            params![
                owner.as_str(),
                name.as_ref(),
                form.kind,
                non_empty(form.color.as_deref()),
                non_empty(form.icon.as_deref()),
            ],
            map_row,
        )
        .map_err(Error::from)
}

/// Retrieve the active categories visible to `owner`, optionally only those of `kind`.
///
/// Shared default categories (without an owner) are included.
pub fn list_categories(
    owner: &OwnerId,
    kind: Option<TransactionKind>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, color, icon, active FROM category
             WHERE active = 1
                AND (owner_id = ?1 OR owner_id IS NULL)
                AND (?2 IS NULL OR kind = ?2)
             ORDER BY name ASC, id ASC",
        )?
        .query_map(params![owner.as_str(), kind], map_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Update a category's name, color and icon. Returns an error if `owner` has no such category.
pub fn update_category(
    owner: &OwnerId,
    id: CategoryId,
    form: &CategoryUpdateForm,
    connection: &Connection,
) -> Result<Category, Error> {
    let name = Name::new(&form.name)?;

    connection
        .prepare(
            "UPDATE category SET name = ?1, color = ?2, icon = ?3
             WHERE id = ?4 AND owner_id = ?5
             RETURNING id, name, kind, color, icon, active",
        )?
        .query_row(
            params![
                name.as_ref(),
                non_empty(form.color.as_deref()),
                non_empty(form.icon.as_deref()),
                id,
                owner.as_str()
            ],
            map_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingCategory,
            error => error.into(),
        })
}

/// Deactivate a category. Returns an error if `owner` has no such category.
pub fn deactivate_category(
    owner: &OwnerId,
    id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET active = 0 WHERE id = ?1 AND owner_id = ?2",
        params![id, owner.as_str()],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}
