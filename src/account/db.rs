//! The account model and its database queries.

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Money, OwnerId,
    name::{Name, non_empty},
};

/// Database identifier for an account.
pub type AccountId = i64;

/// The amount of money available in a bank account, wallet or card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The display name, e.g. the bank's name.
    pub name: String,
    /// An optional URL of a logo to display next to the account.
    pub logo_url: Option<String>,
    /// The balance.
    pub balance: Money,
    /// Inactive accounts are hidden from listings but kept for old transactions.
    pub active: bool,
}

/// The data for creating or updating an account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountForm {
    /// The display name.
    pub name: String,
    /// An optional URL of a logo.
    #[serde(default)]
    pub logo_url: Option<String>,
    /// The balance, zero when omitted.
    #[serde(default)]
    pub balance: Money,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            logo_url TEXT,
            balance TEXT NOT NULL DEFAULT '0',
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_account_owner ON account(owner_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        logo_url: row.get(2)?,
        balance: row.get(3)?,
        active: row.get(4)?,
    })
}

/// Create an account for `owner`.
///
/// # Errors
/// Returns [Error::EmptyName] if the name is blank, [Error::InvalidAmountScale] or
/// [Error::AmountOutOfRange] if the balance is not whole cents within range, or
/// [Error::SqlError] if there is some SQL error.
pub fn create_account(
    owner: &OwnerId,
    form: &AccountForm,
    connection: &Connection,
) -> Result<Account, Error> {
    let name = Name::new(&form.name)?;
    let balance = form.balance.validate()?;

    connection
        .prepare(
            "INSERT INTO account (owner_id, name, logo_url, balance) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, logo_url, balance, active",
        )?
        .query_row(
            params![
                owner.as_str(),
                name.as_ref(),
                non_empty(form.logo_url.as_deref()),
                balance
            ],
            map_row,
        )
        .map_err(Error::from)
}

/// Get the active accounts of `owner` ordered by name.
pub fn list_accounts(owner: &OwnerId, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, name, logo_url, balance, active FROM account
             WHERE owner_id = ?1 AND active = 1
             ORDER BY name ASC, id ASC",
        )?
        .query_map([owner.as_str()], map_row)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Overwrite the fields of an account owned by `owner`.
///
/// # Errors
/// Returns [Error::UpdateMissingAccount] if `owner` has no account with `id`.
pub fn update_account(
    owner: &OwnerId,
    id: AccountId,
    form: &AccountForm,
    connection: &Connection,
) -> Result<Account, Error> {
    let name = Name::new(&form.name)?;
    let balance = form.balance.validate()?;

    connection
        .prepare(
            "UPDATE account SET name = ?1, logo_url = ?2, balance = ?3
             WHERE id = ?4 AND owner_id = ?5
             RETURNING id, name, logo_url, balance, active",
        )?
        .query_row(
            params![
                name.as_ref(),
                non_empty(form.logo_url.as_deref()),
                balance,
                id,
                owner.as_str()
            ],
            map_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingAccount,
            error => error.into(),
        })
}

/// Hide an account from listings while keeping it for existing transactions.
///
/// # Errors
/// Returns [Error::DeleteMissingAccount] if `owner` has no account with `id`.
pub fn deactivate_account(
    owner: &OwnerId,
    id: AccountId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE account SET active = 0 WHERE id = ?1 AND owner_id = ?2",
        params![id, owner.as_str()],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingAccount);
    }

    Ok(())
}
