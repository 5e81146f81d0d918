//! Database initialization and access to the shared connection.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior, params};

use crate::{
    Error, OwnerId,
    account::create_account_table,
    category::create_category_table,
    expense_type::{create_expense_type_table, insert_default_expense_types},
    goal::create_goal_table,
    installment::create_installment_plan_table,
    payment_method::create_payment_method_table,
    recurrence_type::{create_recurrence_type_table, insert_default_recurrence_types},
    transaction::create_transaction_table,
};

/// Create the tables for the domain models and the shared default rows.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_account_table(&transaction)?;
    create_category_table(&transaction)?;
    create_payment_method_table(&transaction)?;
    create_expense_type_table(&transaction)?;
    create_recurrence_type_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_goal_table(&transaction)?;
    create_installment_plan_table(&transaction)?;

    insert_default_expense_types(&transaction)?;
    insert_default_recurrence_types(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Acquire the lock on the shared database connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned.
pub fn lock_connection(db_connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
}

/// A table whose rows can be referenced by transactions, goals and installment plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Account,
    Category,
    PaymentMethod,
    ExpenseType,
    RecurrenceType,
}

impl Reference {
    fn table(self) -> &'static str {
        match self {
            Reference::Account => "account",
            Reference::Category => "category",
            Reference::PaymentMethod => "payment_method",
            Reference::ExpenseType => "expense_type",
            Reference::RecurrenceType => "recurrence_type",
        }
    }
}

/// Check that the row `id` of `reference` exists and is visible to `owner`.
///
/// Accounts must belong to `owner`; the other tables also allow shared rows.
/// Deactivated rows still count so that old records can be edited.
///
/// # Errors
/// Returns [Error::InvalidReference] if the row is missing or belongs to someone else.
pub fn ensure_visible(
    owner: &OwnerId,
    reference: Reference,
    id: i64,
    connection: &Connection,
) -> Result<(), Error> {
    let shared_clause = match reference {
        Reference::Account => "",
        _ => " OR owner_id IS NULL",
    };
    let query = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1 AND (owner_id = ?2{shared_clause}))",
        reference.table()
    );

    let exists: bool = connection.query_row(&query, params![id, owner.as_str()], |row| row.get(0))?;

    if exists {
        Ok(())
    } else {
        Err(Error::InvalidReference)
    }
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), initialize(&connection));
    }

    #[test]
    fn can_initialize_twice_without_duplicating_defaults() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        initialize(&connection).unwrap();

        let expense_types: i64 = connection
            .query_row("SELECT COUNT(id) FROM expense_type", [], |row| row.get(0))
            .unwrap();
        let recurrence_types: i64 = connection
            .query_row("SELECT COUNT(id) FROM recurrence_type", [], |row| row.get(0))
            .unwrap();
        assert_eq!(expense_types, 3);
        assert_eq!(recurrence_types, 2);
    }

    #[test]
    fn enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let foreign_keys: i64 = connection
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();

        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn shared_rows_are_visible_but_other_owners_rows_are_not() {
        use crate::{
            OwnerId,
            test_utils::{get_test_connection, insert_fixtures, test_owner},
        };

        use super::{Reference, ensure_visible};

        let connection = get_test_connection();
        let fixtures = insert_fixtures(&test_owner(), &connection);
        let shared_expense_type: i64 = connection
            .query_row("SELECT id FROM expense_type LIMIT 1", [], |row| row.get(0))
            .unwrap();

        assert_eq!(
            ensure_visible(&test_owner(), Reference::ExpenseType, shared_expense_type, &connection),
            Ok(())
        );
        assert_eq!(
            ensure_visible(&test_owner(), Reference::Account, fixtures.account_id, &connection),
            Ok(())
        );
        assert_eq!(
            ensure_visible(
                &OwnerId::new("other"),
                Reference::Account,
                fixtures.account_id,
                &connection
            ),
            Err(crate::Error::InvalidReference)
        );
    }
}
