//! Database queries for transactions.

use rusqlite::{Connection, Row, params};

use crate::{
    Error, OwnerId,
    db::{Reference, ensure_visible},
    name::non_empty,
    transaction::{Transaction, TransactionFilter, TransactionForm, TransactionId},
};

/// Initialize the transaction table and indexes.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            owner_id TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            description TEXT NOT NULL,
            amount TEXT NOT NULL,
            transaction_date TEXT NOT NULL,
            reference_month INTEGER NOT NULL CHECK (reference_month BETWEEN 1 AND 12),
            reference_year INTEGER NOT NULL,
            notes TEXT,
            account_id INTEGER NOT NULL REFERENCES account(id),
            category_id INTEGER NOT NULL REFERENCES category(id),
            payment_method_id INTEGER NOT NULL REFERENCES payment_method(id),
            expense_type_id INTEGER REFERENCES expense_type(id),
            recurrence_type_id INTEGER REFERENCES recurrence_type(id),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_owner_period
            ON \"transaction\"(owner_id, reference_year, reference_month);
        CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(transaction_date);",
    )?;

    Ok(())
}

const SELECT_TRANSACTION: &str = "SELECT t.id, t.kind, t.description, t.amount,
        t.transaction_date, t.reference_month, t.reference_year, t.notes,
        t.account_id, a.name, t.category_id, c.name, t.payment_method_id, pm.name,
        t.expense_type_id, et.name, t.recurrence_type_id, rt.name
    FROM \"transaction\" t
    LEFT JOIN account a ON a.id = t.account_id
    LEFT JOIN category c ON c.id = t.category_id
    LEFT JOIN payment_method pm ON pm.id = t.payment_method_id
    LEFT JOIN expense_type et ON et.id = t.expense_type_id
    LEFT JOIN recurrence_type rt ON rt.id = t.recurrence_type_id";

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        kind: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        transaction_date: row.get(4)?,
        reference_month: row.get(5)?,
        reference_year: row.get(6)?,
        notes: row.get(7)?,
        account_id: row.get(8)?,
        account: row.get(9)?,
        category_id: row.get(10)?,
        category: row.get(11)?,
        payment_method_id: row.get(12)?,
        payment_method: row.get(13)?,
        expense_type_id: row.get(14)?,
        expense_type: row.get(15)?,
        recurrence_type_id: row.get(16)?,
        recurrence_type: row.get(17)?,
    })
}

fn ensure_references_visible(
    owner: &OwnerId,
    form: &TransactionForm,
    connection: &Connection,
) -> Result<(), Error> {
    ensure_visible(owner, Reference::Account, form.account_id, connection)?;
    ensure_visible(owner, Reference::Category, form.category_id, connection)?;
    ensure_visible(
        owner,
        Reference::PaymentMethod,
        form.payment_method_id,
        connection,
    )?;

    if let Some(id) = form.expense_type_id {
        ensure_visible(owner, Reference::ExpenseType, id, connection)?;
    }

    if let Some(id) = form.recurrence_type_id {
        ensure_visible(owner, Reference::RecurrenceType, id, connection)?;
    }

    Ok(())
}

/// Create a new transaction for `owner`.
///
/// The reference month and year are derived from the transaction date.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] or [Error::EmptyDescription] if the form is invalid,
/// - [Error::InvalidReference] if a referenced row does not exist or is not visible to `owner`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    owner: &OwnerId,
    form: &TransactionForm,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let period = form.validate()?;
    ensure_references_visible(owner, form, connection)?;

    connection.execute(
        "INSERT INTO \"transaction\" (owner_id, kind, description, amount, transaction_date,
            reference_month, reference_year, notes, account_id, category_id, payment_method_id,
            expense_type_id, recurrence_type_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            owner.as_str(),
            form.kind,
            form.description.trim(),
            form.amount,
            form.transaction_date,
            period.month,
            period.year,
            non_empty(form.notes.as_deref()),
            form.account_id,
            form.category_id,
            form.payment_method_id,
            form.expense_type_id,
            form.recurrence_type_id,
        ],
    )?;

    get_transaction(owner, connection.last_insert_rowid(), connection)
}

/// Retrieve a transaction of `owner` by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `owner` has no transaction with `id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    owner: &OwnerId,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.id = ?1 AND t.owner_id = ?2"
        ))?
        .query_row(params![id, owner.as_str()], map_row)
        .map_err(Error::from)
}

/// Retrieve the transactions of `owner` that match `filter`, newest first.
///
/// # Errors
/// Returns [Error::InvalidMonth] or [Error::InvalidYear] for an out of range
/// filter, or [Error::SqlError] if there is some SQL error.
pub fn list_transactions(
    owner: &OwnerId,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    filter.validate()?;

    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION}
             WHERE t.owner_id = ?1
                AND (?2 IS NULL OR t.reference_month = ?2)
                AND (?3 IS NULL OR t.reference_year = ?3)
                AND (?4 IS NULL OR t.kind = ?4)
             ORDER BY t.transaction_date DESC, t.id DESC"
        ))?
        .query_map(
            params![owner.as_str(), filter.month, filter.year, filter.kind],
            map_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Overwrite a transaction of `owner`, re-deriving its reference month and year.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `owner` has no transaction with `id`,
/// - the validation errors of [create_transaction],
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    owner: &OwnerId,
    id: TransactionId,
    form: &TransactionForm,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let period = form.validate()?;
    ensure_references_visible(owner, form, connection)?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET kind = ?1, description = ?2, amount = ?3,
            transaction_date = ?4, reference_month = ?5, reference_year = ?6, notes = ?7,
            account_id = ?8, category_id = ?9, payment_method_id = ?10,
            expense_type_id = ?11, recurrence_type_id = ?12
         WHERE id = ?13 AND owner_id = ?14",
        params![
            form.kind,
            form.description.trim(),
            form.amount,
            form.transaction_date,
            period.month,
            period.year,
            non_empty(form.notes.as_deref()),
            form.account_id,
            form.category_id,
            form.payment_method_id,
            form.expense_type_id,
            form.recurrence_type_id,
            id,
            owner.as_str(),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    get_transaction(owner, id, connection)
}

/// Delete a transaction of `owner`.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if `owner` has no transaction with `id`.
pub fn delete_transaction(
    owner: &OwnerId,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND owner_id = ?2",
        params![id, owner.as_str()],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

#[cfg(test)]
mod transaction_query_tests {
    use rust_decimal_macros::dec;
    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        Error, Money, OwnerId, TransactionKind,
        test_utils::{Fixtures, get_test_connection, insert_fixtures, test_owner},
        transaction::{
            TransactionFilter, TransactionForm, create_transaction, delete_transaction,
            get_transaction, list_transactions, update_transaction,
        },
    };

    fn setup() -> (Connection, Fixtures) {
        let connection = get_test_connection();
        let fixtures = insert_fixtures(&test_owner(), &connection);
        (connection, fixtures)
    }

    fn expense(fixtures: &Fixtures, amount: Money, date: Date) -> TransactionForm {
        TransactionForm {
            kind: TransactionKind::Expense,
            description: "Groceries".to_owned(),
            amount,
            transaction_date: date,
            notes: None,
            account_id: fixtures.account_id,
            category_id: fixtures.expense_category_id,
            payment_method_id: fixtures.payment_method_id,
            expense_type_id: None,
            recurrence_type_id: None,
        }
    }

    #[test]
    fn create_derives_period_and_resolves_names() {
        let (connection, fixtures) = setup();

        let transaction = create_transaction(
            &test_owner(),
            &expense(&fixtures, Money::new(dec!(42.50)), date!(2025 - 02 - 14)),
            &connection,
        )
        .unwrap();

        assert_eq!(transaction.reference_month, 2);
        assert_eq!(transaction.reference_year, 2025);
        assert_eq!(transaction.amount, Money::new(dec!(42.50)));
        assert_eq!(transaction.account.as_deref(), Some("Checking"));
        assert_eq!(transaction.category.as_deref(), Some("Groceries"));
        assert_eq!(transaction.payment_method.as_deref(), Some("Debit"));
        assert_eq!(transaction.expense_type, None);
    }

    #[test]
    fn create_rejects_non_positive_amount() {
        let (connection, fixtures) = setup();

        let result = create_transaction(
            &test_owner(),
            &expense(&fixtures, Money::ZERO, date!(2025 - 02 - 14)),
            &connection,
        );

        assert_eq!(result, Err(Error::NonPositiveAmount(Money::ZERO)));
    }

    #[test]
    fn create_rejects_missing_account() {
        let (connection, fixtures) = setup();
        let mut form = expense(&fixtures, Money::new(dec!(1)), date!(2025 - 02 - 14));
        form.account_id = 9999;

        let result = create_transaction(&test_owner(), &form, &connection);

        assert_eq!(result, Err(Error::InvalidReference));
    }

    #[test]
    fn create_rejects_account_of_other_owner() {
        let (connection, fixtures) = setup();
        let other = OwnerId::new("other");
        let other_fixtures = insert_fixtures(&other, &connection);
        let mut form = expense(&fixtures, Money::new(dec!(1)), date!(2025 - 02 - 14));
        form.account_id = other_fixtures.account_id;

        let result = create_transaction(&test_owner(), &form, &connection);

        assert_eq!(result, Err(Error::InvalidReference));
    }

    #[test]
    fn create_accepts_shared_expense_type() {
        let (connection, fixtures) = setup();
        let essential: i64 = connection
            .query_row(
                "SELECT id FROM expense_type WHERE name = 'Essential'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        let mut form = expense(&fixtures, Money::new(dec!(1)), date!(2025 - 02 - 14));
        form.expense_type_id = Some(essential);

        let transaction = create_transaction(&test_owner(), &form, &connection).unwrap();

        assert_eq!(transaction.expense_type.as_deref(), Some("Essential"));
    }

    #[test]
    fn list_orders_by_date_then_id_descending() {
        let (connection, fixtures) = setup();
        let owner = test_owner();
        let first = create_transaction(
            &owner,
            &expense(&fixtures, Money::new(dec!(1)), date!(2025 - 01 - 10)),
            &connection,
        )
        .unwrap();
        let second = create_transaction(
            &owner,
            &expense(&fixtures, Money::new(dec!(2)), date!(2025 - 01 - 20)),
            &connection,
        )
        .unwrap();
        let third = create_transaction(
            &owner,
            &expense(&fixtures, Money::new(dec!(3)), date!(2025 - 01 - 20)),
            &connection,
        )
        .unwrap();

        let transactions =
            list_transactions(&owner, &TransactionFilter::default(), &connection).unwrap();

        assert_eq!(transactions, vec![third, second, first]);
    }

    #[test]
    fn list_filters_by_period_and_kind() {
        let (connection, fixtures) = setup();
        let owner = test_owner();
        let january = create_transaction(
            &owner,
            &expense(&fixtures, Money::new(dec!(1)), date!(2025 - 01 - 10)),
            &connection,
        )
        .unwrap();
        create_transaction(
            &owner,
            &expense(&fixtures, Money::new(dec!(2)), date!(2025 - 02 - 10)),
            &connection,
        )
        .unwrap();
        let mut income = expense(&fixtures, Money::new(dec!(3)), date!(2025 - 01 - 15));
        income.kind = TransactionKind::Income;
        income.category_id = fixtures.income_category_id;
        create_transaction(&owner, &income, &connection).unwrap();

        let transactions = list_transactions(
            &owner,
            &TransactionFilter {
                month: Some(1),
                year: Some(2025),
                kind: Some(TransactionKind::Expense),
            },
            &connection,
        )
        .unwrap();

        assert_eq!(transactions, vec![january]);
    }

    #[test]
    fn list_is_scoped_to_owner() {
        let (connection, fixtures) = setup();
        create_transaction(
            &test_owner(),
            &expense(&fixtures, Money::new(dec!(1)), date!(2025 - 01 - 10)),
            &connection,
        )
        .unwrap();

        let transactions = list_transactions(
            &OwnerId::new("other"),
            &TransactionFilter::default(),
            &connection,
        )
        .unwrap();

        assert!(transactions.is_empty());
    }

    #[test]
    fn update_rederives_period() {
        let (connection, fixtures) = setup();
        let owner = test_owner();
        let transaction = create_transaction(
            &owner,
            &expense(&fixtures, Money::new(dec!(1)), date!(2025 - 01 - 31)),
            &connection,
        )
        .unwrap();

        let updated = update_transaction(
            &owner,
            transaction.id,
            &expense(&fixtures, Money::new(dec!(5)), date!(2024 - 12 - 31)),
            &connection,
        )
        .unwrap();

        assert_eq!(updated.id, transaction.id);
        assert_eq!(updated.amount, Money::new(dec!(5)));
        assert_eq!((updated.reference_month, updated.reference_year), (12, 2024));
    }

    #[test]
    fn update_missing_transaction_returns_error() {
        let (connection, fixtures) = setup();

        let result = update_transaction(
            &test_owner(),
            1234,
            &expense(&fixtures, Money::new(dec!(1)), date!(2025 - 01 - 31)),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_removes_transaction() {
        let (connection, fixtures) = setup();
        let owner = test_owner();
        let transaction = create_transaction(
            &owner,
            &expense(&fixtures, Money::new(dec!(1)), date!(2025 - 01 - 31)),
            &connection,
        )
        .unwrap();

        delete_transaction(&owner, transaction.id, &connection).unwrap();

        assert_eq!(
            get_transaction(&owner, transaction.id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_transaction(&owner, transaction.id, &connection),
            Err(Error::DeleteMissingTransaction)
        );
    }
}
