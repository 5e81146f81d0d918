#![allow(missing_docs)]

use rusqlite::Connection;

use crate::{
    Money, OwnerId, TransactionKind,
    account::{AccountForm, AccountId, create_account},
    category::{CategoryForm, CategoryId, create_category},
    db::initialize,
    payment_method::{PaymentMethodForm, PaymentMethodId, create_payment_method},
};

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

pub(crate) fn test_owner() -> OwnerId {
    OwnerId::new("test-owner")
}

/// The IDs of the rows every transaction needs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fixtures {
    pub account_id: AccountId,
    pub income_category_id: CategoryId,
    pub expense_category_id: CategoryId,
    pub payment_method_id: PaymentMethodId,
}

/// Create an account, an income and an expense category and a payment method for `owner`.
pub(crate) fn insert_fixtures(owner: &OwnerId, connection: &Connection) -> Fixtures {
    let account = create_account(
        owner,
        &AccountForm {
            name: "Checking".to_owned(),
            logo_url: None,
            balance: Money::ZERO,
        },
        connection,
    )
    .expect("Could not create account");

    let category = |name: &str, kind| {
        create_category(
            owner,
            &CategoryForm {
                name: name.to_owned(),
                kind,
                color: None,
                icon: None,
            },
            connection,
        )
        .expect("Could not create category")
        .id
    };
    let income_category_id = category("Salary", TransactionKind::Income);
    let expense_category_id = category("Groceries", TransactionKind::Expense);

    let payment_method = create_payment_method(
        owner,
        &PaymentMethodForm {
            name: "Debit".to_owned(),
            icon: None,
        },
        connection,
    )
    .expect("Could not create payment method");

    Fixtures {
        account_id: account.id,
        income_category_id,
        expense_category_id,
        payment_method_id: payment_method.id,
    }
}
