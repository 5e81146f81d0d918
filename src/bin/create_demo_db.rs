use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use ledger_rs::{
    Money, OwnerId, TransactionForm, TransactionKind, create_transaction, initialize_db,
    seed_starter_data,
};

/// A utility for creating a demo database for the REST API server of ledger_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The bearer token of the demo owner.
    #[arg(long, default_value = "demo")]
    owner: String,
}

/// (kind, description, amount in cents, days ago, category name, payment method name)
const DEMO_TRANSACTIONS: [(TransactionKind, &str, i64, i64, &str, &str); 6] = [
    (TransactionKind::Income, "Monthly salary", 520000, 12, "Salary", "Bank transfer"),
    (TransactionKind::Expense, "Supermarket", 38745, 10, "Groceries", "Debit"),
    (TransactionKind::Expense, "Electricity bill", 14390, 8, "Electricity", "Invoice"),
    (TransactionKind::Expense, "Fibre plan", 9990, 6, "Internet", "Credit"),
    (TransactionKind::Expense, "Dinner out", 12800, 3, "Food", "Credit"),
    (TransactionKind::Income, "Sold old bike", 45000, 1, "Sales", "Instant transfer"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let mut conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let owner = OwnerId::new(&args.owner);

    println!("Creating starter data for {owner}...");
    seed_starter_data(&owner, &mut conn)?;

    println!("Creating demo transactions...");
    let account_id: i64 = conn.query_row(
        "SELECT id FROM account WHERE owner_id = ?1 ORDER BY id LIMIT 1",
        params![owner.as_str()],
        |row| row.get(0),
    )?;
    let today = OffsetDateTime::now_utc().date();

    for (kind, description, cents, days_ago, category, payment_method) in DEMO_TRANSACTIONS {
        let category_id: i64 = conn.query_row(
            "SELECT id FROM category WHERE owner_id = ?1 AND name = ?2",
            params![owner.as_str(), category],
            |row| row.get(0),
        )?;
        let payment_method_id: i64 = conn.query_row(
            "SELECT id FROM payment_method WHERE owner_id = ?1 AND name = ?2",
            params![owner.as_str(), payment_method],
            |row| row.get(0),
        )?;

        let form = TransactionForm {
            kind,
            description: description.to_owned(),
            amount: Money::new(Decimal::new(cents, 2)),
            transaction_date: today - Duration::days(days_ago),
            notes: None,
            account_id,
            category_id,
            payment_method_id,
            expense_type_id: None,
            recurrence_type_id: None,
        };

        create_transaction(&owner, &form, &conn)?;
    }

    println!("Success! Use the bearer token {:?} to query the demo data.", args.owner);

    Ok(())
}
