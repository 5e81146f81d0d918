//! The installment plan model and its database queries.

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, Money, OwnerId,
    account::AccountId,
    category::CategoryId,
    db::{Reference, ensure_visible},
    report::{compute_installment_amount, installments_remaining},
    status::Status,
};

/// Database identifier for an installment plan.
pub type InstallmentPlanId = i64;

/// A purchase split into equal installments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub id: InstallmentPlanId,
    pub description: String,
    pub total_amount: Money,
    /// The amount of each installment, the total split evenly and rounded to the cent.
    pub installment_amount: Money,
    pub total_installments: i64,
    pub installments_paid: i64,
    /// The number of installments left, negative if more were paid than planned.
    pub installments_remaining: i64,
    pub first_installment_date: Date,
    pub account_id: AccountId,
    /// The name of the account.
    pub account: Option<String>,
    pub category_id: CategoryId,
    /// The name of the category.
    pub category: Option<String>,
    pub status: Status,
}

/// The data for creating or overwriting an installment plan.
///
/// The installment amount is always computed from the total and the number of installments.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallmentPlanForm {
    pub description: String,
    pub total_amount: Money,
    pub total_installments: i64,
    #[serde(default)]
    pub installments_paid: i64,
    pub first_installment_date: Date,
    pub account_id: AccountId,
    pub category_id: CategoryId,
    #[serde(default)]
    pub status: Status,
}

impl InstallmentPlanForm {
    /// Validate the form and compute the installment amount.
    fn validate(&self) -> Result<Money, Error> {
        if self.description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }

        if !self.total_amount.is_positive() {
            return Err(Error::NonPositiveAmount(self.total_amount));
        }

        self.total_amount.validate()?;

        let installment_amount =
            compute_installment_amount(self.total_amount, self.total_installments)?;

        if !(0..=self.total_installments).contains(&self.installments_paid) {
            return Err(Error::InstallmentsPaidOutOfRange {
                paid: self.installments_paid,
                total: self.total_installments,
            });
        }

        Ok(installment_amount)
    }

    fn ensure_references_visible(
        &self,
        owner: &OwnerId,
        connection: &Connection,
    ) -> Result<(), Error> {
        ensure_visible(owner, Reference::Account, self.account_id, connection)?;
        ensure_visible(owner, Reference::Category, self.category_id, connection)
    }
}

pub fn create_installment_plan_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS installment_plan (
            id INTEGER PRIMARY KEY,
            owner_id TEXT NOT NULL,
            description TEXT NOT NULL,
            total_amount TEXT NOT NULL,
            installment_amount TEXT NOT NULL,
            total_installments INTEGER NOT NULL CHECK (total_installments > 0),
            installments_paid INTEGER NOT NULL DEFAULT 0,
            first_installment_date TEXT NOT NULL,
            account_id INTEGER NOT NULL REFERENCES account(id),
            category_id INTEGER NOT NULL REFERENCES category(id),
            status TEXT NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'completed', 'cancelled')),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_installment_plan_owner ON installment_plan(owner_id);",
    )?;

    Ok(())
}

const SELECT_PLAN: &str = "SELECT p.id, p.description, p.total_amount, p.installment_amount,
        p.total_installments, p.installments_paid, p.first_installment_date,
        p.account_id, a.name, p.category_id, c.name, p.status
    FROM installment_plan p
    LEFT JOIN account a ON a.id = p.account_id
    LEFT JOIN category c ON c.id = p.category_id";

fn map_row(row: &Row) -> Result<InstallmentPlan, rusqlite::Error> {
    let total_installments = row.get(4)?;
    let installments_paid = row.get(5)?;

    Ok(InstallmentPlan {
        id: row.get(0)?,
        description: row.get(1)?,
        total_amount: row.get(2)?,
        installment_amount: row.get(3)?,
        total_installments,
        installments_paid,
        installments_remaining: installments_remaining(total_installments, installments_paid),
        first_installment_date: row.get(6)?,
        account_id: row.get(7)?,
        account: row.get(8)?,
        category_id: row.get(9)?,
        category: row.get(10)?,
        status: row.get(11)?,
    })
}

fn get_installment_plan(
    owner: &OwnerId,
    id: InstallmentPlanId,
    connection: &Connection,
) -> Result<InstallmentPlan, Error> {
    connection
        .prepare(&format!("{SELECT_PLAN} WHERE p.id = ?1 AND p.owner_id = ?2"))?
        .query_row(params![id, owner.as_str()], map_row)
        .map_err(Error::from)
}

/// Create an installment plan for `owner`, computing the installment amount.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyDescription] or [Error::NonPositiveAmount] for a blank description or total,
/// - [Error::InvalidInstallmentCount] if there are zero or fewer installments,
/// - [Error::InstallmentsPaidOutOfRange] if the paid count is negative or above the total,
/// - [Error::InvalidReference] if the account or category is not visible to `owner`.
pub fn create_installment_plan(
    owner: &OwnerId,
    form: &InstallmentPlanForm,
    connection: &Connection,
) -> Result<InstallmentPlan, Error> {
    let installment_amount = form.validate()?;
    form.ensure_references_visible(owner, connection)?;

    connection.execute(
        "INSERT INTO installment_plan (owner_id, description, total_amount, installment_amount,
            total_installments, installments_paid, first_installment_date, account_id,
            category_id, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            owner.as_str(),
            form.description.trim(),
            form.total_amount,
            installment_amount,
            form.total_installments,
            form.installments_paid,
            form.first_installment_date,
            form.account_id,
            form.category_id,
            form.status,
        ],
    )?;

    get_installment_plan(owner, connection.last_insert_rowid(), connection)
}

/// The installment plans of `owner`, the most recently started first.
pub fn list_installment_plans(
    owner: &OwnerId,
    connection: &Connection,
) -> Result<Vec<InstallmentPlan>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_PLAN} WHERE p.owner_id = ?1
             ORDER BY p.first_installment_date DESC, p.id DESC"
        ))?
        .query_map([owner.as_str()], map_row)?
        .map(|maybe_plan| maybe_plan.map_err(Error::from))
        .collect()
}

/// Overwrite an installment plan of `owner`, recomputing the installment amount.
///
/// # Errors
/// Returns [Error::UpdateMissingInstallmentPlan] if `owner` has no plan with
/// `id`, or the validation errors of [create_installment_plan].
pub fn update_installment_plan(
    owner: &OwnerId,
    id: InstallmentPlanId,
    form: &InstallmentPlanForm,
    connection: &Connection,
) -> Result<InstallmentPlan, Error> {
    let installment_amount = form.validate()?;
    form.ensure_references_visible(owner, connection)?;

    let rows_affected = connection.execute(
        "UPDATE installment_plan SET description = ?1, total_amount = ?2,
            installment_amount = ?3, total_installments = ?4, installments_paid = ?5,
            first_installment_date = ?6, account_id = ?7, category_id = ?8, status = ?9
         WHERE id = ?10 AND owner_id = ?11",
        params![
            form.description.trim(),
            form.total_amount,
            installment_amount,
            form.total_installments,
            form.installments_paid,
            form.first_installment_date,
            form.account_id,
            form.category_id,
            form.status,
            id,
            owner.as_str(),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingInstallmentPlan);
    }

    get_installment_plan(owner, id, connection)
}

pub fn delete_installment_plan(
    owner: &OwnerId,
    id: InstallmentPlanId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM installment_plan WHERE id = ?1 AND owner_id = ?2",
        params![id, owner.as_str()],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingInstallmentPlan);
    }

    Ok(())
}
