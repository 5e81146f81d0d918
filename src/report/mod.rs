//! Reports built from the owner's transactions: dashboard totals, a monthly
//! balance for a year and totals grouped by category, payment method, expense
//! type or recurrence type.

mod aggregation;
mod handlers;

pub use aggregation::{compute_installment_amount, goal_progress, installments_remaining};
pub use handlers::{
    get_category_summary, get_dashboard, get_expense_type_summary, get_monthly_balance,
    get_payment_method_summary, get_recurrence_type_summary,
};
