//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/accounts/{account_id}', use [format_endpoint] in tests.

/// Unauthenticated liveness probe.
pub const HEALTH: &str = "/api/health";

/// The route to list and create accounts.
pub const ACCOUNTS: &str = "/api/accounts";
/// The route to update or deactivate an account.
pub const ACCOUNT: &str = "/api/accounts/{account_id}";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to update or deactivate a category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to list and create payment methods.
pub const PAYMENT_METHODS: &str = "/api/payment-methods";
/// The route to deactivate a payment method.
pub const PAYMENT_METHOD: &str = "/api/payment-methods/{payment_method_id}";
/// The route to list and create expense types.
pub const EXPENSE_TYPES: &str = "/api/expense-types";
/// The route to deactivate an expense type.
pub const EXPENSE_TYPE: &str = "/api/expense-types/{expense_type_id}";
/// The route to list and create recurrence types.
pub const RECURRENCE_TYPES: &str = "/api/recurrence-types";
/// The route to deactivate a recurrence type.
pub const RECURRENCE_TYPE: &str = "/api/recurrence-types/{recurrence_type_id}";

/// The route to access transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to list and create goals.
pub const GOALS: &str = "/api/goals";
/// The route to update or delete a goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route to list and create installment plans.
pub const INSTALLMENT_PLANS: &str = "/api/installment-plans";
/// The route to update or delete an installment plan.
pub const INSTALLMENT_PLAN: &str = "/api/installment-plans/{installment_plan_id}";

/// The route for the dashboard totals of a month.
pub const DASHBOARD: &str = "/api/dashboard";
/// The route for the income and expenses of each month of a year.
pub const MONTHLY_BALANCE: &str = "/api/monthly-balance";
/// The route for a month's totals by category.
pub const CATEGORY_SUMMARY: &str = "/api/summaries/categories";
/// The route for a month's totals by payment method.
pub const PAYMENT_METHOD_SUMMARY: &str = "/api/summaries/payment-methods";
/// The route for a month's expense totals by expense type.
pub const EXPENSE_TYPE_SUMMARY: &str = "/api/summaries/expense-types";
/// The route for a month's totals by recurrence type.
pub const RECURRENCE_TYPE_SUMMARY: &str = "/api/summaries/recurrence-types";

/// The route to create starter data for the caller.
pub const SEED_DATA: &str = "/api/seed-data";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
