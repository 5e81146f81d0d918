//! Purchases paid off in equal installments.

mod db;
mod endpoints;

pub use db::{
    InstallmentPlan, InstallmentPlanForm, InstallmentPlanId, create_installment_plan,
    create_installment_plan_table, delete_installment_plan, list_installment_plans,
    update_installment_plan,
};
pub use endpoints::{
    create_installment_plan_endpoint, delete_installment_plan_endpoint,
    list_installment_plans_endpoint, update_installment_plan_endpoint,
};
