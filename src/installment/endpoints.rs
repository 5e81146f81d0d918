//! Route handlers for installment plans.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error, OwnerId,
    db::lock_connection,
    installment::{
        InstallmentPlan, InstallmentPlanForm, InstallmentPlanId, create_installment_plan,
        delete_installment_plan, list_installment_plans, update_installment_plan,
    },
};

/// The state needed to manage installment plans.
#[derive(Debug, Clone)]
pub struct InstallmentPlanState {
    /// The database connection for managing installment plans.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for InstallmentPlanState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn list_installment_plans_endpoint(
    State(state): State<InstallmentPlanState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<Vec<InstallmentPlan>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_installment_plans(&owner, &connection).map(Json)
}

pub async fn create_installment_plan_endpoint(
    State(state): State<InstallmentPlanState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Json(form), _): WithRejection<Json<InstallmentPlanForm>, Error>,
) -> Result<(StatusCode, Json<InstallmentPlan>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let plan = create_installment_plan(&owner, &form, &connection)?;

    Ok((StatusCode::CREATED, Json(plan)))
}

/// A route handler for overwriting an installment plan, e.g. to record another paid installment.
pub async fn update_installment_plan_endpoint(
    State(state): State<InstallmentPlanState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(plan_id), _): WithRejection<Path<InstallmentPlanId>, Error>,
    WithRejection(Json(form), _): WithRejection<Json<InstallmentPlanForm>, Error>,
) -> Result<Json<InstallmentPlan>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    update_installment_plan(&owner, plan_id, &form, &connection).map(Json)
}

pub async fn delete_installment_plan_endpoint(
    State(state): State<InstallmentPlanState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(plan_id), _): WithRejection<Path<InstallmentPlanId>, Error>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_installment_plan(&owner, plan_id, &connection)?;

    Ok(Json(json!({ "message": "Installment plan deleted successfully" })))
}
