//! Route handlers for goals.

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
    goal::{Goal, GoalForm, GoalId, create_goal, delete_goal, list_goals, update_goal},
};

/// The state needed to manage goals.
#[derive(Debug, Clone)]
pub struct GoalState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn list_goals_endpoint(
    State(state): State<GoalState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<Vec<Goal>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_goals(&owner, &connection).map(Json)
}

pub async fn create_goal_endpoint(
    State(state): State<GoalState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Json(form), _): WithRejection<Json<GoalForm>, Error>,
) -> Result<(StatusCode, Json<Goal>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let goal = create_goal(&owner, &form, &connection)?;

    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn update_goal_endpoint(
    State(state): State<GoalState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(goal_id), _): WithRejection<Path<GoalId>, Error>,
    WithRejection(Json(form), _): WithRejection<Json<GoalForm>, Error>,
) -> Result<Json<Goal>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    update_goal(&owner, goal_id, &form, &connection).map(Json)
}

pub async fn delete_goal_endpoint(
    State(state): State<GoalState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(goal_id), _): WithRejection<Path<GoalId>, Error>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_goal(&owner, goal_id, &connection)?;

    Ok(Json(json!({ "message": "Goal deleted successfully" })))
}
