//! Route handlers for categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error, OwnerId, TransactionKind,
    category::{
        Category, CategoryForm, CategoryId, CategoryUpdateForm, create_category,
        deactivate_category, list_categories, update_category,
    },
    db::lock_connection,
};

/// The state needed to manage categories.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The optional filter for listing categories.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    /// Only list categories of this kind.
    pub kind: Option<TransactionKind>,
}

/// A route handler for listing categories, optionally filtered with `?kind=income|expense`.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Query(query), _): WithRejection<Query<CategoryQuery>, Error>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_categories(&owner, query.kind, &connection).map(Json)
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Json(form), _): WithRejection<Json<CategoryForm>, Error>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let category = create_category(&owner, &form, &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// A route handler for renaming or restyling a category.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(category_id), _): WithRejection<Path<CategoryId>, Error>,
    WithRejection(Json(form), _): WithRejection<Json<CategoryUpdateForm>, Error>,
) -> Result<Json<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    update_category(&owner, category_id, &form, &connection).map(Json)
}

/// A route handler for deactivating a category.
pub async fn deactivate_category_endpoint(
    State(state): State<CategoryState>,
    Extension(owner): Extension<OwnerId>,
    WithRejection(Path(category_id), _): WithRejection<Path<CategoryId>, Error>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    deactivate_category(&owner, category_id, &connection)?;

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Query, State},
    };
    use axum_extra::extract::WithRejection;

    use crate::{
        TransactionKind,
        category::{CategoryForm, create_category_endpoint, list_categories_endpoint},
        test_utils::{get_test_connection, test_owner},
    };

    use super::{CategoryQuery, CategoryState};

    #[tokio::test]
    async fn list_filters_by_kind_query() {
        let state = CategoryState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };
        for (name, kind) in [
            ("Salary", TransactionKind::Income),
            ("Rent", TransactionKind::Expense),
        ] {
            create_category_endpoint(
                State(state.clone()),
                Extension(test_owner()),
                WithRejection(
                    Json(CategoryForm {
                        name: name.to_owned(),
                        kind,
                        color: None,
                        icon: None,
                    }),
                    Default::default(),
                ),
            )
            .await
            .unwrap();
        }

        let Json(categories) = list_categories_endpoint(
            State(state),
            Extension(test_owner()),
            WithRejection(
                Query(CategoryQuery {
                    kind: Some(TransactionKind::Expense),
                }),
                Default::default(),
            ),
        )
        .await
        .unwrap();

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Rent");
    }
}
