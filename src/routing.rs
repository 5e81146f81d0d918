//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router, middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    account::{
        create_account_endpoint, deactivate_account_endpoint, list_accounts_endpoint,
        update_account_endpoint,
    },
    category::{
        create_category_endpoint, deactivate_category_endpoint, list_categories_endpoint,
        update_category_endpoint,
    },
    endpoints,
    expense_type::{
        create_expense_type_endpoint, deactivate_expense_type_endpoint,
        list_expense_types_endpoint,
    },
    goal::{
        create_goal_endpoint, delete_goal_endpoint, list_goals_endpoint, update_goal_endpoint,
    },
    installment::{
        create_installment_plan_endpoint, delete_installment_plan_endpoint,
        list_installment_plans_endpoint, update_installment_plan_endpoint,
    },
    owner::owner_guard,
    payment_method::{
        create_payment_method_endpoint, deactivate_payment_method_endpoint,
        list_payment_methods_endpoint,
    },
    recurrence_type::{
        create_recurrence_type_endpoint, deactivate_recurrence_type_endpoint,
        list_recurrence_types_endpoint,
    },
    report::{
        get_category_summary, get_dashboard, get_expense_type_summary, get_monthly_balance,
        get_payment_method_summary, get_recurrence_type_summary,
    },
    seed::seed_data_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new().route(endpoints::HEALTH, get(get_health));

    let protected_routes = Router::new()
        .route(
            endpoints::ACCOUNTS,
            get(list_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::ACCOUNT,
            put(update_account_endpoint).delete(deactivate_account_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            put(update_category_endpoint).delete(deactivate_category_endpoint),
        )
        .route(
            endpoints::PAYMENT_METHODS,
            get(list_payment_methods_endpoint).post(create_payment_method_endpoint),
        )
        .route(
            endpoints::PAYMENT_METHOD,
            delete(deactivate_payment_method_endpoint),
        )
        .route(
            endpoints::EXPENSE_TYPES,
            get(list_expense_types_endpoint).post(create_expense_type_endpoint),
        )
        .route(
            endpoints::EXPENSE_TYPE,
            delete(deactivate_expense_type_endpoint),
        )
        .route(
            endpoints::RECURRENCE_TYPES,
            get(list_recurrence_types_endpoint).post(create_recurrence_type_endpoint),
        )
        .route(
            endpoints::RECURRENCE_TYPE,
            delete(deactivate_recurrence_type_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::GOALS,
            get(list_goals_endpoint).post(create_goal_endpoint),
        )
        .route(
            endpoints::GOAL,
            put(update_goal_endpoint).delete(delete_goal_endpoint),
        )
        .route(
            endpoints::INSTALLMENT_PLANS,
            get(list_installment_plans_endpoint).post(create_installment_plan_endpoint),
        )
        .route(
            endpoints::INSTALLMENT_PLAN,
            put(update_installment_plan_endpoint).delete(delete_installment_plan_endpoint),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard))
        .route(endpoints::MONTHLY_BALANCE, get(get_monthly_balance))
        .route(endpoints::CATEGORY_SUMMARY, get(get_category_summary))
        .route(
            endpoints::PAYMENT_METHOD_SUMMARY,
            get(get_payment_method_summary),
        )
        .route(endpoints::EXPENSE_TYPE_SUMMARY, get(get_expense_type_summary))
        .route(
            endpoints::RECURRENCE_TYPE_SUMMARY,
            get(get_recurrence_type_summary),
        )
        .route(endpoints::SEED_DATA, post(seed_data_endpoint))
        .route_layer(middleware::from_fn(owner_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, endpoints, endpoints::format_endpoint};

    use super::build_router;

    const OWNER: &str = "owner-token";

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, "Etc/UTC").expect("Could not create app state");

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn health_does_not_need_owner() {
        let server = get_test_server();

        server.get(endpoints::HEALTH).await.assert_status_ok();
    }

    #[tokio::test]
    async fn api_routes_need_owner() {
        let server = get_test_server();

        server
            .get(endpoints::ACCOUNTS)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = get_test_server();

        let response = server.get("/api/nope").authorization_bearer(OWNER).await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let server = get_test_server();

        let response = server
            .post(endpoints::ACCOUNTS)
            .authorization_bearer(OWNER)
            .json(&json!({ "balance": 10 }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().starts_with("invalid request"));
    }

    #[tokio::test]
    async fn transaction_round_trip_through_router() {
        let server = get_test_server();

        server
            .post(endpoints::SEED_DATA)
            .authorization_bearer(OWNER)
            .await
            .assert_status(StatusCode::CREATED);

        let accounts: Value = server
            .get(endpoints::ACCOUNTS)
            .authorization_bearer(OWNER)
            .await
            .json();
        let categories: Value = server
            .get(endpoints::CATEGORIES)
            .add_query_param("kind", "expense")
            .authorization_bearer(OWNER)
            .await
            .json();
        let methods: Value = server
            .get(endpoints::PAYMENT_METHODS)
            .authorization_bearer(OWNER)
            .await
            .json();
        assert_eq!(categories.as_array().unwrap().len(), 12);

        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(OWNER)
            .json(&json!({
                "kind": "expense",
                "description": "Weekly shop",
                "amount": 120.5,
                "transaction_date": "2025-03-10",
                "account_id": accounts[0]["id"],
                "category_id": categories[0]["id"],
                "payment_method_id": methods[0]["id"],
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["reference_month"], 3);
        assert_eq!(created["amount"], 120.5);

        let id = created["id"].as_i64().unwrap();
        let dashboard: Value = server
            .get(endpoints::DASHBOARD)
            .add_query_param("month", 3)
            .add_query_param("year", 2025)
            .authorization_bearer(OWNER)
            .await
            .json();
        assert_eq!(dashboard["monthly_expense"], 120.5);
        assert_eq!(dashboard["transaction_count"], 1);

        server
            .delete(&format_endpoint(endpoints::TRANSACTION, id))
            .authorization_bearer(OWNER)
            .await
            .assert_status_ok();
        server
            .get(&format_endpoint(endpoints::TRANSACTION, id))
            .authorization_bearer(OWNER)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn rejected_amounts_leave_the_server_working() {
        let server = get_test_server();

        server
            .post(endpoints::SEED_DATA)
            .authorization_bearer(OWNER)
            .await
            .assert_status(StatusCode::CREATED);

        let accounts: Value = server
            .get(endpoints::ACCOUNTS)
            .authorization_bearer(OWNER)
            .await
            .json();
        let categories: Value = server
            .get(endpoints::CATEGORIES)
            .add_query_param("kind", "expense")
            .authorization_bearer(OWNER)
            .await
            .json();
        let methods: Value = server
            .get(endpoints::PAYMENT_METHODS)
            .authorization_bearer(OWNER)
            .await
            .json();

        for (amount, message) in [
            (json!(5e28), "amount must be at most"),
            (json!(0.001), "amount must have at most two decimal places"),
        ] {
            let response = server
                .post(endpoints::TRANSACTIONS)
                .authorization_bearer(OWNER)
                .json(&json!({
                    "kind": "expense",
                    "description": "Too much",
                    "amount": amount,
                    "transaction_date": "2025-03-10",
                    "account_id": accounts[0]["id"],
                    "category_id": categories[0]["id"],
                    "payment_method_id": methods[0]["id"],
                }))
                .await;

            response.assert_status_bad_request();
            let body: Value = response.json();
            assert!(body["error"].as_str().unwrap().starts_with(message));
        }

        let dashboard: Value = server
            .get(endpoints::DASHBOARD)
            .add_query_param("month", 3)
            .add_query_param("year", 2025)
            .authorization_bearer(OWNER)
            .await
            .json();
        assert_eq!(dashboard["transaction_count"], 0);
        server
            .get(endpoints::ACCOUNTS)
            .authorization_bearer(OWNER)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn other_owners_cannot_see_transactions() {
        let server = get_test_server();

        server
            .post(endpoints::SEED_DATA)
            .authorization_bearer(OWNER)
            .await
            .assert_status(StatusCode::CREATED);

        let accounts: Value = server
            .get(endpoints::ACCOUNTS)
            .authorization_bearer("someone-else")
            .await
            .json();

        assert_eq!(accounts, json!([]));
    }
}
