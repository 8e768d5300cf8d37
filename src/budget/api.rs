//! JSON access to the user's budgets.
use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::UserID,
    budget::{core::get_budgets, set_endpoint::SetBudgetState},
};

/// Respond with the user's budgets as a JSON array in creation order.
pub async fn get_budgets_api(
    State(state): State<SetBudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response();
        }
    };

    match get_budgets(user_id, &connection) {
        Ok(budgets) => Json(budgets).into_response(),
        Err(error) => error.into_json_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        auth::test_user,
        budget::{BudgetLimit, set_budget, set_endpoint::SetBudgetState},
        db::initialize,
    };

    use super::get_budgets_api;

    #[tokio::test]
    async fn returns_budgets_as_json() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = test_user(&connection, "ada@example.com");
        let budget =
            set_budget(user.id, 4, BudgetLimit::new(500.0).unwrap(), &connection).unwrap();
        let state = SetBudgetState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_budgets_api(State(state), Extension(user.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let got: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            got,
            json!([{
                "id": budget.id,
                "user_id": user.id.as_i64(),
                "category_id": 4,
                "limit": 500.0,
            }])
        );
    }
}
