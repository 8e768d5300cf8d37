//! Defines the endpoint for creating or updating a budget.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::core::{BudgetLimit, set_budget},
    category::CategoryId,
    endpoints,
};

/// The state needed to set a budget.
#[derive(Debug, Clone)]
pub struct SetBudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SetBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for setting a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    /// The expense category to limit.
    pub category_id: CategoryId,
    /// The spending limit in dollars.
    pub limit: f64,
}

/// A route handler for setting the user's budget for a category, redirects
/// to the budgets page on success.
pub async fn set_budget_endpoint(
    State(state): State<SetBudgetState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let limit = match BudgetLimit::new(form.limit) {
        Ok(limit) => limit,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_budget(user_id, form.category_id, limit, &connection) {
        Ok(budget) => {
            tracing::info!(
                "User {user_id} set budget {} for category {} to {}",
                budget.id,
                budget.category_id,
                budget.limit.as_f64()
            );
            (
                HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not set budget: {error}");
            error.into_alert_response()
        }
    }
}
