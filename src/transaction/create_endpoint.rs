//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    category::CategoryId,
    endpoints,
    timezone::local_today,
    transaction::{Transaction, TransactionKind, core::create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// The category the transaction belongs to.
    pub category_id: CategoryId,
    /// The date when the transaction ocurred.
    pub date: Date,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
}

/// A route handler for creating a new transaction, redirects to transactions view on success.
///
/// Dates after today in the server's timezone are rejected.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Some(today) = local_today(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    if form.date > today {
        tracing::warn!("User {user_id} tried to create a transaction dated {}", form.date);
        return Error::FutureDate(form.date).into_alert_response();
    }

    let transaction = Transaction::build(form.kind, form.amount, form.category_id, form.date)
        .description(form.description.as_deref());

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_transaction(transaction, user_id, &connection) {
        Ok(transaction) => {
            tracing::info!("User {user_id} created transaction {}", transaction.id);
            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::Response};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::{UserID, test_user},
        db::initialize,
        endpoints,
        test_utils::assert_hx_redirect,
        transaction::{TransactionKind, get_transactions},
    };

    use super::{CreateTransactionState, TransactionForm, create_transaction_endpoint};

    fn get_test_state() -> (CreateTransactionState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = test_user(&conn, "ada@example.com");

        let state = CreateTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (state, user.id)
    }

    fn groceries_form(amount: f64) -> TransactionForm {
        TransactionForm {
            kind: TransactionKind::Expense,
            amount,
            category_id: 4,
            date: OffsetDateTime::now_utc().date(),
            description: Some("Weekly shop".to_owned()),
        }
    }

    async fn submit(
        state: &CreateTransactionState,
        user_id: UserID,
        form: TransactionForm,
    ) -> Response {
        create_transaction_endpoint(State(state.clone()), Extension(user_id), Form(form)).await
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (state, user_id) = get_test_state();

        let response = submit(&state, user_id, groceries_form(12.3)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let transactions = get_transactions(user_id, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, 12.3);
        assert_eq!(transactions[0].description.as_deref(), Some("Weekly shop"));
    }

    #[tokio::test]
    async fn rejects_future_date() {
        let (state, user_id) = get_test_state();
        let form = TransactionForm {
            date: OffsetDateTime::now_utc().date() + Duration::days(2),
            ..groceries_form(12.3)
        };

        let response = submit(&state, user_id, form).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_transactions(user_id, &connection), Ok(vec![]));
    }

    #[tokio::test]
    async fn rejects_negative_amount() {
        let (state, user_id) = get_test_state();

        let response = submit(&state, user_id, groceries_form(-5.0)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_category_of_other_kind() {
        let (state, user_id) = get_test_state();
        let form = TransactionForm {
            kind: TransactionKind::Income,
            ..groceries_form(12.3)
        };

        let response = submit(&state, user_id, form).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_unknown_category() {
        let (state, user_id) = get_test_state();
        let form = TransactionForm {
            category_id: 42,
            ..groceries_form(12.3)
        };

        let response = submit(&state, user_id, form).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
