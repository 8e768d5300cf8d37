//! JSON access to the user's transactions.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, auth::UserID, transaction::core::get_transactions};

/// The state needed to read transactions.
#[derive(Debug, Clone)]
pub struct TransactionsApiState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Respond with the user's transactions as a JSON array, newest first.
pub async fn get_transactions_api(
    State(state): State<TransactionsApiState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response();
        }
    };

    match get_transactions(user_id, &connection) {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => error.into_json_response(),
    }
}
