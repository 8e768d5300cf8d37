//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use time::Date;

use crate::{
    alert::Alert, category::CategoryId, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response, transaction::TransactionKind,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address is already registered to another user.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// An empty string was used as a username.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// The category ID does not refer to a category in the catalog.
    #[error("{0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// The kind of a transaction does not match the kind of its category,
    /// e.g., an income transaction in the groceries category.
    #[error("{kind} transactions cannot use the {category} category")]
    CategoryKindMismatch {
        /// The name of the category the transaction referred to.
        category: &'static str,
        /// The kind the client supplied for the transaction.
        kind: TransactionKind,
    },

    /// A budget was set for a category that tracks income.
    #[error("budgets can only be set for expense categories")]
    IncomeCategoryBudget(CategoryId),

    /// A transaction amount was negative or not a finite number.
    #[error("{0} is not a valid transaction amount, amounts must be zero or greater")]
    InvalidAmount(f64),

    /// A budget limit was zero, negative or not a finite number.
    #[error("{0} is not a valid budget limit, limits must be greater than zero")]
    InvalidBudgetLimit(f64),

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist or belongs to another user.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a user that does not exist.
    #[error("tried to update a user that is not in the database")]
    UpdateMissingUser,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into a JSON response of the form `{"error": "..."}`.
    ///
    /// Validation errors keep their message, anything else is reported as an
    /// internal server error so that internal details are not leaked.
    pub fn into_json_response(self) -> Response {
        let status_code = match self {
            Error::NotFound | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            Error::InvalidAmount(_)
            | Error::InvalidBudgetLimit(_)
            | Error::InvalidCategory(_)
            | Error::CategoryKindMismatch { .. }
            | Error::IncomeCategoryBudget(_)
            | Error::FutureDate(_) => StatusCode::BAD_REQUEST,
            ref error => {
                tracing::error!("An unexpected error occurred: {error}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response();
            }
        };

        (status_code, Json(json!({ "error": self.to_string() }))).into_response()
    }

    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::FutureDate(date) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid transaction date".to_owned(),
                    details: format!(
                        "{date} is a date in the future, which is not allowed. \
                        Change the date to today or earlier."
                    ),
                },
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!("{amount} is not a valid amount. Enter zero or more."),
                },
            ),
            Error::InvalidBudgetLimit(limit) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid budget limit".to_owned(),
                    details: format!("{limit} is not a valid limit. Enter an amount above zero."),
                },
            ),
            Error::InvalidCategory(category_id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid category".to_owned(),
                    details: format!("Could not find a category with the ID {category_id}"),
                },
            ),
            Error::CategoryKindMismatch { category, kind } => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Category does not match transaction type".to_owned(),
                    details: format!(
                        "{category} cannot be used for {kind} transactions. \
                        Pick a category that matches the transaction type."
                    ),
                },
            ),
            Error::IncomeCategoryBudget(_) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid budget category".to_owned(),
                    details: "Budgets can only be set for expense categories.".to_owned(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete transaction".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            Error::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Email already in use".to_owned(),
                    details: "Another account is registered with this email address.".to_owned(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
