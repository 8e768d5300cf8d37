//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::{CategoryId, CategoryLookup, lookup_category},
    database_id::TransactionId,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money that was earned, e.g., a salary payment.
    Income,
    /// Money that was spent, e.g., groceries.
    Expense,
}

impl TransactionKind {
    fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(FromSqlError::Other(
                format!("\"{other}\" is not a valid transaction kind").into(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user that recorded the transaction.
    pub user_id: UserID,
    /// The category the transaction belongs to, e.g. "Groceries".
    pub category_id: CategoryId,
    /// The amount of money spent or earned, always zero or greater.
    pub amount: f64,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(
        kind: TransactionKind,
        amount: f64,
        category_id: CategoryId,
        date: Date,
    ) -> NewTransaction {
        NewTransaction {
            kind,
            amount,
            category_id,
            date,
            description: None,
        }
    }
}

/// The fields needed to record a new transaction.
///
/// Use [create_transaction] to validate and store it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// The amount of money, must be finite and zero or greater.
    pub amount: f64,
    /// The category, must refer to a category of the same kind.
    pub category_id: CategoryId,
    /// When the transaction happened.
    pub date: Date,
    /// An optional note about the transaction.
    pub description: Option<String>,
}

impl NewTransaction {
    /// Set the description for the transaction.
    ///
    /// Blank descriptions are stored as no description.
    pub fn description(mut self, description: Option<&str>) -> Self {
        self.description = description
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .map(str::to_owned);
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Validate and store a new transaction for the user `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is negative or not finite,
/// - [Error::InvalidCategory] if the category ID is not in the catalog,
/// - [Error::CategoryKindMismatch] if the category tracks the other kind of transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !new_transaction.amount.is_finite() || new_transaction.amount < 0.0 {
        return Err(Error::InvalidAmount(new_transaction.amount));
    }

    let category = match lookup_category(new_transaction.category_id) {
        CategoryLookup::Known(category) => category,
        CategoryLookup::Unknown(id) => return Err(Error::InvalidCategory(id)),
    };

    if category.kind != new_transaction.kind {
        return Err(Error::CategoryKindMismatch {
            category: category.name,
            kind: new_transaction.kind,
        });
    }

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, category_id, amount, kind, date, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, category_id, amount, kind, date, description",
        )?
        .query_row(
            (
                user_id.as_i64(),
                new_transaction.category_id,
                new_transaction.amount,
                new_transaction.kind,
                new_transaction.date,
                new_transaction.description,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, category_id, amount, kind, date, description
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get every transaction recorded by `user_id`, newest first.
///
/// Transactions on the same date are ordered by most recently created.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_transactions(user_id: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_id, amount, kind, date, description
             FROM \"transaction\" WHERE user_id = :user_id
             ORDER BY date DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Delete the transaction `id` if it is owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if there is no transaction `id` owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        &[(":id", &id), (":user_id", &user_id.as_i64())],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                date TEXT NOT NULL,
                description TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Used by the dashboard and transactions page to list a user's transactions newest first.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let category_id = row.get(2)?;
    let amount = row.get(3)?;
    let kind = row.get(4)?;
    let date = row.get(5)?;
    let description = row.get(6)?;

    Ok(Transaction {
        id,
        user_id,
        category_id,
        amount,
        kind,
        date,
        description,
    })
}

// ============================================================================
// TESTS
// ============================================================================
