//! Defines the budget model and its database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::UserID,
    category::{CategoryId, CategoryLookup, lookup_category},
    database_id::BudgetId,
    transaction::TransactionKind,
};

/// The most a user intends to spend in a category. Always finite and greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BudgetLimit(f64);

impl BudgetLimit {
    /// Create a budget limit.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidBudgetLimit] if `limit` is zero, negative or not finite.
    pub fn new(limit: f64) -> Result<Self, Error> {
        if limit.is_finite() && limit > 0.0 {
            Ok(Self(limit))
        } else {
            Err(Error::InvalidBudgetLimit(limit))
        }
    }

    /// Create a budget limit without checking that it is positive.
    ///
    /// Only use this for values that have already been validated, e.g. values
    /// read back from the database.
    pub fn new_unchecked(limit: f64) -> Self {
        Self(limit)
    }

    /// The limit in dollars.
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

/// A spending limit a user has set for one expense category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The ID of the user that owns the budget.
    pub user_id: UserID,
    /// The expense category the limit applies to.
    pub category_id: CategoryId,
    /// The spending limit.
    pub limit: BudgetLimit,
}

/// Set the limit for `category_id`, replacing the user's existing budget for
/// that category if there is one.
///
/// An updated budget keeps its ID, and therefore its position in [get_budgets].
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID is not in the catalog,
/// - [Error::IncomeCategoryBudget] if the category tracks income,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn set_budget(
    user_id: UserID,
    category_id: CategoryId,
    limit: BudgetLimit,
    connection: &Connection,
) -> Result<Budget, Error> {
    match lookup_category(category_id) {
        CategoryLookup::Unknown(id) => return Err(Error::InvalidCategory(id)),
        CategoryLookup::Known(category) if category.kind == TransactionKind::Income => {
            return Err(Error::IncomeCategoryBudget(category_id));
        }
        CategoryLookup::Known(_) => {}
    }

    let budget = connection
        .prepare(
            "INSERT INTO budget (user_id, category_id, limit_amount) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, category_id) DO UPDATE SET limit_amount = excluded.limit_amount
             RETURNING id, user_id, category_id, limit_amount",
        )?
        .query_row(
            (user_id.as_i64(), category_id, limit.as_f64()),
            map_budget_row,
        )?;

    Ok(budget)
}

/// Get the user's budgets in the order they were first created.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_id, limit_amount FROM budget
             WHERE user_id = :user_id ORDER BY id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_budget_row)?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                limit_amount REAL NOT NULL CHECK (limit_amount > 0),
                UNIQUE(user_id, category_id),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category_id: row.get(2)?,
        limit: BudgetLimit::new_unchecked(row.get(3)?),
    })
}

#[cfg(test)]
mod budget_limit_tests {
    use crate::Error;

    use super::BudgetLimit;

    #[test]
    fn accepts_positive_limit() {
        assert_eq!(BudgetLimit::new(500.0).map(|limit| limit.as_f64()), Ok(500.0));
    }

    #[test]
    fn rejects_zero_negative_and_non_finite_limits() {
        for limit in [0.0, -10.0, f64::INFINITY] {
            assert_eq!(BudgetLimit::new(limit), Err(Error::InvalidBudgetLimit(limit)));
        }

        assert!(matches!(
            BudgetLimit::new(f64::NAN),
            Err(Error::InvalidBudgetLimit(_))
        ));
    }
}
