//! Creates the application's SQLite schema.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, auth::create_user_table, budget::create_budget_table,
    transaction::create_transaction_table,
};

/// Create the tables for users, transactions and budgets if they do not exist.
///
/// Foreign keys are switched on for `connection` so that deleting a user
/// also deletes their transactions and budgets.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
/// No tables are created if an error is returned.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
