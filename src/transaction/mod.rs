//! Transactions: money a user earned or spent.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` for creating transactions
//! - Database functions for storing, querying, and deleting transactions
//! - View handlers for transaction-related web pages and the JSON API

mod api;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod transactions_page;
mod view;

pub use api::get_transactions_api;
pub use core::{
    NewTransaction, Transaction, TransactionKind, create_transaction, create_transaction_table,
    get_transaction, get_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use transactions_page::get_transactions_page;
pub(crate) use view::{amount_class, category_label, format_signed_amount};
