//! Budgets: per-category spending limits.

mod api;
mod budgets_page;
mod core;
mod set_endpoint;

pub use api::get_budgets_api;
pub use budgets_page::get_budgets_page;
pub use core::{Budget, BudgetLimit, create_budget_table, get_budgets, set_budget};
pub use set_endpoint::set_budget_endpoint;
