//! The page for viewing budget progress and setting budget limits.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::core::get_budgets,
    category::categories_of_kind,
    dashboard::{BudgetStatus, compute_budget_statuses, format_budget_status},
    endpoints,
    html::{
        CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
        progress_bar, submit_button,
    },
    navigation::NavBar,
    transaction::{TransactionKind, get_transactions},
};

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    /// The database connection for reading budgets and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn budget_card(status: &BudgetStatus) -> Markup {
    let record = format_budget_status(status);

    html! {
        div class=(CARD_STYLE) data-budget-card=(record.category_id)
        {
            div class="flex items-center gap-3 mb-3"
            {
                i class={ "fas " (record.category_icon) " text-xl text-gray-500 dark:text-gray-400" } {}
                h3 class="text-lg font-semibold" { (record.category_name) }
            }

            p class="text-2xl font-semibold tabular-nums" { (record.spent) }
            p class="text-sm text-gray-500 dark:text-gray-400 mb-3" { "of " (record.limit) }

            (progress_bar(record.utilization_percent, record.color.hex()))

            p class="mt-2 text-sm text-gray-500 dark:text-gray-400"
            {
                (format!("{:.0}", record.remaining_percent)) "% remaining"
            }
        }
    }
}

fn set_budget_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::BUDGETS_API)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class={ (CARD_STYLE) " space-y-4" }
        {
            h2 class="text-lg font-semibold" { "Set a budget" }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select name="category_id" id="category_id" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for category in categories_of_kind(TransactionKind::Expense) {
                        option value=(category.id) { (category.name) }
                    }
                }
            }

            div
            {
                label for="limit" class=(FORM_LABEL_STYLE) { "Limit" }

                input
                    name="limit"
                    id="limit"
                    type="number"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (submit_button("Save Budget"))
        }
    }
}

fn budgets_view(statuses: &[BudgetStatus]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                h1 class="text-xl font-bold" { "Budgets" }

                @if statuses.is_empty() {
                    p class="text-gray-500 dark:text-gray-400" { "No budgets set." }
                } @else {
                    div class="grid grid-cols-1 gap-4 md:grid-cols-2 lg:grid-cols-3"
                    {
                        @for status in statuses {
                            (budget_card(status))
                        }
                    }
                }

                div class="max-w-md" { (set_budget_form()) }
            }
        }
    };

    base("Budgets", &content)
}

/// Display a card for each of the user's budgets and a form for setting budgets.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (budgets, transactions) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_budgets(user_id, &connection)?,
            get_transactions(user_id, &connection)?,
        )
    };

    let statuses = compute_budget_statuses(&budgets, &transactions);

    Ok(budgets_view(&statuses).into_response())
}
