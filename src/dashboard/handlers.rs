//! Dashboard HTTP handlers and view rendering.
//!
//! Both handlers load the user's transactions and budgets, then run them
//! through the aggregation and presentation functions. The page renders HTML
//! cards, the API responds with the same figures as JSON.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{Budget, get_budgets},
    dashboard::{
        aggregation::{AggregateSummary, BudgetStatus, compute_budget_statuses, compute_summary},
        cards::{budgets_card, recent_transactions_card, summary_cards},
        presentation::{DisplayRecord, format_budget_status, recent_transactions},
    },
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    transaction::{Transaction, get_transactions},
};

/// How many transactions the dashboard lists.
const RECENT_TRANSACTION_COUNT: usize = 4;

/// The state needed for displaying the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Load the user's transactions, newest first, and budgets.
fn load_dashboard_data(
    state: &DashboardState,
    user_id: UserID,
) -> Result<(Vec<Transaction>, Vec<Budget>), Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
    let budgets = get_budgets(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get budgets: {error}"))?;

    Ok((transactions, budgets))
}

fn dashboard_view(
    summary: &AggregateSummary,
    recent: &[Transaction],
    statuses: &[BudgetStatus],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                h1 class="text-xl font-bold" { "Dashboard" }

                (summary_cards(summary))

                div class="grid grid-cols-1 gap-6 lg:grid-cols-2"
                {
                    (recent_transactions_card(recent))
                    (budgets_card(statuses))
                }
            }
        }
    };

    base("Dashboard", &content)
}

/// Display the totals, recent transactions and budget statuses for the user.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (transactions, budgets) = load_dashboard_data(&state, user_id)?;

    let summary = compute_summary(&transactions);
    let statuses = compute_budget_statuses(&budgets, &transactions);
    let recent = recent_transactions(&transactions, RECENT_TRANSACTION_COUNT);

    Ok(dashboard_view(&summary, recent, &statuses).into_response())
}

/// The dashboard figures as JSON.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Income, expense and balance totals.
    pub summary: AggregateSummary,
    /// The latest transactions, newest first.
    pub recent_transactions: Vec<Transaction>,
    /// One record per budget in creation order.
    pub budgets: Vec<DisplayRecord>,
}

/// Respond with the dashboard figures as JSON.
pub async fn get_dashboard_api(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let (transactions, budgets) = match load_dashboard_data(&state, user_id) {
        Ok(data) => data,
        Err(error) => return error.into_json_response(),
    };

    let budgets = compute_budget_statuses(&budgets, &transactions)
        .iter()
        .map(format_budget_status)
        .collect();

    Json(DashboardResponse {
        summary: compute_summary(&transactions),
        recent_transactions: recent_transactions(&transactions, RECENT_TRANSACTION_COUNT)
            .to_vec(),
        budgets,
    })
    .into_response()
}
