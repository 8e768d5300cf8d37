//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_api, auth_guard_hx, get_log_in_page, get_log_out,
        get_register_page, post_log_in, register_user,
    },
    budget::{get_budgets_api, get_budgets_page, set_budget_endpoint},
    category::get_categories_api,
    dashboard::{get_dashboard_api, get_dashboard_page},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    profile::{get_profile_page, update_profile_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_create_transaction_page,
        get_transactions_api, get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_guard = || middleware::from_fn_with_state(state.clone(), auth_guard);
    let hx_guard = || middleware::from_fn_with_state(state.clone(), auth_guard_hx);
    let api_guard = || middleware::from_fn_with_state(state.clone(), auth_guard_api);

    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::CATEGORIES_API, get(get_categories_api))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let page_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_create_transaction_page),
        )
        .route(endpoints::BUDGETS_VIEW, get(get_budgets_page))
        .route(endpoints::PROFILE_VIEW, get(get_profile_page))
        .route_layer(page_guard());

    // The JSON API and the HTMX forms share paths, so the guards are applied
    // per method: JSON clients get a 401 while HTMX requests get a HX-Redirect.
    let api_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            get(get_transactions_api)
                .route_layer(api_guard())
                .merge(post(create_transaction_endpoint).route_layer(hx_guard())),
        )
        .route(
            endpoints::TRANSACTION,
            delete(delete_transaction_endpoint).route_layer(hx_guard()),
        )
        .route(
            endpoints::BUDGETS_API,
            get(get_budgets_api)
                .route_layer(api_guard())
                .merge(post(set_budget_endpoint).route_layer(hx_guard())),
        )
        .route(
            endpoints::DASHBOARD_API,
            get(get_dashboard_api).route_layer(api_guard()),
        )
        .route(
            endpoints::USER_PROFILE,
            put(update_profile_endpoint).route_layer(hx_guard()),
        );

    page_routes
        .merge(api_routes)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
