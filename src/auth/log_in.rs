//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The cookie module handles the lower level session cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{get_user_by_email, invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    html::{LINK_STYLE, base, log_in_register, password_input, submit_button, text_input},
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Invalid credentials";

fn log_in_form(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("Email", "email", "email", email, None))
            (password_input("Password", "password", 0, true, error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            (submit_button("Log in"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a href=(endpoints::REGISTER_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Register here"
                }
            }
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page() -> Response {
    let log_in_form = log_in_form("", None);
    let content = log_in_register("Log in to your account", &log_in_form);
    base("Log In", &content).into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password hash in the database.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,

    /// Password entered during log-in.
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// Checkboxes are only sent when ticked, so `Some` means ticked whatever its value is.
    pub remember_me: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie set and the client is redirected to the dashboard page.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let internal_error = |email: &str| {
        log_in_form(
            email,
            Some("An internal error occurred. Please try again later."),
        )
        .into_response()
    };

    // An unparsable email cannot belong to anyone, so it gets the same message as a wrong password.
    let Ok(email) = user_data.email.trim().parse::<EmailAddress>() else {
        return log_in_form(&user_data.email, Some(INVALID_CREDENTIALS_ERROR_MSG)).into_response();
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return internal_error(&user_data.email);
            }
        };

        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                return log_in_form(&user_data.email, Some(INVALID_CREDENTIALS_ERROR_MSG))
                    .into_response();
            }
            Err(error) => {
                tracing::error!("Unhandled error while verifying credentials: {error}");
                return internal_error(&user_data.email);
            }
        }
    };

    match user.password_hash.verify(&user_data.password) {
        Ok(true) => {}
        Ok(false) => {
            return log_in_form(&user_data.email, Some(INVALID_CREDENTIALS_ERROR_MSG))
                .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return internal_error(&user_data.email);
        }
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    match set_auth_cookie(jar.clone(), user.id, cookie_duration) {
        Ok(updated_jar) => {
            tracing::info!("User {} logged in", user.id);
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                updated_jar,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::State,
        http::{StatusCode, header::SET_COOKIE},
        response::Response,
    };
    use axum_extra::extract::PrivateCookieJar;
    use email_address::EmailAddress;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        app_state::create_cookie_key,
        auth::{DEFAULT_COOKIE_DURATION, PasswordHash, Username, create_user},
        db::initialize,
        endpoints,
        test_utils::{
            assert_hx_redirect, assert_valid_html, must_get_form, parse_html_document,
            parse_html_fragment,
        },
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, LogInData, LoginState, get_log_in_page, post_log_in,
    };

    const TEST_EMAIL: &str = "ada@example.com";
    const TEST_PASSWORD: &str = "lighthouse-teacup-marmalade-47";

    fn get_test_state() -> LoginState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        create_user(
            Username::new_unchecked("Ada"),
            EmailAddress::new_unchecked(TEST_EMAIL),
            PasswordHash::from_raw_password(TEST_PASSWORD, &[], 4).unwrap(),
            &connection,
        )
        .unwrap();

        LoginState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    async fn log_in(email: &str, password: &str) -> Response {
        let state = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_log_in(
            State(state),
            jar,
            Form(LogInData {
                email: email.to_owned(),
                password: password.to_owned(),
                remember_me: None,
            }),
        )
        .await
    }

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let response = get_log_in_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::LOG_IN_API));

        for selector in [
            "input[type=email][name=email]",
            "input[type=password][name=password]",
            "input[type=checkbox][name=remember_me]",
            "button[type=submit]",
        ] {
            let count = form.select(&Selector::parse(selector).unwrap()).count();
            assert_eq!(count, 1, "want 1 element matching {selector}, got {count}");
        }
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let response = log_in(TEST_EMAIL, TEST_PASSWORD).await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        assert!(
            response.headers().get_all(SET_COOKIE).iter().count() >= 2,
            "want auth cookies to be set"
        );
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let response = log_in(TEST_EMAIL, "not-the-password").await;

        assert_invalid_credentials(response).await;
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let response = log_in("grace@example.com", TEST_PASSWORD).await;

        assert_invalid_credentials(response).await;
    }

    #[tokio::test]
    async fn log_in_fails_with_malformed_email() {
        let response = log_in("not an email", TEST_PASSWORD).await;

        assert_invalid_credentials(response).await;
    }

    async fn assert_invalid_credentials(response: Response) {
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());

        let fragment = parse_html_fragment(response).await;
        assert_valid_html(&fragment);
        let error = fragment
            .select(&Selector::parse("p.text-red-500").unwrap())
            .next()
            .expect("expected an error message");
        assert_eq!(
            error.text().collect::<String>(),
            INVALID_CREDENTIALS_ERROR_MSG
        );
    }
}
