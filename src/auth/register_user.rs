//! The registration page for creating a new account.
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
    auth::{PasswordHash, Username, ValidatedPassword, create_user, set_auth_cookie},
    endpoints,
    html::{LINK_STYLE, base, log_in_register, password_input, submit_button, text_input},
    internal_server_error::get_internal_server_error_redirect,
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

pub const DUPLICATE_EMAIL_ERROR_MSG: &str = "Email already exists";

/// Error messages to show next to each field of the registration form.
#[derive(Debug, Default)]
struct RegistrationErrors<'a> {
    username: Option<&'a str>,
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(form: &RegisterForm, errors: RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("Username", "username", "text", &form.username, errors.username))
            (text_input("Email", "email", "email", &form.email, errors.email))
            (password_input("Password", "password", PASSWORD_INPUT_MIN_LENGTH, true, errors.password))
            (password_input(
                "Confirm Password",
                "confirm_password",
                PASSWORD_INPUT_MIN_LENGTH,
                true,
                errors.confirm_password,
            ))

            (submit_button("Create Account"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Log in here"
                }
            }
        }
    }
}

fn reject(form: &RegisterForm, errors: RegistrationErrors) -> Response {
    registration_form(form, errors).into_response()
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form(&RegisterForm::default(), RegistrationErrors::default());
    let content = log_in_register("Create an account", &registration_form);
    base("Register", &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data entered into the registration form.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create a new user, log them in and redirect to the dashboard.
///
/// Invalid input is rejected by returning the form with error messages.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let username = match Username::new(&user_data.username) {
        Ok(username) => username,
        Err(_) => {
            return reject(&user_data, RegistrationErrors {
                username: Some("Username is required"),
                ..Default::default()
            });
        }
    };

    let email = match user_data.email.trim().parse::<EmailAddress>() {
        Ok(email) => email,
        Err(_) => {
            return reject(&user_data, RegistrationErrors {
                email: Some("Enter a valid email address"),
                ..Default::default()
            });
        }
    };

    let validated_password = match ValidatedPassword::new(
        &user_data.password,
        &[username.as_ref(), email.as_str()],
    ) {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();
            return reject(&user_data, RegistrationErrors {
                password: Some(&message),
                ..Default::default()
            });
        }
    };

    if user_data.password != user_data.confirm_password {
        return reject(&user_data, RegistrationErrors {
            confirm_password: Some("Passwords do not match"),
            ..Default::default()
        });
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return get_internal_server_error_redirect();
            }
        };

        match create_user(username, email, password_hash, &connection) {
            Ok(user) => user,
            Err(Error::DuplicateEmail) => {
                return reject(&user_data, RegistrationErrors {
                    email: Some(DUPLICATE_EMAIL_ERROR_MSG),
                    ..Default::default()
                });
            }
            Err(error) => {
                tracing::error!("An unhandled error occurred while inserting a new user: {error}");
                return get_internal_server_error_redirect();
            }
        }
    };

    tracing::info!("Registered user {}", user.id);

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            get_internal_server_error_redirect()
        }
    }
}

#[cfg(test)]
mod register_tests {
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
        auth::{DEFAULT_COOKIE_DURATION, get_user_by_email, test_user},
        db::initialize,
        endpoints,
        test_utils::{
            assert_hx_redirect, assert_valid_html, must_get_form, parse_html_document,
            parse_html_fragment,
        },
    };

    use super::{
        DUPLICATE_EMAIL_ERROR_MSG, RegisterForm, RegistrationState, get_register_page,
        register_user,
    };

    const STRONG_PASSWORD: &str = "lighthouse-teacup-marmalade-47";

    fn get_test_state() -> RegistrationState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        RegistrationState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn form(username: &str, email: &str, password: &str, confirm_password: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
        }
    }

    async fn submit(state: &RegistrationState, form: RegisterForm) -> Response {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        register_user(State(state.clone()), jar, Form(form)).await
    }

    async fn assert_form_error(response: Response, want: &str) {
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());

        let fragment = parse_html_fragment(response).await;
        assert_valid_html(&fragment);
        let errors: Vec<String> = fragment
            .select(&Selector::parse("p.text-red-500").unwrap())
            .map(|error| error.text().collect())
            .collect();
        assert_eq!(errors, vec![want.to_owned()]);
    }

    #[tokio::test]
    async fn register_page_displays_form() {
        let response = get_register_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::USERS));

        for selector in [
            "input[type=text][name=username]",
            "input[type=email][name=email]",
            "input[type=password][name=password]",
            "input[type=password][name=confirm_password]",
            "button[type=submit]",
        ] {
            let count = form.select(&Selector::parse(selector).unwrap()).count();
            assert_eq!(count, 1, "want 1 element matching {selector}, got {count}");
        }
    }

    #[tokio::test]
    async fn register_creates_user_and_logs_in() {
        let state = get_test_state();

        let response = submit(
            &state,
            form("Ada", "ada@example.com", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        assert!(response.headers().get(SET_COOKIE).is_some());
        let connection = state.db_connection.lock().unwrap();
        let user =
            get_user_by_email(&EmailAddress::new_unchecked("ada@example.com"), &connection)
                .unwrap();
        assert_eq!(user.username.as_ref(), "Ada");
        assert!(user.password_hash.verify(STRONG_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let state = get_test_state();
        test_user(&state.db_connection.lock().unwrap(), "ada@example.com");

        let response = submit(
            &state,
            form("Ada", "ada@example.com", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        assert_form_error(response, DUPLICATE_EMAIL_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn register_rejects_blank_username() {
        let state = get_test_state();

        let response = submit(
            &state,
            form("  ", "ada@example.com", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        assert_form_error(response, "Username is required").await;
    }

    #[tokio::test]
    async fn register_rejects_invalid_email() {
        let state = get_test_state();

        let response = submit(
            &state,
            form("Ada", "ada.example.com", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        assert_form_error(response, "Enter a valid email address").await;
    }

    #[tokio::test]
    async fn register_rejects_mismatched_passwords() {
        let state = get_test_state();

        let response = submit(
            &state,
            form("Ada", "ada@example.com", STRONG_PASSWORD, "something-else-entirely"),
        )
        .await;

        assert_form_error(response, "Passwords do not match").await;
    }

    #[tokio::test]
    async fn register_rejects_weak_password() {
        let state = get_test_state();

        let response = submit(&state, form("Ada", "ada@example.com", "password", "password")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let fragment = parse_html_fragment(response).await;
        let error_count = fragment
            .select(&Selector::parse("input#password + p.text-red-500").unwrap())
            .count();
        assert_eq!(error_count, 1, "want an error below the password input");
    }
}
