//! The profile page where users change their username, email and password.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{
        PasswordHash, User, UserID, Username, ValidatedPassword, get_user_by_id, update_password,
        update_profile,
    },
    endpoints,
    html::{CARD_STYLE, PAGE_CONTAINER_STYLE, base, password_input, submit_button, text_input},
    internal_server_error::get_internal_server_error_redirect,
    navigation::NavBar,
};

pub const DUPLICATE_EMAIL_ERROR_MSG: &str = "Email already in use";

/// Error messages to show next to each field of the profile form.
#[derive(Debug, Default)]
struct ProfileErrors<'a> {
    username: Option<&'a str>,
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn profile_form(username: &str, email: &str, errors: ProfileErrors) -> Markup {
    html! {
        form
            id="profile-form"
            hx-put=(endpoints::USER_PROFILE)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4"
        {
            (text_input("Username", "username", "text", username, errors.username))
            (text_input("Email", "email", "email", email, errors.email))

            div class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Leave the password fields blank to keep your current password."
            }

            (password_input("New Password", "password", 0, false, errors.password))
            (password_input(
                "Confirm New Password",
                "confirm_password",
                0,
                false,
                errors.confirm_password,
            ))

            (submit_button("Save Changes"))
        }
    }
}

fn reject(form: &ProfileForm, errors: ProfileErrors) -> Response {
    profile_form(&form.username, &form.email, errors).into_response()
}

/// The state needed for the profile page and endpoint.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The database connection for reading and updating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the profile form filled in with the user's current details.
pub async fn get_profile_page(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let user: User = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_by_id(user_id, &connection)?
    };

    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();
    let form = profile_form(
        user.username.as_ref(),
        user.email.as_str(),
        ProfileErrors::default(),
    );

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-6"
            {
                h1 class="text-xl font-bold" { "Profile" }

                div class=(CARD_STYLE) { (form) }
            }
        }
    };

    Ok(base("Profile", &content).into_response())
}

/// The data entered into the profile form.
///
/// Empty password fields are parsed as `None`.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    /// The new display name, must not be blank.
    pub username: String,
    /// The new email address, must not belong to another user.
    pub email: String,
    /// A new password, `None` keeps the current one.
    #[serde(default)]
    pub password: Option<String>,
    /// Must match `password`.
    #[serde(default)]
    pub confirm_password: Option<String>,
}

/// A route handler for updating the user's username and email, and their
/// password if a new one was entered.
///
/// Responds with the form, either with error messages next to the invalid
/// field or with a success alert.
pub async fn update_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let Ok(username) = Username::new(&form.username) else {
        return reject(&form, ProfileErrors {
            username: Some("Username is required"),
            ..Default::default()
        });
    };

    let Ok(email) = form.email.trim().parse::<EmailAddress>() else {
        return reject(&form, ProfileErrors {
            email: Some("Enter a valid email address"),
            ..Default::default()
        });
    };

    if form.password != form.confirm_password {
        return reject(&form, ProfileErrors {
            confirm_password: Some("Passwords do not match"),
            ..Default::default()
        });
    }

    let password_hash = match &form.password {
        None => None,
        Some(password) => {
            let validated =
                match ValidatedPassword::new(password, &[username.as_ref(), email.as_str()]) {
                    Ok(validated) => validated,
                    Err(error) => {
                        let message = error.to_string();
                        return reject(&form, ProfileErrors {
                            password: Some(&message),
                            ..Default::default()
                        });
                    }
                };

            match PasswordHash::new(validated, PasswordHash::DEFAULT_COST) {
                Ok(hash) => Some(hash),
                Err(error) => {
                    tracing::error!("an error occurred while hashing a password: {error}");
                    return get_internal_server_error_redirect();
                }
            }
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return get_internal_server_error_redirect();
        }
    };

    match update_profile(user_id, &username, &email, &connection) {
        Ok(()) => {}
        Err(Error::DuplicateEmail) => {
            return reject(&form, ProfileErrors {
                email: Some(DUPLICATE_EMAIL_ERROR_MSG),
                ..Default::default()
            });
        }
        Err(error) => {
            tracing::error!("could not update profile for user {user_id}: {error}");
            return get_internal_server_error_redirect();
        }
    }

    if let Some(password_hash) = password_hash {
        if let Err(error) = update_password(user_id, &password_hash, &connection) {
            tracing::error!("could not update password for user {user_id}: {error}");
            return get_internal_server_error_redirect();
        }
    }

    tracing::info!("User {user_id} updated their profile");

    html! {
        (profile_form(username.as_ref(), email.as_str(), ProfileErrors::default()))
        (Alert::SuccessSimple { message: "Profile updated".to_owned() }.into_html())
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::Response};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        auth::{UserID, get_user_by_id, test_user},
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_error_message, assert_form_input_with_value, assert_hx_endpoint,
            assert_status_ok, assert_valid_html, must_get_form, parse_html_document,
            parse_html_fragment,
        },
    };

    use super::{
        DUPLICATE_EMAIL_ERROR_MSG, ProfileForm, ProfileState, get_profile_page,
        update_profile_endpoint,
    };

    const STRONG_PASSWORD: &str = "lighthouse-teacup-marmalade-47";

    fn get_test_state() -> (ProfileState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = test_user(&connection, "ada@example.com");
        test_user(&connection, "grace@example.com");

        (
            ProfileState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    fn form(username: &str, email: &str) -> ProfileForm {
        ProfileForm {
            username: username.to_owned(),
            email: email.to_owned(),
            ..Default::default()
        }
    }

    async fn submit(state: &ProfileState, user_id: UserID, form: ProfileForm) -> Response {
        update_profile_endpoint(State(state.clone()), Extension(user_id), Form(form)).await
    }

    async fn assert_error(response: Response, want: &str) {
        assert_eq!(response.status(), StatusCode::OK);
        let fragment = parse_html_fragment(response).await;
        let form = must_get_form(&fragment);
        assert_form_error_message(&form, want);
    }

    #[tokio::test]
    async fn page_shows_current_details() {
        let (state, user_id) = get_test_state();

        let response = get_profile_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::USER_PROFILE, "hx-put");
        assert_form_input_with_value(&form, "username", "text", "Test User");
        assert_form_input_with_value(&form, "email", "email", "ada@example.com");
    }

    #[tokio::test]
    async fn updates_username_and_email() {
        let (state, user_id) = get_test_state();

        let response = submit(&state, user_id, form("Ada", "ada@lovelace.dev")).await;

        assert_status_ok(&response);
        let fragment = parse_html_fragment(response).await;
        let alert_count = fragment
            .select(&Selector::parse("#alert-container").unwrap())
            .count();
        assert_eq!(alert_count, 1, "want a success alert");

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_id(user_id, &connection).unwrap();
        assert_eq!(user.username.as_ref(), "Ada");
        assert_eq!(user.email.as_str(), "ada@lovelace.dev");
    }

    #[tokio::test]
    async fn updates_password() {
        let (state, user_id) = get_test_state();

        let response = submit(
            &state,
            user_id,
            ProfileForm {
                password: Some(STRONG_PASSWORD.to_owned()),
                confirm_password: Some(STRONG_PASSWORD.to_owned()),
                ..form("Ada", "ada@example.com")
            },
        )
        .await;

        assert_status_ok(&response);
        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_id(user_id, &connection).unwrap();
        assert!(user.password_hash.verify(STRONG_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn rejects_email_of_other_user() {
        let (state, user_id) = get_test_state();

        let response = submit(&state, user_id, form("Ada", "grace@example.com")).await;

        assert_error(response, DUPLICATE_EMAIL_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn rejects_blank_username() {
        let (state, user_id) = get_test_state();

        let response = submit(&state, user_id, form(" ", "ada@example.com")).await;

        assert_error(response, "Username is required").await;
    }

    #[tokio::test]
    async fn rejects_invalid_email() {
        let (state, user_id) = get_test_state();

        let response = submit(&state, user_id, form("Ada", "not-an-email")).await;

        assert_error(response, "Enter a valid email address").await;
    }

    #[tokio::test]
    async fn rejects_mismatched_passwords() {
        let (state, user_id) = get_test_state();

        let response = submit(
            &state,
            user_id,
            ProfileForm {
                password: Some(STRONG_PASSWORD.to_owned()),
                confirm_password: Some("something-else-entirely".to_owned()),
                ..form("Ada", "ada@example.com")
            },
        )
        .await;

        assert_error(response, "Passwords do not match").await;
    }
}
