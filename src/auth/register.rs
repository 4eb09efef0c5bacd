//! The setup page for creating the account that owns the ledger.
//!
//! The page is only available while there are no users. Further accounts are
//! created with the `create_user` binary.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, PasswordHash,
    auth::{User, Username, count_users, create_user, set_auth_cookie},
    endpoints,
    capitalise_first_char,
    html::{BUTTON_PRIMARY_STYLE, base, link, log_in_register, password_input, username_input},
    internal_server_error::InternalServerError,
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

#[derive(Default)]
struct RegistrationErrors<'a> {
    username: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(username: &str, errors: RegistrationErrors) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::REGISTER)
            class="space-y-4 md:space-y-6"
        {
            (username_input(username, errors.username))
            (password_input("password", "Password", PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (password_input(
                "confirm_password",
                "Confirm Password",
                PASSWORD_INPUT_MIN_LENGTH,
                errors.confirm_password
            ))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN, "Log in here"))
            }
        }
    }
}

fn registration_page(username: &str, errors: RegistrationErrors) -> Markup {
    let form = registration_form(username, errors);
    let content = log_in_register("Create Account", &form);

    base("Register", &content)
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
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

fn is_registration_open(state: &RegistrationState) -> Result<bool, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    Ok(count_users(&connection)? == 0)
}

/// Display the registration page, or send the client to the log-in page if
/// a user already exists.
pub async fn get_register_page(State(state): State<RegistrationState>) -> Response {
    match is_registration_open(&state) {
        Ok(true) => registration_page("", RegistrationErrors::default()).into_response(),
        Ok(false) => Redirect::to(endpoints::LOG_IN).into_response(),
        Err(error) => error.into_response(),
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

fn register(user_data: &RegisterForm, state: &RegistrationState) -> Result<User, Error> {
    let username = Username::new(&user_data.username)?;
    let password_hash = PasswordHash::from_confirmed(
        &user_data.password,
        &user_data.confirm_password,
        PasswordHash::DEFAULT_COST,
    )?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    // Checked again under the lock so two racing requests cannot both register.
    if count_users(&connection)? > 0 {
        return Err(Error::RegistrationClosed);
    }

    create_user(username, password_hash, &connection)
}

/// Create the first user and log them in.
///
/// Validation problems are shown next to the offending field with a 422
/// status. Once a user exists this handler redirects to the log-in page.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let user = match register(&user_data, &state) {
        Ok(user) => user,
        Err(error) => {
            let message = capitalise_first_char(&error.to_string());
            let errors = match error {
                Error::EmptyUsername | Error::UsernameTaken(_) => RegistrationErrors {
                    username: Some(&message),
                    ..Default::default()
                },
                Error::TooWeak(_) => RegistrationErrors {
                    password: Some(&message),
                    ..Default::default()
                },
                Error::PasswordMismatch => RegistrationErrors {
                    confirm_password: Some(&message),
                    ..Default::default()
                },
                Error::RegistrationClosed => {
                    return Redirect::to(endpoints::LOG_IN).into_response();
                }
                error => {
                    tracing::error!("An unhandled error occurred while registering a user: {error}");
                    return InternalServerError::default().into_response();
                }
            };

            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                registration_page(&user_data.username, errors),
            )
                .into_response();
        }
    };

    tracing::info!("Registered user {}", user.username);

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (jar, Redirect::to(endpoints::DASHBOARD_VIEW)).into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            Redirect::to(endpoints::LOG_IN).into_response()
        }
    }
}
