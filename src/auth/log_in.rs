//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level authentication and cookie auth logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        User, count_users, get_user_by_username, invalidate_auth_cookie,
        redirect::normalize_redirect_url, set_auth_cookie,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, base, link, log_in_register, password_input,
        username_input,
    },
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";
const NO_USERS_ERROR_MSG: &str = "No account has been set up yet.";
const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

struct LogInFormView<'a> {
    username: &'a str,
    error_message: Option<&'a str>,
    redirect_url: Option<&'a str>,
    show_register_link: bool,
}

fn log_in_form(view: LogInFormView) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::LOG_IN)
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = view.redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (username_input(view.username, None))

            (password_input("password", "Password", 0, None))

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

            @if let Some(error_message) = view.error_message {
                p class=(FORM_ERROR_STYLE) id="log-in-error" { (error_message) }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Log in"
            }

            @if view.show_register_link {
                p class="text-sm font-light text-gray-500 dark:text-gray-400"
                {
                    "First time here? "
                    (link(endpoints::REGISTER, "Create the owner account"))
                }
            }
        }
    }
}

fn log_in_page(view: LogInFormView) -> Markup {
    let form = log_in_form(view);
    let content = log_in_register("Log in to your account", &form);

    base("Log In", &content)
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
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

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
///
/// A link to the registration page is shown while no user exists.
pub async fn get_log_in_page(
    State(state): State<LoginState>,
    Query(query): Query<RedirectQuery>,
) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let user_count = match state.db_connection.lock() {
        Ok(connection) => count_users(&connection),
        Err(_) => Err(Error::DatabaseLockError),
    };

    let show_register_link = match user_count {
        Ok(count) => count == 0,
        Err(error) => {
            tracing::error!("Could not count users: {error}");
            false
        }
    };

    log_in_page(LogInFormView {
        username: "",
        error_message: None,
        redirect_url: redirect_url.as_deref(),
        show_register_link,
    })
    .into_response()
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password in the database, which has been verified.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Username entered during log-in.
    pub username: String,

    /// Password entered during log-in.
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,
}

fn verify_credentials(user_data: &LogInData, connection: &Connection) -> Result<User, Error> {
    if count_users(connection)? == 0 {
        return Err(Error::RegistrationOpen);
    }

    let user = match get_user_by_username(&user_data.username, connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    let is_password_valid = user
        .password_hash
        .verify(&user_data.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    Ok(user)
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the client is
/// redirected to the dashboard page, or the page they were trying to reach.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();

    let result = match state.db_connection.lock() {
        Ok(connection) => verify_credentials(&user_data, &connection),
        Err(_) => Err(Error::DatabaseLockError),
    };

    let user = match result {
        Ok(user) => user,
        Err(error) => {
            let (status_code, error_message) = match error {
                Error::InvalidCredentials => {
                    tracing::info!("Failed log-in attempt for {:?}", user_data.username);
                    (StatusCode::OK, INVALID_CREDENTIALS_ERROR_MSG)
                }
                Error::RegistrationOpen => (StatusCode::OK, NO_USERS_ERROR_MSG),
                error => {
                    tracing::error!("Unhandled error while verifying credentials: {error}");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MSG)
                }
            };

            return (
                status_code,
                log_in_page(LogInFormView {
                    username: &user_data.username,
                    error_message: Some(error_message),
                    redirect_url,
                    show_register_link: error_message == NO_USERS_ERROR_MSG,
                }),
            )
                .into_response();
        }
    };

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW);

    match set_auth_cookie(jar.clone(), user.id, cookie_duration) {
        Ok(updated_jar) => {
            tracing::info!("User {} logged in", user.username);
            (updated_jar, Redirect::to(redirect_url)).into_response()
        }
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                invalidate_auth_cookie(jar),
                Redirect::to(endpoints::INTERNAL_ERROR_VIEW),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod log_in_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::{StatusCode, header::CONTENT_TYPE},
    };
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        PasswordHash, Username,
        app_state::create_cookie_key,
        auth::{DEFAULT_COOKIE_DURATION, create_user, create_user_table},
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    use super::{LoginState, RedirectQuery, get_log_in_page};

    fn get_state(with_user: bool) -> LoginState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        if with_user {
            create_user(
                Username::new_unchecked("maria"),
                PasswordHash::new_unchecked("hunter2"),
                &connection,
            )
            .expect("Could not create test user");
        }

        LoginState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let response = get_log_in_page(
            State(get_state(true)),
            Query(RedirectQuery { redirect_url: None }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_eq!(form.value().attr("method"), Some("post"));
        assert_eq!(form.value().attr("action"), Some(endpoints::LOG_IN));
        assert_form_input(&form, "username", "text");
        assert_form_input(&form, "password", "password");
        assert_form_submit_button(&form);

        let links = form
            .select(&Selector::parse("a[href]").unwrap())
            .collect::<Vec<_>>();
        assert!(links.is_empty(), "want no register link once a user exists");
    }

    #[tokio::test]
    async fn log_in_page_links_to_registration_when_there_are_no_users() {
        let response = get_log_in_page(
            State(get_state(false)),
            Query(RedirectQuery { redirect_url: None }),
        )
        .await;

        let document = parse_html_document(response).await;
        let form = must_get_form(&document);
        let link = form
            .select(&Selector::parse("a[href]").unwrap())
            .next()
            .expect("want a link to the registration page");

        assert_eq!(link.value().attr("href"), Some(endpoints::REGISTER));
    }

    #[tokio::test]
    async fn log_in_page_preserves_redirect_url() {
        let redirect_url = "/extrato?periodo=semana_atual".to_string();
        let response = get_log_in_page(
            State(get_state(true)),
            Query(RedirectQuery {
                redirect_url: Some(redirect_url.clone()),
            }),
        )
        .await;

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let input_selector = Selector::parse("input[name=redirect_url]").unwrap();
        let inputs = document.select(&input_selector).collect::<Vec<_>>();
        assert_eq!(
            inputs.len(),
            1,
            "want 1 redirect_url input, got {}",
            inputs.len()
        );
        assert_eq!(
            inputs[0].value().attr("value"),
            Some(redirect_url.as_str()),
            "expected redirect_url value to be preserved"
        );
    }

    #[tokio::test]
    async fn log_in_page_drops_external_redirect_url() {
        let response = get_log_in_page(
            State(get_state(true)),
            Query(RedirectQuery {
                redirect_url: Some("https://example.com".to_owned()),
            }),
        )
        .await;

        let document = parse_html_document(response).await;
        let input_selector = Selector::parse("input[name=redirect_url]").unwrap();

        assert_eq!(document.select(&input_selector).count(), 0);
    }
}
