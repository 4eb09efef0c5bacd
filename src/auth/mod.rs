//! User accounts and cookie based authentication.
//!
//! Passwords are hashed with bcrypt, the session lives in an encrypted
//! private cookie and [auth_guard] protects the ledger routes.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{LoginState, get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthContext, AuthState, auth_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use register::{RegistrationState, get_register_page, register_user};
pub(crate) use token::Token;
pub use user::{
    User, UserID, Username, count_users, create_user, create_user_table, get_user_by_id,
    get_user_by_username,
};

#[cfg(test)]
pub use cookie::COOKIE_TOKEN;
