//! Passwords for new users and the bcrypt hashes stored in the user table.
//!
//! New passwords arrive twice, once typed and once as a confirmation, both on
//! the setup page and in the `create_user` tool. [PasswordHash::from_confirmed]
//! checks the pair and hashes it in one step.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that zxcvbn scored as hard to guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check the strength of `raw_password`.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with zxcvbn's suggestions when the score is
    /// below three.
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        let analysis = zxcvbn(raw_password, &[]);

        if matches!(analysis.score(), Score::Three | Score::Four) {
            return Ok(Self(raw_password.to_owned()));
        }

        let feedback = analysis.feedback().cloned().unwrap_or_default();

        Err(Error::TooWeak(feedback.to_string()))
    }

    /// Wrap `raw_password` without checking its strength, e.g. for test users.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("********")
    }
}

/// A salted bcrypt hash as stored in the `password` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt cost used for real users. Tests pass a lower cost.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with `cost` rounds of bcrypt.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Check a new password and its confirmation, then hash the password.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - [Error::TooWeak] if `password` is easy to guess,
    /// - [Error::PasswordMismatch] if `confirmation` differs from `password`,
    /// - [Error::HashingError] if bcrypt fails.
    pub fn from_confirmed(password: &str, confirmation: &str, cost: u32) -> Result<Self, Error> {
        let validated_password = ValidatedPassword::new(password)?;

        if password != confirmation {
            return Err(Error::PasswordMismatch);
        }

        Self::new(validated_password, cost)
    }

    /// Wrap a hash read from the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Whether `raw_password` is the password this hash was made from.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
