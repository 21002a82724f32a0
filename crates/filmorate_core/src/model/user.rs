//! User domain model.
//!
//! # Invariants
//! - `login` is non-blank and whitespace-free; `email` has an address shape.
//! - `birthday` is not later than the validation date.
//! - Equality ignores `id`.

use crate::model::{ValidationError, UNASSIGNED_ID};
use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub type UserId = i64;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$",
    )
    .expect("valid email regex")
});

/// Canonical user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Storage-assigned id; `UNASSIGNED_ID` before the first `add`.
    #[serde(default)]
    pub id: UserId,
    pub email: String,
    pub login: String,
    /// Display name. Blank at creation means "use the login".
    #[serde(default)]
    pub name: String,
    pub birthday: NaiveDate,
}

impl User {
    /// Creates an unsaved user.
    pub fn new(
        email: impl Into<String>,
        login: impl Into<String>,
        name: impl Into<String>,
        birthday: NaiveDate,
    ) -> Self {
        Self {
            id: UNASSIGNED_ID,
            email: email.into(),
            login: login.into(),
            name: name.into(),
            birthday,
        }
    }

    /// Returns a copy whose blank display name is replaced by the login.
    pub fn with_default_name(mut self) -> Self {
        if self.name.trim().is_empty() {
            self.name = self.login.clone();
        }
        self
    }

    /// Checks field rules against today's UTC date.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_at(Utc::now().date_naive())
    }

    /// Checks field rules against an explicit "today".
    pub fn validate_at(&self, today: NaiveDate) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::BlankEmail);
        }
        // The stored value is the raw one, so surrounding whitespace is invalid.
        if !EMAIL_RE.is_match(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }

        if self.login.is_empty() {
            return Err(ValidationError::BlankLogin);
        }
        if self.login.chars().any(char::is_whitespace) {
            return Err(ValidationError::LoginContainsWhitespace(self.login.clone()));
        }

        if self.birthday > today {
            return Err(ValidationError::BirthdayInFuture(self.birthday));
        }

        Ok(())
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.email == other.email
            && self.login == other.login
            && self.name == other.name
            && self.birthday == other.birthday
    }
}

impl Eq for User {}

#[cfg(test)]
mod tests {
    use super::User;
    use crate::model::ValidationError;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_user() -> User {
        User::new("neo@matrix.io", "neo", "", date(1990, 5, 1))
    }

    #[test]
    fn default_name_falls_back_to_login() {
        let user = sample_user().with_default_name();
        assert_eq!(user.name, "neo");

        let mut named = sample_user();
        named.name = "Thomas".to_string();
        assert_eq!(named.with_default_name().name, "Thomas");
    }

    #[test]
    fn validate_rejects_login_with_whitespace() {
        let mut user = sample_user();
        user.login = "neo anderson".to_string();
        assert!(matches!(
            user.validate_at(date(2024, 1, 1)),
            Err(ValidationError::LoginContainsWhitespace(_))
        ));

        user.login = "   ".to_string();
        assert!(matches!(
            user.validate_at(date(2024, 1, 1)),
            Err(ValidationError::LoginContainsWhitespace(_))
        ));
    }

    #[test]
    fn validate_rejects_malformed_email() {
        for email in ["neo", "neo@", "@matrix.io", "neo @matrix.io"] {
            let mut user = sample_user();
            user.email = email.to_string();
            assert!(
                matches!(
                    user.validate_at(date(2024, 1, 1)),
                    Err(ValidationError::InvalidEmail(_))
                ),
                "email `{email}` should be rejected"
            );
        }
    }

    #[test]
    fn validate_rejects_email_with_surrounding_whitespace() {
        for email in [" neo@matrix.io", "neo@matrix.io ", "\tneo@matrix.io"] {
            let mut user = sample_user();
            user.email = email.to_string();
            assert_eq!(
                user.validate_at(date(2024, 1, 1)),
                Err(ValidationError::InvalidEmail(email.to_string()))
            );
        }

        let mut blank = sample_user();
        blank.email = "   ".to_string();
        assert_eq!(
            blank.validate_at(date(2024, 1, 1)),
            Err(ValidationError::BlankEmail)
        );
    }

    #[test]
    fn validate_allows_birthday_today_but_not_tomorrow() {
        let mut user = sample_user();
        user.birthday = date(2024, 1, 1);
        assert!(user.validate_at(date(2024, 1, 1)).is_ok());
        assert_eq!(
            user.validate_at(date(2023, 12, 31)),
            Err(ValidationError::BirthdayInFuture(date(2024, 1, 1)))
        );
    }

    #[test]
    fn equality_ignores_id() {
        let mut left = sample_user();
        left.id = 7;
        assert_eq!(left, sample_user());
    }
}
