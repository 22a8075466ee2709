//! Login and registration forms: field state, local validation and the busy
//! guard that blocks a second submit while the first is in flight.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::toast::Notice;

/// Minimum password length in UTF-16 code units.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required fields are blank")]
    MissingFields,
    #[error("email address is malformed")]
    InvalidEmail,
    #[error("password is shorter than 6 characters")]
    WeakPassword,
    #[error("passwords do not match")]
    PasswordMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Register,
}

impl ValidationError {
    /// The toast shown for this failure on the given form.
    pub fn notice(self, form: FormKind) -> Notice {
        match (form, self) {
            (FormKind::Login, ValidationError::MissingFields) => {
                Notice::error("Missing Fields", "Please fill in all fields 📝")
            }
            (FormKind::Login, ValidationError::InvalidEmail) => {
                Notice::error("Invalid Email", "Please enter a valid email address 📧")
            }
            (FormKind::Login, ValidationError::WeakPassword) => {
                Notice::error("Weak Password", "Password must be at least 6 characters 🔐")
            }
            (FormKind::Register, ValidationError::MissingFields) => {
                Notice::error("Missing Fields ❗", "Please fill in all the required fields.")
            }
            (FormKind::Register, ValidationError::InvalidEmail) => {
                Notice::error("Invalid Email 📧", "Please enter a valid email address.")
            }
            (FormKind::Register, ValidationError::WeakPassword) => {
                Notice::error("Weak Password 🔐", "Password must be at least 6 characters.")
            }
            (_, ValidationError::PasswordMismatch) => {
                Notice::error("Password Mismatch 🔁", "Passwords do not match.")
            }
        }
    }
}

/// Validated email and password, ready for the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub credentials: Credentials,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn check_email_and_password(email: &str, password: &str) -> Result<(), ValidationError> {
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if password.encode_utf16().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub show_password: bool,
    pub(crate) busy: bool,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, ValidationError> {
        if is_blank(&self.email) || is_blank(&self.password) {
            return Err(ValidationError::MissingFields);
        }
        check_email_and_password(&self.email, &self.password)?;
        Ok(Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }

    /// Validate and mark busy. `None` while a previous submit is pending.
    pub fn begin_submit(&mut self) -> Option<Result<Credentials, ValidationError>> {
        if self.busy {
            return None;
        }
        let result = self.validate();
        self.busy = result.is_ok();
        Some(result)
    }

    pub fn finish_submit(&mut self) {
        self.busy = false;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    busy: bool,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, ValidationError> {
        if [&self.name, &self.email, &self.password, &self.confirm_password]
            .into_iter()
            .any(|field| is_blank(field))
        {
            return Err(ValidationError::MissingFields);
        }
        check_email_and_password(&self.email, &self.password)?;
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(Registration {
            name: self.name.trim().to_string(),
            credentials: Credentials {
                email: self.email.clone(),
                password: self.password.clone(),
            },
        })
    }

    pub fn begin_submit(&mut self) -> Option<Result<Registration, ValidationError>> {
        if self.busy {
            return None;
        }
        let result = self.validate();
        self.busy = result.is_ok();
        Some(result)
    }

    pub fn finish_submit(&mut self) {
        self.busy = false;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}
