//! Client-side form validation
//!
//! These checks run before a request is built. A failing form is never sent
//! to the service, which still enforces its own rules.

use crate::types::{LoginRequest, ShowDetail, SignupRequest};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Minimum username length, counted after trimming surrounding whitespace
pub const MIN_USERNAME_LEN: usize = 3;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".+@.+\..+").expect("email pattern is valid"));

/// A form field that failed its client-side constraint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Username must be at least {} characters.", MIN_USERNAME_LEN)]
    UsernameTooShort,

    #[error("Password must be at least {} characters.", MIN_PASSWORD_LEN)]
    PasswordTooShort,

    #[error("Please enter a valid email.")]
    InvalidEmail,

    #[error("Seat {seat} is outside 1..={total_seats}.")]
    SeatOutOfRange { seat: u32, total_seats: u32 },

    #[error("Seat numbers start at 1.")]
    SeatZero,

    #[error("Seat {0} is already booked.")]
    SeatAlreadyBooked(u32),
}

impl ValidationError {
    /// Name of the offending form field
    pub fn field(&self) -> &'static str {
        match self {
            Self::UsernameTooShort => "username",
            Self::PasswordTooShort => "password",
            Self::InvalidEmail => "email",
            Self::SeatOutOfRange { .. } | Self::SeatZero | Self::SeatAlreadyBooked(_) => "seat",
        }
    }
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::UsernameTooShort);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Check a seat number, optionally against the show's current seat map
pub fn validate_seat(seat: u32, show: Option<&ShowDetail>) -> Result<(), ValidationError> {
    if seat == 0 {
        return Err(ValidationError::SeatZero);
    }

    if let Some(show) = show {
        if seat > show.total_seats {
            return Err(ValidationError::SeatOutOfRange {
                seat,
                total_seats: show.total_seats,
            });
        }
        if show.is_booked(seat) {
            return Err(ValidationError::SeatAlreadyBooked(seat));
        }
    }

    Ok(())
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        validate_password(&self.password)
    }
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}
