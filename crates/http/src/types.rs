//! Request and response types exchanged with the booking service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access and refresh tokens, always persisted together
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

// Tokens are credentials; keep them out of logs and panic messages.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Account creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Token refresh response
///
/// The service only returns a new access token; the refresh token is not rotated.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshResponse {
    #[serde(default)]
    pub access: Option<String>,
}

/// A movie as listed by `GET /movies/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub duration_minutes: u32,
}

/// Movie embedded in show and booking payloads
///
/// Show detail only carries the id and title, show listings carry the full movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// A scheduled screening of a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: u64,
    pub movie: MovieSummary,
    pub screen_name: String,
    pub date_time: DateTime<Utc>,
    pub total_seats: u32,
}

/// Show with its current seat availability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowDetail {
    pub id: u64,
    pub movie: MovieSummary,
    pub screen_name: String,
    pub date_time: DateTime<Utc>,
    pub total_seats: u32,
    pub available_seats: u32,
    #[serde(default)]
    pub booked_seats: Vec<u32>,
}

impl ShowDetail {
    /// Whether the given seat is currently held by a booking
    pub fn is_booked(&self, seat: u32) -> bool {
        self.booked_seats.contains(&seat)
    }
}

/// Seat booking request
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookSeatRequest {
    pub seat_number: u32,
}

/// Booking lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Booked,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Booked => f.pad("booked"),
            Self::Cancelled => f.pad("cancelled"),
        }
    }
}

/// A seat booking owned by the current user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: u64,
    pub show: Show,
    pub seat_number: u32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Booked
    }
}

/// `{"detail": "..."}` body used for confirmations and service errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_show_detail_seats() {
        let show: ShowDetail = serde_json::from_value(json!({
            "id": 4,
            "movie": {"id": 1, "title": "Arrival"},
            "screen_name": "Screen 2",
            "date_time": "2025-03-01T19:30:00Z",
            "total_seats": 5,
            "available_seats": 3,
            "booked_seats": [2, 5]
        }))
        .unwrap();

        assert!(show.is_booked(2));
        assert!(!show.is_booked(3));
        assert_eq!(show.movie.duration_minutes, None);
    }

    #[test]
    fn test_booking_parses_nested_show() {
        let booking: Booking = serde_json::from_value(json!({
            "id": 12,
            "seat_number": 7,
            "status": "cancelled",
            "created_at": "2025-02-27T08:15:42.123456+01:00",
            "show": {
                "id": 4,
                "movie": {"id": 1, "title": "Arrival", "duration_minutes": 116},
                "screen_name": "Screen 2",
                "date_time": "2025-03-01T19:30:00Z",
                "total_seats": 50
            }
        }))
        .unwrap();

        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert!(!booking.is_active());
        assert_eq!(booking.show.movie.duration_minutes, Some(116));
    }

    #[test]
    fn test_token_pair_debug_is_redacted() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains("secret"));
    }
}
