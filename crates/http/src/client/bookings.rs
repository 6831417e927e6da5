//! Movie, show and booking API client methods

use super::{BookingClient, ClientError, PendingRequest};
use crate::types::{BookSeatRequest, Booking, Detail, Movie, Show, ShowDetail};
use crate::validation::validate_seat;

impl BookingClient {
    /// List all movies
    pub async fn list_movies(&self) -> Result<Vec<Movie>, ClientError> {
        self.call(PendingRequest::get("/movies/")).await
    }

    /// List the shows of one movie, earliest first
    pub async fn list_shows(&self, movie_id: u64) -> Result<Vec<Show>, ClientError> {
        self.call(PendingRequest::get(format!("/movies/{movie_id}/shows/"))).await
    }

    /// Get a show with its seat availability
    pub async fn get_show(&self, show_id: u64) -> Result<ShowDetail, ClientError> {
        self.call(PendingRequest::get(format!("/shows/{show_id}/"))).await
    }

    /// Book one seat. Conflicts surface as a 409 [`ApiError`](super::error::ApiError).
    pub async fn book_seat(&self, show_id: u64, seat_number: u32) -> Result<Booking, ClientError> {
        validate_seat(seat_number, None)?;

        let req = PendingRequest::post(format!("/shows/{show_id}/book/"))
            .json(&BookSeatRequest { seat_number })?;
        self.call(req).await
    }

    /// List the current user's bookings, newest first
    pub async fn my_bookings(&self) -> Result<Vec<Booking>, ClientError> {
        self.call(PendingRequest::get("/my-bookings/")).await
    }

    /// Cancel one of the current user's bookings
    pub async fn cancel_booking(&self, booking_id: u64) -> Result<Detail, ClientError> {
        self.call(PendingRequest::post(format!("/bookings/{booking_id}/cancel/"))).await
    }
}
