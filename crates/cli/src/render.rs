//! Plain-text rendering of service payloads

use chrono::{DateTime, Local, Utc};
use cinebook_http::types::{Booking, Movie, Show, ShowDetail};
use std::fmt::Write;

const SEATS_PER_ROW: u32 = 10;

fn local_time(date_time: &DateTime<Utc>) -> String {
    date_time
        .with_timezone(&Local)
        .format("%a %d %b %Y %H:%M")
        .to_string()
}

pub fn movies(movies: &[Movie]) -> String {
    if movies.is_empty() {
        return "No movies available.\n".to_string();
    }

    let mut out = format!("{:>5}  {:<40}  {:>8}\n", "ID", "TITLE", "DURATION");
    for movie in movies {
        let _ = writeln!(
            out,
            "{:>5}  {:<40}  {:>5} min",
            movie.id, movie.title, movie.duration_minutes
        );
    }
    out
}

pub fn shows(shows: &[Show]) -> String {
    if shows.is_empty() {
        return "No shows scheduled.\n".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<22}  {:<12}  {:>5}\n",
        "ID", "WHEN", "SCREEN", "SEATS"
    );
    for show in shows {
        let _ = writeln!(
            out,
            "{:>5}  {:<22}  {:<12}  {:>5}",
            show.id,
            local_time(&show.date_time),
            show.screen_name,
            show.total_seats
        );
    }
    out
}

/// Header line plus the seat map of a show
pub fn show_detail(show: &ShowDetail) -> String {
    let mut out = format!(
        "{} | {} | {}\n{} of {} seats available\n\n",
        show.movie.title,
        show.screen_name,
        local_time(&show.date_time),
        show.available_seats,
        show.total_seats
    );
    out.push_str(&seat_map(show));
    out
}

/// Seat grid, ten per row, booked seats shown as `[ X]`
pub fn seat_map(show: &ShowDetail) -> String {
    let width = show.total_seats.to_string().len();
    let mut out = String::new();

    for seat in 1..=show.total_seats {
        if show.is_booked(seat) {
            let _ = write!(out, "[{:>width$}]", "X");
        } else {
            let _ = write!(out, "[{seat:>width$}]");
        }

        if seat % SEATS_PER_ROW == 0 || seat == show.total_seats {
            out.push('\n');
        } else {
            out.push(' ');
        }
    }
    out
}

pub fn bookings(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return "You have no bookings.\n".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<30}  {:<22}  {:>4}  {:<9}\n",
        "ID", "MOVIE", "WHEN", "SEAT", "STATUS"
    );
    for booking in bookings {
        let _ = writeln!(
            out,
            "{:>5}  {:<30}  {:<22}  {:>4}  {:<9}",
            booking.id,
            booking.show.movie.title,
            local_time(&booking.show.date_time),
            booking.seat_number,
            booking.status
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinebook_http::types::{BookingStatus, MovieSummary};

    fn show_detail_with(total_seats: u32, booked_seats: Vec<u32>) -> ShowDetail {
        ShowDetail {
            id: 1,
            movie: MovieSummary {
                id: 7,
                title: "Heat".to_string(),
                duration_minutes: None,
            },
            screen_name: "Screen 1".to_string(),
            date_time: "2026-10-15T19:30:00Z".parse().unwrap(),
            total_seats,
            available_seats: total_seats - booked_seats.len() as u32,
            booked_seats,
        }
    }

    #[test]
    fn test_seat_map_rows_of_ten() {
        let map = seat_map(&show_detail_with(12, vec![]));
        let rows: Vec<&str> = map.lines().collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].matches('[').count(), 10);
        assert_eq!(rows[1], "[11] [12]");
    }

    #[test]
    fn test_seat_map_marks_booked_seats() {
        let map = seat_map(&show_detail_with(5, vec![2, 5]));
        assert_eq!(map, "[1] [X] [3] [4] [X]\n");
    }

    #[test]
    fn test_seat_map_pads_to_widest_number() {
        let map = seat_map(&show_detail_with(100, vec![1]));
        let first_row = map.lines().next().unwrap();
        assert!(first_row.starts_with("[  X] [  2]"));
        assert!(map.lines().last().unwrap().ends_with("[100]"));
    }

    #[test]
    fn test_empty_listings() {
        assert_eq!(movies(&[]), "No movies available.\n");
        assert_eq!(shows(&[]), "No shows scheduled.\n");
        assert_eq!(bookings(&[]), "You have no bookings.\n");
    }

    #[test]
    fn test_bookings_table_shows_status() {
        let detail = show_detail_with(10, vec![]);
        let booking = Booking {
            id: 42,
            show: Show {
                id: detail.id,
                movie: detail.movie.clone(),
                screen_name: detail.screen_name.clone(),
                date_time: detail.date_time,
                total_seats: detail.total_seats,
            },
            seat_number: 3,
            status: BookingStatus::Cancelled,
            created_at: detail.date_time,
        };

        let table = bookings(&[booking]);
        let row = table.lines().nth(1).unwrap();
        assert!(row.contains("Heat"));
        assert!(row.contains("cancelled"));
        assert!(row.trim_start().starts_with("42"));
    }

    #[test]
    fn test_movies_table() {
        let table = movies(&[Movie {
            id: 3,
            title: "Alien".to_string(),
            duration_minutes: 117,
        }]);
        assert!(table.lines().nth(1).unwrap().contains("117 min"));
    }
}
