//! CLI commands

use anyhow::{Result, bail};
use cinebook_http::BookingClient;
use cinebook_http::types::{LoginRequest, SignupRequest};
use cinebook_http::validation::validate_seat;
use clap::Subcommand;
use std::path::PathBuf;
use tracing::info;

use crate::config::{self, CliConfig};
use crate::render;

#[derive(Subcommand)]
pub enum Commands {
    /// List movies
    Movies,

    /// List the shows of a movie
    Shows {
        /// Movie ID
        movie_id: u64,
    },

    /// Show a show's seat map
    Show {
        /// Show ID
        show_id: u64,
    },

    /// Book a seat for a show
    Book {
        /// Show ID
        show_id: u64,

        /// Seat number, starting at 1
        seat: u32,
    },

    /// List your bookings
    Bookings,

    /// Cancel one of your bookings
    Cancel {
        /// Booking ID
        booking_id: u64,
    },

    /// Log in and remember the session
    Login {
        #[arg(long, short = 'u')]
        username: String,

        #[arg(long, short = 'p', env = "CINEBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Signup {
        #[arg(long, short = 'u')]
        username: String,

        #[arg(long, short = 'e')]
        email: String,

        #[arg(long, short = 'p', env = "CINEBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show whether a session is stored
    Status,

    /// Configuration file operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a configuration file with default values
    Init {
        /// Output file path (defaults to <data-dir>/config.toml)
        output: Option<PathBuf>,
    },

    /// Print the effective configuration
    Show,
}

impl Commands {
    pub async fn execute(self, data_dir: PathBuf, config_file: Option<PathBuf>) -> Result<()> {
        // Config commands must work even when the current configuration does not load
        if let Commands::Config {
            command: ConfigCommands::Init { output },
        } = self
        {
            return init_config(output, data_dir);
        }

        let config = CliConfig::load(config_file.as_deref(), &data_dir)?;
        let client = config.build_client(&data_dir)?;

        match self {
            Commands::Movies => list_movies(&client).await,
            Commands::Shows { movie_id } => list_shows(&client, movie_id).await,
            Commands::Show { show_id } => show_seats(&client, show_id).await,
            Commands::Book { show_id, seat } => book_seat(&client, show_id, seat).await,
            Commands::Bookings => list_bookings(&client).await,
            Commands::Cancel { booking_id } => cancel_booking(&client, booking_id).await,
            Commands::Login { username, password } => {
                let request = LoginRequest { username, password };
                client.login(request).await?;
                println!("Login successful.");
                Ok(())
            }
            Commands::Signup {
                username,
                email,
                password,
            } => {
                let request = SignupRequest {
                    username,
                    email,
                    password,
                };
                client.signup(request).await?;
                println!("Signup successful. You can now log in.");
                Ok(())
            }
            Commands::Logout => {
                client.logout()?;
                println!("Logged out.");
                Ok(())
            }
            Commands::Status => {
                if client.tokens().is_authenticated()? {
                    println!("Logged in ({})", client.base_url());
                } else {
                    println!("Not logged in ({})", client.base_url());
                }
                Ok(())
            }
            Commands::Config {
                command: ConfigCommands::Show,
            } => {
                print!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            }
            Commands::Config {
                command: ConfigCommands::Init { .. },
            } => unreachable!("handled before loading configuration"),
        }
    }
}

fn init_config(output: Option<PathBuf>, data_dir: PathBuf) -> Result<()> {
    let config_path = output.unwrap_or_else(|| data_dir.join(config::CONFIG_FILE));
    if config_path.exists() {
        bail!("{} already exists", config_path.display());
    }

    // Create parent directory if it doesn't exist
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    config::generate_default_config(&config_path)?;
    println!("Generated configuration at: {}", config_path.display());
    Ok(())
}

async fn list_movies(client: &BookingClient) -> Result<()> {
    let movies = client.list_movies().await?;
    print!("{}", render::movies(&movies));
    Ok(())
}

async fn list_shows(client: &BookingClient, movie_id: u64) -> Result<()> {
    let shows = client.list_shows(movie_id).await?;
    print!("{}", render::shows(&shows));
    Ok(())
}

async fn show_seats(client: &BookingClient, show_id: u64) -> Result<()> {
    let show = client.get_show(show_id).await?;
    print!("{}", render::show_detail(&show));
    Ok(())
}

async fn book_seat(client: &BookingClient, show_id: u64, seat: u32) -> Result<()> {
    // Check against the current seat map first; the service still has the final say
    let show = client.get_show(show_id).await?;
    validate_seat(seat, Some(&show))?;

    let booking = client.book_seat(show_id, seat).await?;
    info!(booking_id = booking.id, show_id, seat, "Seat booked");
    println!("Seat {seat} booked successfully (booking {}).", booking.id);

    let show = client.get_show(show_id).await?;
    println!(
        "{} of {} seats still available.",
        show.available_seats, show.total_seats
    );
    Ok(())
}

async fn list_bookings(client: &BookingClient) -> Result<()> {
    let bookings = client.my_bookings().await?;
    print!("{}", render::bookings(&bookings));
    Ok(())
}

async fn cancel_booking(client: &BookingClient, booking_id: u64) -> Result<()> {
    let bookings = client.my_bookings().await?;
    let inactive = bookings
        .iter()
        .find(|booking| booking.id == booking_id && !booking.is_active());
    if let Some(booking) = inactive {
        bail!("Booking {booking_id} is already {}", booking.status);
    }

    let confirmation = client.cancel_booking(booking_id).await?;
    info!(booking_id, "Booking cancelled");
    println!("{}", confirmation.detail);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_cancel_refuses_cancelled_booking_locally() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/my-bookings/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 7,
                "seat_number": 3,
                "status": "cancelled",
                "created_at": "2025-02-27T08:15:42Z",
                "show": {
                    "id": 4,
                    "movie": {"id": 1, "title": "Arrival"},
                    "screen_name": "Screen 2",
                    "date_time": "2025-03-01T19:30:00Z",
                    "total_seats": 50
                }
            }])))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/bookings/7/cancel/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"detail": "ok"})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = BookingClient::new(mock_server.uri()).unwrap();
        let error = cancel_booking(&client, 7).await.unwrap_err();

        assert_eq!(error.to_string(), "Booking 7 is already cancelled");
    }

    #[tokio::test]
    async fn test_cancel_unknown_booking_defers_to_service() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/my-bookings/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/bookings/9/cancel/"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BookingClient::new(mock_server.uri()).unwrap();
        let error = cancel_booking(&client, 9).await.unwrap_err();

        let client_error = error.downcast_ref::<cinebook_http::ClientError>().unwrap();
        assert_eq!(client_error.status().map(|status| status.as_u16()), Some(404));
    }
}
