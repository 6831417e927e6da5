//! Booking service HTTP client

pub mod auth;
pub mod bookings;
pub mod call;
pub mod config;
pub mod error;

pub use call::{CallEvent, CallPhase};
pub use config::Routes;

use crate::token_store::TokenStore;
use error::ClientError;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, Method};
use serde::Serialize;
use std::time::Duration;
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!("cinebook/", env!("CARGO_PKG_VERSION"));

/// One logical API call, replayable with a substituted credential
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub method: Method,
    pub path: String,
    /// Applied after the defaults, so these win over them
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach a JSON body
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Add a header that overrides the client's defaults
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Booking service client
///
/// Every call goes through [`BookingClient::call`], which attaches the stored
/// access token and refreshes it once on a 401.
#[derive(Clone, Debug)]
pub struct BookingClient {
    client: Client,
    base_url: String,
    routes: Routes,
    tokens: TokenStore,
}

impl BookingClient {
    /// Create a new client with default configuration and an in-memory token store
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> BookingClientBuilder {
        BookingClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// The token store this client reads credentials from
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Send `request` once with the given access token
    async fn dispatch(
        &self,
        request: &PendingRequest,
        access_token: Option<&str>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(token) = access_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                ClientError::Configuration("access token is not a valid header value".into())
            })?;
            headers.insert(header::AUTHORIZATION, value);
        }
        // Caller headers replace defaults of the same name
        for (name, value) in &request.headers {
            headers.insert(name.clone(), value.clone());
        }

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        debug!(
            method = %request.method,
            path = %request.path,
            authenticated = access_token.is_some(),
            "Dispatching request"
        );
        Ok(builder.send().await?)
    }
}

/// Builder for BookingClient
#[derive(Default)]
pub struct BookingClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    routes: Option<Routes>,
    tokens: Option<TokenStore>,
}

impl BookingClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Override the account endpoint paths
    pub fn routes(mut self, routes: Routes) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Use a shared token store instead of a fresh in-memory one
    pub fn token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<BookingClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url {base_url}: {e}")))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new()
            .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let client = client_builder.build()?;

        Ok(BookingClient {
            client,
            base_url,
            routes: self.routes.unwrap_or_default(),
            tokens: self.tokens.unwrap_or_else(TokenStore::in_memory),
        })
    }
}
