//! Authenticated call with a single transparent token refresh
//!
//! A call moves through a small state machine:
//!
//! ```text
//! Sent --2xx--------------------------------------------> Succeeded
//! Sent --401, refresh token stored--> Refreshing
//! Sent --any other status-------------------------------> Failed
//! Refreshing --new access token stored--> Retried
//! Refreshing --refresh rejected, store cleared----------> Failed
//! Retried --2xx-----------------------------------------> Succeeded
//! Retried --any other status, including 401-------------> Failed
//! ```
//!
//! [`CallPhase::advance`] holds these rules and nothing else; the driver in
//! [`BookingClient::call`] performs the I/O each phase needs and feeds the
//! outcome back in. There is no edge out of `Retried` into `Refreshing`, so a
//! call refreshes at most once and is retried at most once.

use super::BookingClient;
use super::PendingRequest;
use super::error::{ApiError, ClientError};
use crate::types::{RefreshRequest, RefreshResponse, TokenPair};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Where an in-flight call stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    /// The original request is out
    Sent,
    /// The original request got a 401; the refresh endpoint is being asked
    Refreshing,
    /// The request is out again with a refreshed access token
    Retried,
    Succeeded,
    Failed,
}

/// Outcome of the I/O performed in a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    /// A response arrived. `refresh_available` is whether a refresh token was
    /// stored when it did.
    Responded {
        status: StatusCode,
        refresh_available: bool,
    },
    RefreshSucceeded,
    RefreshFailed,
}

impl CallPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Next phase after `event`
    pub fn advance(self, event: CallEvent) -> CallPhase {
        use CallEvent::*;

        match (self, event) {
            (Self::Sent | Self::Retried, Responded { status, .. }) if status.is_success() => {
                Self::Succeeded
            }
            (
                Self::Sent,
                Responded {
                    status,
                    refresh_available: true,
                },
            ) if status == StatusCode::UNAUTHORIZED => Self::Refreshing,
            (Self::Sent | Self::Retried, Responded { .. }) => Self::Failed,
            (Self::Refreshing, RefreshSucceeded) => Self::Retried,
            (Self::Refreshing, RefreshFailed) => Self::Failed,
            (terminal, _) if terminal.is_terminal() => terminal,
            // Events that cannot happen in this phase end the call
            _ => Self::Failed,
        }
    }
}

impl BookingClient {
    /// Perform `request`, refreshing the access token once on a 401
    ///
    /// Network failures propagate as [`ClientError::Request`] and are never
    /// retried. A non-success response fails with [`ClientError::Api`]; when a
    /// refresh was attempted and rejected, that is the original 401.
    pub async fn call<T: DeserializeOwned>(
        &self,
        request: PendingRequest,
    ) -> Result<T, ClientError> {
        let mut access_token = self.tokens.read()?.map(|pair| pair.access);
        let mut refresh_token: Option<String> = None;
        let mut phase = CallPhase::Sent;
        let mut body = String::new();
        let mut rejection: Option<ApiError> = None;

        while !phase.is_terminal() {
            let event = match phase {
                CallPhase::Sent | CallPhase::Retried => {
                    let response = self.dispatch(&request, access_token.as_deref()).await?;
                    let status = response.status();
                    let text = response.text().await?;

                    if status.is_success() {
                        body = text;
                    } else {
                        if phase == CallPhase::Sent && status == StatusCode::UNAUTHORIZED {
                            refresh_token = self.tokens.read()?.map(|pair| pair.refresh);
                        }
                        rejection = Some(ApiError::new(status, text));
                    }

                    CallEvent::Responded {
                        status,
                        refresh_available: refresh_token.is_some(),
                    }
                }
                CallPhase::Refreshing => {
                    let refresh = refresh_token.take().unwrap_or_default();
                    match self.refresh_access_token(&refresh).await {
                        Ok(access) => {
                            self.tokens.write(&TokenPair::new(access.clone(), refresh))?;
                            access_token = Some(access);
                            CallEvent::RefreshSucceeded
                        }
                        Err(e) => {
                            warn!(error = %e, "Token refresh failed; clearing stored tokens");
                            self.tokens.clear()?;
                            CallEvent::RefreshFailed
                        }
                    }
                }
                CallPhase::Succeeded | CallPhase::Failed => break,
            };

            let next = phase.advance(event);
            debug!(from = ?phase, to = ?next, path = %request.path, "Call transition");
            phase = next;
        }

        match (phase, rejection) {
            (CallPhase::Succeeded, _) => decode_body(&body),
            (_, Some(rejection)) => Err(rejection.into()),
            (phase, None) => Err(ClientError::InvalidResponse(format!(
                "call ended in {phase:?} without a response"
            ))),
        }
    }

    /// Exchange a refresh token for a new access token
    ///
    /// Goes straight to the wire rather than through [`call`](Self::call) so a
    /// rejected refresh can never trigger another refresh.
    pub async fn refresh_access_token(&self, refresh: &str) -> Result<String, ClientError> {
        let request = PendingRequest::post(self.routes.refresh.clone()).json(&RefreshRequest {
            refresh: refresh.to_string(),
        })?;

        let response = self.dispatch(&request, None).await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::new(status, text).into());
        }

        let refreshed: RefreshResponse = decode_body(&text)?;
        match refreshed.access {
            Some(access) if !access.is_empty() => {
                info!("Refreshed access token");
                Ok(access)
            }
            _ => Err(ClientError::InvalidResponse(
                "refresh response carried no access token".into(),
            )),
        }
    }
}

/// Parse a success body; an empty body reads as JSON `null`
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responded(status: StatusCode, refresh_available: bool) -> CallEvent {
        CallEvent::Responded {
            status,
            refresh_available,
        }
    }

    #[test]
    fn test_success_on_first_send() {
        assert_eq!(
            CallPhase::Sent.advance(responded(StatusCode::OK, true)),
            CallPhase::Succeeded
        );
        assert_eq!(
            CallPhase::Sent.advance(responded(StatusCode::CREATED, false)),
            CallPhase::Succeeded
        );
    }

    #[test]
    fn test_unauthorized_refreshes_only_with_refresh_token() {
        assert_eq!(
            CallPhase::Sent.advance(responded(StatusCode::UNAUTHORIZED, true)),
            CallPhase::Refreshing
        );
        assert_eq!(
            CallPhase::Sent.advance(responded(StatusCode::UNAUTHORIZED, false)),
            CallPhase::Failed
        );
    }

    #[test]
    fn test_other_failures_never_refresh() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::FORBIDDEN,
            StatusCode::CONFLICT,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::GATEWAY_TIMEOUT,
        ] {
            assert_eq!(
                CallPhase::Sent.advance(responded(status, true)),
                CallPhase::Failed,
                "{status} should not refresh"
            );
        }
    }

    #[test]
    fn test_refresh_outcomes() {
        assert_eq!(
            CallPhase::Refreshing.advance(CallEvent::RefreshSucceeded),
            CallPhase::Retried
        );
        assert_eq!(
            CallPhase::Refreshing.advance(CallEvent::RefreshFailed),
            CallPhase::Failed
        );
    }

    #[test]
    fn test_retry_happens_once() {
        assert_eq!(
            CallPhase::Retried.advance(responded(StatusCode::OK, true)),
            CallPhase::Succeeded
        );
        // A second 401 ends the call even with a refresh token available
        assert_eq!(
            CallPhase::Retried.advance(responded(StatusCode::UNAUTHORIZED, true)),
            CallPhase::Failed
        );
    }

    #[test]
    fn test_terminal_phases_stay_put() {
        for event in [
            responded(StatusCode::UNAUTHORIZED, true),
            CallEvent::RefreshSucceeded,
            CallEvent::RefreshFailed,
        ] {
            assert_eq!(CallPhase::Succeeded.advance(event), CallPhase::Succeeded);
            assert_eq!(CallPhase::Failed.advance(event), CallPhase::Failed);
        }
    }

    #[test]
    fn test_out_of_order_events_fail() {
        assert_eq!(
            CallPhase::Sent.advance(CallEvent::RefreshSucceeded),
            CallPhase::Failed
        );
        assert_eq!(
            CallPhase::Refreshing.advance(responded(StatusCode::OK, true)),
            CallPhase::Failed
        );
    }

    #[test]
    fn test_empty_body_decodes_as_null() {
        decode_body::<()>("").unwrap();
        let value: Option<u32> = decode_body("  ").unwrap();
        assert_eq!(value, None);
        assert!(decode_body::<u32>("{").is_err());
    }
}
