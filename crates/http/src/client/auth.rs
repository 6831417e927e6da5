//! Account API client methods

use super::{BookingClient, ClientError, PendingRequest};
use crate::types::{LoginRequest, SignupRequest, TokenPair};
use serde::de::IgnoredAny;

impl BookingClient {
    /// Log in and store the issued token pair
    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, ClientError> {
        request.validate()?;

        let req = PendingRequest::post(self.routes.login.clone()).json(&request)?;
        let tokens: TokenPair = self.call(req).await?;
        self.tokens.write(&tokens)?;

        info!(username = %request.username.trim(), "Logged in");
        Ok(tokens)
    }

    /// Create an account; the caller logs in separately afterwards
    pub async fn signup(&self, request: SignupRequest) -> Result<(), ClientError> {
        request.validate()?;

        let req = PendingRequest::post(self.routes.signup.clone()).json(&request)?;
        let _: IgnoredAny = self.call(req).await?;

        info!(username = %request.username.trim(), "Account created");
        Ok(())
    }

    /// Forget the stored tokens. The service keeps no session to end.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.tokens.clear()?;
        info!("Logged out");
        Ok(())
    }
}
