//! Service route configuration

use serde::{Deserialize, Serialize};

/// Paths of the account endpoints
///
/// Service revisions disagree on where these live (`/signup` versus
/// `/accounts/signup/`), so they are configuration rather than constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub login: String,
    pub signup: String,
    pub refresh: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            signup: "/signup".to_string(),
            refresh: "/token/refresh".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_routes_keep_defaults() {
        let routes: Routes = serde_json::from_str(r#"{"signup": "/accounts/signup/"}"#).unwrap();
        assert_eq!(routes.signup, "/accounts/signup/");
        assert_eq!(routes.login, "/login");
        assert_eq!(routes.refresh, "/token/refresh");
    }
}
