//! Microsoft Graph client: refresh-token exchange and message listing.
//!
//! Each mailbox read is two sequential outbound calls. The stored refresh
//! token is first exchanged for a short-lived access token at the OAuth2
//! token endpoint, then the most recent messages are listed from Graph with
//! that token. Both calls are single-attempt and timeout-bounded; failures
//! surface as [`GraphError`] values for the handler to report, never as
//! panics or retries.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const DEFAULT_TOKEN_URL: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";
const DEFAULT_GRAPH_ENDPOINT: &str = "https://graph.microsoft.com/v1.0";

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How many messages a mailbox read returns.
pub const NUM_MAILS: u32 = 5;

/// A failed outbound call, tagged by which of the two calls failed.
///
/// `detail` carries the provider's raw response body for a non-200 reply, or
/// the transport error text for a network-level failure.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The refresh-token grant was rejected or never completed.
    #[error("token exchange failed: {detail}")]
    TokenExchange { detail: String },

    /// The message listing was rejected or never completed.
    #[error("message fetch failed: {detail}")]
    MessageFetch { detail: String },
}

impl GraphError {
    /// The diagnostic text attached to the failure.
    pub fn detail(&self) -> &str {
        match self {
            Self::TokenExchange { detail } | Self::MessageFetch { detail } => detail,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct MessageListResponse {
    #[serde(default)]
    value: Vec<Value>,
}

/// Client for the token endpoint and the Graph messages endpoint.
///
/// Cheap to clone; the underlying `reqwest::Client` is shared. Endpoints
/// default to the public Microsoft hosts and are overridable for tests.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    token_url: String,
    graph_endpoint: String,
}

impl Default for GraphClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphClient {
    pub fn new() -> Self {
        Self::with_endpoints(DEFAULT_TOKEN_URL, DEFAULT_GRAPH_ENDPOINT)
    }

    /// Builds a client against alternate endpoints (used by tests to point
    /// at a mock server).
    pub fn with_endpoints(token_url: impl Into<String>, graph_endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: token_url.into(),
            graph_endpoint: graph_endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    /// Exchanges a refresh token for an access token.
    ///
    /// Single POST of the OAuth2 `refresh_token` grant form. Any non-200
    /// reply or transport failure becomes [`GraphError::TokenExchange`] with
    /// the provider body (or error text) as detail.
    pub async fn exchange_token(
        &self,
        client_id: &str,
        refresh_token: &str,
    ) -> Result<String, GraphError> {
        let form = [
            ("client_id", client_id),
            ("scope", GRAPH_SCOPE),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| GraphError::TokenExchange {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let detail = response.text().await.unwrap_or_default();
            debug!(%status, "token endpoint rejected refresh token");
            return Err(GraphError::TokenExchange { detail });
        }

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| GraphError::TokenExchange {
                    detail: e.to_string(),
                })?;

        Ok(token.access_token)
    }

    /// Lists the most recent messages for the mailbox the token belongs to.
    ///
    /// Single authenticated GET for the top [`NUM_MAILS`] messages by
    /// received time, newest first. Messages are passed through as opaque
    /// JSON objects; an absent `value` field reads as an empty list.
    pub async fn fetch_messages(&self, access_token: &str) -> Result<Vec<Value>, GraphError> {
        let response = self
            .http
            .get(format!("{}/me/messages", self.graph_endpoint))
            .query(&[
                ("$top", NUM_MAILS.to_string().as_str()),
                ("$orderby", "receivedDateTime desc"),
            ])
            .bearer_auth(access_token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| GraphError::MessageFetch {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let detail = response.text().await.unwrap_or_default();
            debug!(%status, "message listing failed");
            return Err(GraphError::MessageFetch { detail });
        }

        let list: MessageListResponse =
            response
                .json()
                .await
                .map_err(|e| GraphError::MessageFetch {
                    detail: e.to_string(),
                })?;

        Ok(list.value)
    }
}
