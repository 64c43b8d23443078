//! HTTP surface: mailbox-read endpoints and the static landing page.
//!
//! Both read endpoints run the same orchestration — normalize the address,
//! look up stored credentials, exchange the refresh token, list messages —
//! and differ only in how the address arrives. Every outcome, including
//! failures, is reported as HTTP 200 with the error encoded in the JSON
//! envelope; callers distinguish success by `error: null`.

use std::{path::PathBuf, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use mailpeek_core::{AccountStore, GraphClient, normalize_email};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

/// Shared per-process state. The account table is read-only after startup,
/// so handlers share it through an `Arc` with no locking.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountStore>,
    pub graph: GraphClient,
    pub static_dir: PathBuf,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/read-email", post(read_email_post))
        .route("/api/read-email", get(read_email_get))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ReadEmailBody {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct ReadEmailQuery {
    #[serde(default)]
    hotmail: String,
}

/// Response envelope shared by both read endpoints.
///
/// `input_email` echoes what the caller sent (trimmed, and with the GET
/// handler's space-to-`+` restoration applied); `detail` appears only
/// alongside provider-reported failures.
#[derive(Debug, Serialize)]
struct ReadEmailResponse {
    input_email: String,
    mails: Vec<Value>,
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ReadEmailResponse {
    fn success(input_email: String, mails: Vec<Value>) -> Self {
        Self {
            input_email,
            mails,
            error: None,
            detail: None,
        }
    }

    fn failure(input_email: String, error: &str, detail: Option<String>) -> Self {
        Self {
            input_email,
            mails: Vec::new(),
            error: Some(error.to_string()),
            detail,
        }
    }
}

/// Reads a mailbox identified by a JSON `{"email": ...}` body.
async fn read_email_post(
    State(state): State<AppState>,
    Json(body): Json<ReadEmailBody>,
) -> Json<ReadEmailResponse> {
    Json(read_mailbox(&state, body.email.trim().to_string()).await)
}

/// Reads a mailbox identified by the `hotmail` query parameter.
async fn read_email_get(
    State(state): State<AppState>,
    Query(query): Query<ReadEmailQuery>,
) -> Json<ReadEmailResponse> {
    // Query decoding turns a literal `+` into a space, which would break
    // tagged addresses; put the `+` back before anything else sees the value.
    let input = query.hotmail.trim().replace(' ', "+");
    Json(read_mailbox(&state, input).await)
}

/// Shared orchestration for both read endpoints. `input_email` is already
/// trimmed; it is echoed back verbatim in every response.
async fn read_mailbox(state: &AppState, input_email: String) -> ReadEmailResponse {
    if input_email.is_empty() {
        return ReadEmailResponse::failure(input_email, "no email provided", None);
    }

    let key = normalize_email(&input_email);
    let Some(account) = state.accounts.get(&key) else {
        info!(email = %key, "lookup for unknown account");
        return ReadEmailResponse::failure(input_email, "email not in list", None);
    };

    let access_token = match state
        .graph
        .exchange_token(&account.client_id, &account.refresh_token)
        .await
    {
        Ok(token) => token,
        Err(e) => {
            warn!(email = %key, error = %e, "token exchange failed");
            return ReadEmailResponse::failure(
                input_email,
                "refresh token invalid",
                Some(e.detail().to_string()),
            );
        }
    };

    match state.graph.fetch_messages(&access_token).await {
        Ok(mails) => {
            info!(email = %key, count = mails.len(), "mailbox read");
            ReadEmailResponse::success(input_email, mails)
        }
        Err(e) => {
            warn!(email = %key, error = %e, "message fetch failed");
            ReadEmailResponse::failure(
                input_email,
                "could not read mail",
                Some(e.detail().to_string()),
            )
        }
    }
}

/// Serves the landing page from the configured static directory.
async fn index(State(state): State<AppState>) -> impl IntoResponse {
    match tokio::fs::read_to_string(state.static_dir.join("index.html")).await {
        Ok(page) => Html(page).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
