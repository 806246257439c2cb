//! Request guards for axum routers
//!
//! Apply with `middleware::from_fn_with_state(access, require_session)`.
//!
//! | Outcome | Status |
//! |---|---|
//! | no bearer token | 401 |
//! | no service profile (service guard only) | 400 |
//! | authority said no | 401 |
//! | directory or authority unreachable / unreadable | 500 |
//!
//! A 500 carries the fixed diagnostic of the failing call in `message`.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::access::ServiceAccess;
use crate::api::headers::{extract_service_profile, extract_token};
use crate::api::types::{AuthErrorResponse, CallContext};
use crate::error::ClientError;
use crate::validator::Verdict;

/// Require a valid end-user session
pub async fn require_session(
    State(access): State<ServiceAccess>,
    request: Request,
    next: Next,
) -> Result<Response, GuardError> {
    let ctx = CallContext::new(request.uri().path());
    let token = extract_token(request.headers());
    if token.is_empty() {
        return Err(GuardError::MissingToken);
    }

    access.check_session(&ctx, &token).await.into_result()?;

    Ok(next.run(request).await)
}

/// Require a valid service session allowed to perform the requested action
///
/// On success the checked [`ServiceProfile`](crate::ServiceProfile) is
/// available to handlers as a request extension.
pub async fn require_service_profile(
    State(access): State<ServiceAccess>,
    mut request: Request,
    next: Next,
) -> Result<Response, GuardError> {
    let ctx = CallContext::new(request.uri().path());
    let token = extract_token(request.headers());
    if token.is_empty() {
        return Err(GuardError::MissingToken);
    }

    let profile = extract_service_profile(request.headers());
    if profile.is_empty() {
        return Err(GuardError::MissingProfile);
    }

    access
        .check_service(&ctx, &token, &profile)
        .await
        .into_result()?;

    request.extensions_mut().insert(profile);
    Ok(next.run(request).await)
}

impl Verdict {
    fn into_result(self) -> Result<(), GuardError> {
        match self {
            Verdict::Allowed => Ok(()),
            Verdict::Denied => Err(GuardError::Denied),
            Verdict::Unreachable(err) => Err(GuardError::Unreachable(err)),
        }
    }
}

/// Guard rejection, rendered as a JSON [`AuthErrorResponse`]
#[derive(Debug)]
pub enum GuardError {
    MissingToken,
    MissingProfile,
    Denied,
    Unreachable(ClientError),
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            GuardError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                AuthErrorResponse::new("missing_token", "Authorization header with a token is required"),
            ),
            GuardError::MissingProfile => (
                StatusCode::BAD_REQUEST,
                AuthErrorResponse::new(
                    "missing_service_profile",
                    "ServiceProfile header must be '<profile> <action>'",
                ),
            ),
            GuardError::Denied => (
                StatusCode::UNAUTHORIZED,
                AuthErrorResponse::new("denied", "Session or action not authorized"),
            ),
            GuardError::Unreachable(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                AuthErrorResponse::new("authority_unavailable", err.diagnostic()),
            ),
        };

        (status, Json(body)).into_response()
    }
}
