//! Token and service-profile validation against the session authority
//!
//! # Calls
//!
//! - `checkSessionByToken/{token}`: end-user session check. The response
//!   contract is fixed per deployment by [`SessionContract`]:
//!   `RawBool` is a GET answered with a bare boolean, `Envelope` is a POST
//!   with an empty body answered with `{"result": bool}`.
//! - `serviceCheckSessionByToken/{secret}/{token}` then
//!   `serviceValidateAction/{secret}/{profile}/{action}`: service check,
//!   both GET, both answered with a bare boolean. The second call is only
//!   made when the first one answers `true`.
//!
//! Tokens, secrets, profiles and actions are each sent as one
//! percent-encoded path segment.
//!
//! Every outcome is a [`Verdict`], which keeps "the authority said no" apart
//! from "the authority could not be asked".

use crate::api::types::{
    ApiConfig, CallContext, ResolveTarget, ServiceProfile, SessionEnvelope, SharedSecret,
};
use crate::client::{endpoint_url, fetch_json};
use crate::config::SessionContract;
use crate::error::{Call, ClientError};

pub const CHECK_SESSION_BY_TOKEN: &str = "checkSessionByToken";
pub const SERVICE_CHECK_SESSION_BY_TOKEN: &str = "serviceCheckSessionByToken";
pub const SERVICE_VALIDATE_ACTION: &str = "serviceValidateAction";

/// Outcome of a validation
#[derive(Debug)]
pub enum Verdict {
    /// The authority accepted the request
    Allowed,
    /// The authority rejected the request
    Denied,
    /// The authority could not be asked or its answer was unreadable
    Unreachable(ClientError),
}

impl Verdict {
    /// Only `Allowed` grants access; `Unreachable` must be treated as a denial
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Verdict::Denied)
    }

    /// Failure behind an `Unreachable` verdict
    pub fn error(&self) -> Option<&ClientError> {
        match self {
            Verdict::Unreachable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<bool> for Verdict {
    fn from(allowed: bool) -> Self {
        if allowed {
            Verdict::Allowed
        } else {
            Verdict::Denied
        }
    }
}

impl From<Result<bool, ClientError>> for Verdict {
    fn from(result: Result<bool, ClientError>) -> Self {
        match result {
            Ok(allowed) => Verdict::from(allowed),
            Err(err) => Verdict::Unreachable(err),
        }
    }
}

/// Session authority client
#[derive(Debug, Clone)]
pub struct Validator {
    http_client: reqwest::Client,
    contract: SessionContract,
    api: ApiConfig,
}

impl Validator {
    pub fn new(http_client: reqwest::Client, contract: SessionContract, api: ApiConfig) -> Self {
        Self {
            http_client,
            contract,
            api,
        }
    }

    pub fn contract(&self) -> SessionContract {
        self.contract
    }

    /// Check an end-user session token
    pub async fn validate_token(
        &self,
        ctx: &CallContext,
        target: &ResolveTarget,
        token: &str,
    ) -> Verdict {
        tracing::debug!(
            route = %self.api.route(&ctx.function),
            authority = %target.host,
            contract = ?self.contract,
            "Checking session token"
        );

        let url = match endpoint_url(
            Call::CheckSession,
            &target.base_url(),
            &[CHECK_SESSION_BY_TOKEN, token],
        ) {
            Ok(url) => url,
            Err(err) => return self.settle(ctx, Err(err)),
        };

        let result = match self.contract {
            SessionContract::RawBool => {
                fetch_json::<bool>(Call::CheckSession, self.http_client.get(url)).await
            }
            SessionContract::Envelope => fetch_json::<SessionEnvelope>(
                Call::CheckSession,
                self.http_client.post(url).body(""),
            )
            .await
            .map(|envelope| envelope.result),
        };

        self.settle(ctx, result)
    }

    /// Check a token on behalf of a calling service, then the action it wants
    ///
    /// Stops after the first call unless it answered `true`.
    pub async fn validate_token_for_service(
        &self,
        ctx: &CallContext,
        target: &ResolveTarget,
        secret: &SharedSecret,
        token: &str,
        profile: &ServiceProfile,
    ) -> Verdict {
        let base = target.base_url();
        let route = self.api.route(&ctx.function);

        tracing::debug!(
            route = %route,
            authority = %target.host,
            profile = %profile.profile,
            action = %profile.action,
            "Checking service session"
        );

        let session = match endpoint_url(
            Call::ServiceCheckSession,
            &base,
            &[SERVICE_CHECK_SESSION_BY_TOKEN, secret.expose(), token],
        ) {
            Ok(url) => {
                fetch_json::<bool>(Call::ServiceCheckSession, self.http_client.get(url)).await
            }
            Err(err) => Err(err),
        };

        match session {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(route = %route, "Service session rejected");
                return Verdict::Denied;
            }
            Err(err) => return self.settle(ctx, Err(err)),
        }

        let action = match endpoint_url(
            Call::ValidateAction,
            &base,
            &[
                SERVICE_VALIDATE_ACTION,
                secret.expose(),
                &profile.profile,
                &profile.action,
            ],
        ) {
            Ok(url) => fetch_json::<bool>(Call::ValidateAction, self.http_client.get(url)).await,
            Err(err) => Err(err),
        };

        self.settle(ctx, action)
    }

    /// Turn a call result into a verdict, logging failures and denials
    fn settle(&self, ctx: &CallContext, result: Result<bool, ClientError>) -> Verdict {
        let verdict = Verdict::from(result);
        match &verdict {
            Verdict::Allowed => {}
            Verdict::Denied => {
                tracing::info!(route = %self.api.route(&ctx.function), "Validation denied");
            }
            Verdict::Unreachable(err) => {
                tracing::error!(
                    route = %self.api.route(&ctx.function),
                    error = %err,
                    "{}",
                    err.diagnostic()
                );
            }
        }
        verdict
    }
}
