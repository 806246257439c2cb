//! Resolver, Validator and shared secret bundled for request handlers
//!
//! Built once from [`TechnoConfig`] and cloned into handlers. Every check
//! resolves the session authority first, then validates against it.

use crate::api::types::{CallContext, ResolveTarget, ServiceProfile, SharedSecret};
use crate::client::build_http_client;
use crate::config::TechnoConfig;
use crate::error::{ClientError, Result};
use crate::resolver::Resolver;
use crate::validator::{Validator, Verdict};

#[derive(Debug, Clone)]
pub struct ServiceAccess {
    resolver: Resolver,
    validator: Validator,
    secret: SharedSecret,
    authority_service: String,
    region: Option<String>,
}

impl ServiceAccess {
    /// Build from validated configuration with a fresh HTTP client
    pub fn from_config(config: &TechnoConfig) -> Result<Self> {
        config.validate()?;
        let http_client = build_http_client()?;
        Ok(Self::with_client(config, http_client))
    }

    /// Build around an existing HTTP client
    pub fn with_client(config: &TechnoConfig, http_client: reqwest::Client) -> Self {
        Self {
            resolver: Resolver::new(
                http_client.clone(),
                config.directory.clone(),
                config.api.clone(),
            ),
            validator: Validator::new(http_client, config.session_contract, config.api.clone()),
            secret: config.secret.clone(),
            authority_service: config.authority_service.clone(),
            region: config.region().map(str::to_string),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Locate the session authority in the configured region
    pub async fn resolve_authority(
        &self,
        ctx: &CallContext,
    ) -> std::result::Result<ResolveTarget, ClientError> {
        self.resolver
            .resolve(ctx, &self.authority_service, self.region.as_deref())
            .await
    }

    /// Resolve the authority, then check an end-user token
    pub async fn check_session(&self, ctx: &CallContext, token: &str) -> Verdict {
        match self.resolve_authority(ctx).await {
            Ok(target) => self.validator.validate_token(ctx, &target, token).await,
            Err(err) => Verdict::Unreachable(err),
        }
    }

    /// Resolve the authority, then check a token and action for a calling service
    ///
    /// Denied without any outbound call when no shared secret is configured.
    pub async fn check_service(
        &self,
        ctx: &CallContext,
        token: &str,
        profile: &ServiceProfile,
    ) -> Verdict {
        if self.secret.is_empty() {
            tracing::warn!(
                function = %ctx.function,
                "Shared secret is not set, denying service validation"
            );
            return Verdict::Denied;
        }

        match self.resolve_authority(ctx).await {
            Ok(target) => {
                self.validator
                    .validate_token_for_service(ctx, &target, &self.secret, token, profile)
                    .await
            }
            Err(err) => Verdict::Unreachable(err),
        }
    }
}
