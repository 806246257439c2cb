//! Service location lookup against the directory
//!
//! `GET {directory root}hostPrefixVersion/{service}[/{region}]` returns where a
//! logical service lives. The decoded [`ResolveTarget`] is what every
//! [`Validator`](crate::Validator) call is built from.

use reqwest::Url;

use crate::api::types::{ApiConfig, CallContext, ResolveTarget};
use crate::client::{endpoint_url, fetch_json};
use crate::error::{Call, ClientError};

/// Directory path segment preceding the service name
pub const HOST_PREFIX_VERSION: &str = "hostPrefixVersion";

/// Service name of the login/session authority
pub const LOGIN_SERVICE: &str = "loginEmp";

/// Directory client
#[derive(Debug, Clone)]
pub struct Resolver {
    http_client: reqwest::Client,
    directory: ResolveTarget,
    api: ApiConfig,
}

impl Resolver {
    /// Create a resolver for the directory located at `directory`
    pub fn new(http_client: reqwest::Client, directory: ResolveTarget, api: ApiConfig) -> Self {
        Self {
            http_client,
            directory,
            api,
        }
    }

    /// Directory location this resolver queries
    pub fn directory(&self) -> &ResolveTarget {
        &self.directory
    }

    /// Lookup URL for `service`, with `/region` appended when given
    ///
    /// # Examples
    ///
    /// ```
    /// use techno_common::{ApiConfig, ResolveTarget, Resolver};
    ///
    /// let directory = ResolveTarget {
    ///     host: "http://dir".to_string(),
    ///     prefix: "/img".to_string(),
    ///     version: "/v1/".to_string(),
    ///     ..Default::default()
    /// };
    /// let resolver = Resolver::new(reqwest::Client::new(), directory, ApiConfig::default());
    ///
    /// let url = resolver.lookup_url("loginEmp", Some("eu")).unwrap();
    /// assert_eq!(url.as_str(), "http://dir/img/v1/hostPrefixVersion/loginEmp/eu");
    /// ```
    pub fn lookup_url(&self, service: &str, region: Option<&str>) -> Result<Url, ClientError> {
        let mut segments = vec![HOST_PREFIX_VERSION, service];
        if let Some(region) = region.filter(|r| !r.is_empty()) {
            segments.push(region);
        }
        endpoint_url(Call::Resolve, &self.directory.root_url(), &segments)
    }

    /// Look up where `service` lives
    ///
    /// Single attempt. Failures are logged against the calling handler's
    /// route and returned; the caller decides what to answer.
    pub async fn resolve(
        &self,
        ctx: &CallContext,
        service: &str,
        region: Option<&str>,
    ) -> Result<ResolveTarget, ClientError> {
        let result = match self.lookup_url(service, region) {
            Ok(url) => {
                tracing::debug!(
                    route = %self.api.route(&ctx.function),
                    service = %service,
                    region = region.unwrap_or(""),
                    url = %url,
                    "Resolving service location"
                );
                fetch_json::<ResolveTarget>(Call::Resolve, self.http_client.get(url)).await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(target) => {
                if target.host.is_empty() {
                    tracing::warn!(service = %service, "Directory returned no host");
                }
                Ok(target)
            }
            Err(err) => {
                tracing::error!(
                    route = %self.api.route(&ctx.function),
                    service = %service,
                    error = %err,
                    "Cannot resolve {}",
                    HOST_PREFIX_VERSION
                );
                Err(err)
            }
        }
    }

    /// Look up the login/session authority
    pub async fn resolve_login(
        &self,
        ctx: &CallContext,
        region: Option<&str>,
    ) -> Result<ResolveTarget, ClientError> {
        self.resolve(ctx, LOGIN_SERVICE, region).await
    }
}
