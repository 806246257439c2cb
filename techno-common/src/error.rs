//! Common error types for techno services

use std::fmt;
use thiserror::Error;

/// Common result type for techno operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across techno services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML configuration could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Outbound call to the directory or the session authority failed
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Outbound call kinds, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    /// `hostPrefixVersion` lookup on the directory service
    Resolve,
    /// `checkSessionByToken` on the session authority
    CheckSession,
    /// `serviceCheckSessionByToken` on the session authority
    ServiceCheckSession,
    /// `serviceValidateAction` on the session authority
    ValidateAction,
}

impl Call {
    /// Subject named in the diagnostic body returned to HTTP callers
    fn subject(self) -> &'static str {
        match self {
            Call::Resolve => "host+prefix+version",
            // Both session checks share the same caller-facing wording
            Call::CheckSession | Call::ServiceCheckSession => "checkSessionByToken",
            Call::ValidateAction => "serviceValidateAction",
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Call::Resolve => "hostPrefixVersion",
            Call::CheckSession => "checkSessionByToken",
            Call::ServiceCheckSession => "serviceCheckSessionByToken",
            Call::ValidateAction => "serviceValidateAction",
        };
        f.write_str(name)
    }
}

/// Failure of an outbound call
///
/// Transport covers everything that prevented a usable response (connect,
/// DNS, non-success status). Decode covers a response whose body did not
/// have the expected shape.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The call could not be completed
    #[error("{call} request failed: {source}")]
    Transport {
        call: Call,
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be decoded
    #[error("{call} response could not be decoded: {source}")]
    Decode {
        call: Call,
        #[source]
        source: reqwest::Error,
    },

    /// The request URL could not be built
    #[error("{call} request URL is invalid: {reason}")]
    InvalidUrl { call: Call, reason: String },

    /// A header value could not be built from the given input
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl ClientError {
    /// Which outbound call failed, if any
    pub fn call(&self) -> Option<Call> {
        match self {
            ClientError::Transport { call, .. }
            | ClientError::Decode { call, .. }
            | ClientError::InvalidUrl { call, .. } => Some(*call),
            ClientError::InvalidHeader(_) => None,
        }
    }

    /// Short fixed diagnostic suitable for an HTTP 500 body
    ///
    /// Never contains tokens, secrets or upstream error text.
    pub fn diagnostic(&self) -> String {
        match self {
            ClientError::Transport { call, .. } | ClientError::InvalidUrl { call, .. } => {
                format!("Error getting {}", call.subject())
            }
            ClientError::Decode { call, .. } => format!("Error decoding {}", call.subject()),
            ClientError::InvalidHeader(_) => "Error building request headers".to_string(),
        }
    }
}
