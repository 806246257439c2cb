//! Shared API request/response types
//!
//! Types exchanged with the directory service and the session authority,
//! plus the small value types handlers pass into library calls.

use serde::{Deserialize, Serialize};
use std::fmt;

// ========================================
// Configuration Types
// ========================================

/// Route prefix of the service embedding this library
///
/// Only used to label log lines with the route of the calling handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Path prefix, e.g. `/patients`
    pub prefix: String,
    /// API version segment, e.g. `/v1/`
    pub version: String,
    /// Sub-path appended after the version
    pub api_path: String,
}

impl ApiConfig {
    /// Route label for a handler: prefix + version + function
    ///
    /// # Examples
    ///
    /// ```
    /// use techno_common::ApiConfig;
    ///
    /// let api = ApiConfig {
    ///     prefix: "/patients".to_string(),
    ///     version: "/v1/".to_string(),
    ///     api_path: String::new(),
    /// };
    /// assert_eq!(api.route("getPatient"), "/patients/v1/getPatient");
    /// ```
    pub fn route(&self, function: &str) -> String {
        format!("{}{}{}", self.prefix, self.version, function)
    }
}

/// Process-wide secret identifying the calling service to the authority
///
/// Debug output never shows the value.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret, for building authority URLs only
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("SharedSecret(<unset>)")
        } else {
            f.write_str("SharedSecret(***)")
        }
    }
}

// ========================================
// Directory Types
// ========================================

/// Location of a logical service as reported by the directory
///
/// Every field is optional on the wire and defaults to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolveTarget {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub prefix: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Sub-path under the version (`api` on the wire)
    #[serde(rename = "api", skip_serializing_if = "String::is_empty")]
    pub api_path: String,
}

impl ResolveTarget {
    /// host + prefix + version
    pub fn root_url(&self) -> String {
        format!("{}{}{}", self.host, self.prefix, self.version)
    }

    /// host + prefix + version + api path; authority paths are appended to this
    pub fn base_url(&self) -> String {
        format!("{}{}", self.root_url(), self.api_path)
    }

    /// True when the directory returned nothing usable
    pub fn is_empty(&self) -> bool {
        self.host.is_empty()
            && self.prefix.is_empty()
            && self.version.is_empty()
            && self.api_path.is_empty()
    }
}

// ========================================
// Authority Types
// ========================================

/// Capability a caller claims (`profile`) and the action it wants to perform
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceProfile {
    pub profile: String,
    pub action: String,
}

impl ServiceProfile {
    pub fn new(profile: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            action: action.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.profile.is_empty() && self.action.is_empty()
    }
}

/// `{"result": bool}` wrapper used by the enveloped session check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionEnvelope {
    pub result: bool,
}

// ========================================
// Call Context
// ========================================

/// Diagnostics carried into every outbound call
///
/// Names the handler that triggered the call so failures can be attributed
/// in logs. Library calls never touch the handler's response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub function: String,
}

impl CallContext {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
        }
    }
}

// ========================================
// Error Response Types
// ========================================

/// JSON error body returned by the request guards
#[derive(Debug, Clone, Serialize)]
pub struct AuthErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

impl AuthErrorResponse {
    /// Create new auth error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

// ========================================
// Tests
// ========================================
