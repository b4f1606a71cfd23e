//! Retrieval tool adapters
//!
//! Every external data source sits behind the [`Tool`] trait. An adapter
//! never lets a provider error cross its boundary: every failure mode is
//! converted into a [`ToolOutcome::Refused`] value carrying a category
//! tag, so callers only ever see values.

pub mod places;
pub mod registry;
pub mod search;
pub mod weather;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Tool parameter schema definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub param_type: String,
    pub description: String,
    pub required: bool,
}

/// Tool metadata - describes what the tool does and how to call it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl fmt::Display for ToolMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

/// Provider-side failure, classified at the adapter boundary.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("authentication rejected")]
    Auth,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("empty result set")]
    Empty,
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Category tag attached to the user-facing refusal.
    pub fn tag(&self) -> &'static str {
        match self {
            ProviderError::Timeout => "timeout",
            ProviderError::Connection(_) => "connection",
            ProviderError::Auth => "auth",
            ProviderError::NotFound(_) => "not_found",
            ProviderError::Empty => "empty",
            ProviderError::Other(_) => "unknown",
        }
    }

    /// Classify a transport-level reqwest failure.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_connect() {
            ProviderError::Connection(err.to_string())
        } else {
            ProviderError::Other(err.to_string())
        }
    }
}

/// Why a tool declined to produce content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefusalKind {
    /// Invalid or missing argument (location, day-count).
    Validation,
    /// Out-of-topic or out-of-region request.
    Scope,
    /// Provider failure, tagged with its category.
    Provider(&'static str),
}

/// A value-typed refusal: human-readable text plus a machine category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refusal {
    pub kind: RefusalKind,
    pub message: String,
}

/// Outcome of a tool call. Always a value, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Content(String),
    Refused(Refusal),
}

impl ToolOutcome {
    pub fn content(text: impl Into<String>) -> Self {
        ToolOutcome::Content(text.into())
    }

    pub fn validation_refusal(message: impl Into<String>) -> Self {
        ToolOutcome::Refused(Refusal {
            kind: RefusalKind::Validation,
            message: message.into(),
        })
    }

    pub fn scope_refusal(message: impl Into<String>) -> Self {
        ToolOutcome::Refused(Refusal {
            kind: RefusalKind::Scope,
            message: message.into(),
        })
    }

    pub fn provider_refusal(error: &ProviderError, message: impl Into<String>) -> Self {
        ToolOutcome::Refused(Refusal {
            kind: RefusalKind::Provider(error.tag()),
            message: message.into(),
        })
    }

    pub fn is_refusal(&self) -> bool {
        matches!(self, ToolOutcome::Refused(_))
    }

    /// Text presented to the user, for content and refusals alike.
    pub fn text(&self) -> &str {
        match self {
            ToolOutcome::Content(text) => text,
            ToolOutcome::Refused(refusal) => &refusal.message,
        }
    }
}

/// A single planned adapter invocation: created by a handler's tool
/// selection, consumed once, discarded.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub tool: String,
    pub args: Value,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, args: Value) -> Self {
        Self {
            tool: tool.into(),
            args,
        }
    }
}

/// Uniform call contract for all retrieval adapters.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool metadata (name, description, parameters).
    fn metadata(&self) -> ToolMetadata;

    /// Invoke the tool. Provider failures come back as refusal values.
    async fn call(&self, args: Value) -> ToolOutcome;
}
