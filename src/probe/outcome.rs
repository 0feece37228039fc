use crate::{
    config::ConfigError,
    descriptor::{ConnectionDescriptor, DisplayDescriptor},
};
use serde::{Serialize, Serializer};
use std::fmt;

/// Failure taxonomy reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    None,
    DriverMissing,
    InvalidDescriptor,
    ConnectionFailed,
    QueryFailed,
    Unknown,
    ConfigurationError,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::DriverMissing => "DriverMissing",
            Self::InvalidDescriptor => "InvalidDescriptor",
            Self::ConnectionFailed => "ConnectionFailed",
            Self::QueryFailed => "QueryFailed",
            Self::Unknown => "Unknown",
            Self::ConfigurationError => "ConfigurationError",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a classifier rule decided about a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub message: String,
    pub hint: Option<String>,
    pub code: Option<String>,
}

/// Result of one liveness attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub ok: bool,
    pub category: Category,
    pub message: String,
    pub details: Option<DisplayDescriptor>,
    pub hint: Option<String>,
    pub code: Option<String>,
}

impl ProbeOutcome {
    #[must_use]
    pub fn healthy(descriptor: &ConnectionDescriptor) -> Self {
        Self {
            ok: true,
            category: Category::None,
            message: format!("{} responded to SELECT 1", descriptor.kind),
            details: Some(descriptor.display()),
            hint: None,
            code: None,
        }
    }

    #[must_use]
    pub fn failed(classification: Classification, descriptor: &ConnectionDescriptor) -> Self {
        Self {
            ok: false,
            category: classification.category,
            message: classification.message,
            details: Some(descriptor.display()),
            hint: classification.hint,
            code: classification.code,
        }
    }

    /// Outcome for a configuration that could not be resolved, no descriptor exists yet
    #[must_use]
    pub fn misconfigured(err: &ConfigError) -> Self {
        Self {
            ok: false,
            category: Category::ConfigurationError,
            message: err.to_string(),
            details: None,
            hint: Some(err.hint().to_string()),
            code: None,
        }
    }

    /// Pretty printed JSON with sorted keys
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        // serde_json::Value keeps object keys in a BTreeMap
        serde_json::to_string_pretty(&serde_json::to_value(self)?)
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a DisplayDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
}

impl Serialize for ProbeOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Payload {
            status: self.ok.then_some("ok"),
            error: (!self.ok).then_some(self.category.as_str()),
            message: &self.message,
            details: self.details.as_ref(),
            hint: self.hint.as_deref(),
            code: self.code.as_deref(),
        }
        .serialize(serializer)
    }
}
