//! Diagnostic logging gate.
//!
//! Errors are logged only in development, and only by their `Display`
//! message. `Debug` output and `source()` chains can carry URLs, headers or
//! backend internals, so they never reach the log.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

static DIAGNOSTICS: AtomicBool = AtomicBool::new(false);

/// Deployment mode of the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Development,
    #[default]
    Production,
}

impl RunMode {
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Default `tracing` directive for this mode when `RUST_LOG` is unset.
    #[must_use]
    pub const fn default_directive(self) -> &'static str {
        match self {
            Self::Development => "atelier_client=debug,atelier_cli=debug,info",
            Self::Production => "off",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown mode '{other}' (expected development or production)")),
        }
    }
}

/// Enable or disable error diagnostics for the whole process.
pub fn set_mode(mode: RunMode) {
    DIAGNOSTICS.store(mode.is_development(), Ordering::Relaxed);
}

/// Whether error diagnostics are currently emitted.
#[must_use]
pub fn diagnostics_enabled() -> bool {
    DIAGNOSTICS.load(Ordering::Relaxed)
}

/// The loggable form of an error: its `Display` message and nothing else.
#[must_use]
pub fn sanitized(err: &(dyn std::error::Error + 'static)) -> String {
    err.to_string()
}

/// Log a failure the user does not need to see.
///
/// No-op outside development.
pub fn diagnostic(context: &str, err: &(dyn std::error::Error + 'static)) {
    if diagnostics_enabled() {
        tracing::warn!(error = %sanitized(err), "{context}");
    }
}
