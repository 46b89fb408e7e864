//! Deployment environment.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Variables consulted by [`Environment::from_env`], highest priority first.
const ENV_VARS: [&str; 3] = ["ENVIRONMENT", "APP_ENV", "RUST_ENV"];

/// Where the process is deployed.
///
/// Parsing never fails: unrecognised names land on `Development`, so a typo
/// can only make the service more verbose, never less.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "staging" | "stage" => Self::Staging,
            _ => Self::Development,
        })
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Environment {
    /// Read the first of `ENVIRONMENT`, `APP_ENV`, `RUST_ENV` that is set.
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_default()
    }

    /// Like [`from_env`](Self::from_env), but `None` when none is set.
    pub fn try_from_env() -> Option<Self> {
        ENV_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok())
            .and_then(|s| s.parse().ok())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}
