//! `models:/` and `runs:/` URIs.

use std::fmt;
use std::str::FromStr;

use super::error::RegistryError;

const MODELS_SCHEME: &str = "models:/";
const RUNS_SCHEME: &str = "runs:/";

/// Version selector of a registered model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSpec {
    Latest,
    Number(u32),
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Latest => write!(f, "latest"),
            VersionSpec::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Address of a loadable pipeline artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelUri {
    /// `models:/<name>/<version|latest>`
    Registered { name: String, version: VersionSpec },
    /// `runs:/<run_id>/<artifact>`
    Run { run_id: String, artifact: String },
}

impl ModelUri {
    pub fn latest(name: impl Into<String>) -> Self {
        ModelUri::Registered {
            name: name.into(),
            version: VersionSpec::Latest,
        }
    }

    pub fn run(run_id: impl Into<String>, artifact: impl Into<String>) -> Self {
        ModelUri::Run {
            run_id: run_id.into(),
            artifact: artifact.into(),
        }
    }
}

impl FromStr for ModelUri {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RegistryError::InvalidUri(s.to_string());

        let (scheme, rest) = if let Some(rest) = s.strip_prefix(MODELS_SCHEME) {
            (MODELS_SCHEME, rest)
        } else if let Some(rest) = s.strip_prefix(RUNS_SCHEME) {
            (RUNS_SCHEME, rest)
        } else {
            return Err(invalid());
        };

        let (head, tail) = rest.split_once('/').ok_or_else(invalid)?;
        if head.is_empty() || tail.is_empty() || tail.contains('/') {
            return Err(invalid());
        }

        if scheme == RUNS_SCHEME {
            return Ok(ModelUri::run(head, tail));
        }

        let version = if tail.eq_ignore_ascii_case("latest") {
            VersionSpec::Latest
        } else {
            match tail.parse::<u32>() {
                Ok(n) if n > 0 => VersionSpec::Number(n),
                _ => return Err(invalid()),
            }
        };
        Ok(ModelUri::Registered {
            name: head.to_string(),
            version,
        })
    }
}

impl fmt::Display for ModelUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelUri::Registered { name, version } => write!(f, "{}{}/{}", MODELS_SCHEME, name, version),
            ModelUri::Run { run_id, artifact } => write!(f, "{}{}/{}", RUNS_SCHEME, run_id, artifact),
        }
    }
}
