//! Deployment environments and the storage bucket each one syncs to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Bucket shared by the `main` and `demo` environments.
pub const DEFAULT_SHARED_BUCKET: &str = "nexus-deployments";

/// Bucket used by the `staging` environment.
pub const DEFAULT_STAGING_BUCKET: &str = "nexus-deployments-staging";

/// A deployment tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Primary environment.
    Main,
    /// Demo environment, shares its bucket with [`Environment::Main`].
    Demo,
    /// Staging environment with its own bucket.
    Staging,
    /// Production. A valid environment, but never synced to the registry.
    Production,
}

impl Environment {
    /// All recognised environments.
    pub const ALL: &[Self] = &[Self::Main, Self::Demo, Self::Staging, Self::Production];

    /// Returns the literal used on the command line and in storage paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Demo => "demo",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|e| e.as_str() == s)
            .copied()
            .ok_or_else(|| Error::InvalidEnvironment(s.to_owned()))
    }
}

/// Returns `true` only for the four recognised environment literals.
#[must_use]
pub fn validate_environment(environment: &str) -> bool {
    environment.parse::<Environment>().is_ok()
}

/// Environment to bucket mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Buckets {
    /// Bucket for `main` and `demo`.
    pub shared: String,
    /// Bucket for `staging`.
    pub staging: String,
}

impl Default for Buckets {
    fn default() -> Self {
        Self {
            shared: DEFAULT_SHARED_BUCKET.to_owned(),
            staging: DEFAULT_STAGING_BUCKET.to_owned(),
        }
    }
}

impl Buckets {
    /// Returns the bucket `environment` syncs to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedEnvironment`] for `production`, which is
    /// never synced.
    pub fn bucket_for(&self, environment: Environment) -> Result<&str, Error> {
        match environment {
            Environment::Main | Environment::Demo => Ok(&self.shared),
            Environment::Staging => Ok(&self.staging),
            Environment::Production => Err(Error::UnsupportedEnvironment(
                environment.as_str().to_owned(),
            )),
        }
    }

    /// Like [`Buckets::bucket_for`], but takes the raw environment literal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedEnvironment`] for `production` and for any
    /// unrecognised value.
    pub fn bucket_for_name(&self, environment: &str) -> Result<&str, Error> {
        let parsed = environment
            .parse::<Environment>()
            .map_err(|_| Error::UnsupportedEnvironment(environment.to_owned()))?;
        self.bucket_for(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_exactly_four_environments() {
        for env in ["main", "demo", "staging", "production"] {
            assert!(validate_environment(env), "{env}");
        }
        for env in ["", "Main", "prod", "dev", " main"] {
            assert!(!validate_environment(env), "{env:?}");
        }
    }

    #[test]
    fn main_and_demo_share_a_bucket() {
        let buckets = Buckets::default();
        let main = buckets.bucket_for_name("main").unwrap();
        let demo = buckets.bucket_for_name("demo").unwrap();
        let staging = buckets.bucket_for_name("staging").unwrap();
        assert_eq!(main, demo);
        assert_ne!(staging, main);
    }

    #[test]
    fn production_and_unknown_are_unsupported() {
        let buckets = Buckets::default();
        for env in ["production", "anything-else", ""] {
            assert!(
                matches!(
                    buckets.bucket_for_name(env),
                    Err(Error::UnsupportedEnvironment(got)) if got == env
                ),
                "{env:?}"
            );
        }
    }

    #[test]
    fn parse_round_trips_display() {
        for env in Environment::ALL {
            assert_eq!(env.to_string().parse::<Environment>().unwrap(), *env);
        }
    }
}
