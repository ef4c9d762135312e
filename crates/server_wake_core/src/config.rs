use std::env::VarError;

use serde::Serialize;

pub const REGION_VAR: &str = "REGION";
pub const CLUSTER_VAR: &str = "CLUSTER";
pub const SERVICE_VAR: &str = "SERVICE";

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_CLUSTER: &str = "minecraft";
pub const DEFAULT_SERVICE: &str = "minecraft-server";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .variables.join(", "))]
    Missing { variables: Vec<&'static str> },
    #[error("{variable} is set but is not valid unicode")]
    NotUnicode { variable: &'static str },
}

/// The ECS service this process is allowed to wake.
///
/// Built once at cold start and handed to every invocation by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceIdentity {
    pub region: String,
    pub cluster: String,
    pub service: String,
}

impl ServiceIdentity {
    pub fn new(
        region: impl Into<String>,
        cluster: impl Into<String>,
        service: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let identity = Self {
            region: region.into().trim().to_string(),
            cluster: cluster.into().trim().to_string(),
            service: service.into().trim().to_string(),
        };

        let missing: Vec<&'static str> = [
            (REGION_VAR, &identity.region),
            (CLUSTER_VAR, &identity.cluster),
            (SERVICE_VAR, &identity.service),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(identity)
        } else {
            Err(ConfigError::Missing { variables: missing })
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Resolves each variable through `lookup`, substituting the built-in
    /// default only when the variable is unset. A variable set to an empty
    /// value is not defaulted and fails validation.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Result<String, VarError>,
    ) -> Result<Self, ConfigError> {
        let resolve = |variable: &'static str, default: &str| match lookup(variable) {
            Ok(value) => Ok(value),
            Err(VarError::NotPresent) => Ok(default.to_string()),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { variable }),
        };

        Self::new(
            resolve(REGION_VAR, DEFAULT_REGION)?,
            resolve(CLUSTER_VAR, DEFAULT_CLUSTER)?,
            resolve(SERVICE_VAR, DEFAULT_SERVICE)?,
        )
    }
}
