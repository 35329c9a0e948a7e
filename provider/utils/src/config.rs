/*!

The provider configuration: which region and account to act in, how to authenticate, how many times
to retry, where to send each service's requests, and the default tags applied to every tagged
resource.

It is read from a YAML file and then overridden by `AWS_PROVIDER_*` environment variables.

```yaml
region: eu-west-1
assumeRole:
  roleArn: arn:aws:iam::123456789012:role/provider
maxAttempts: 5
endpoints:
  appmesh: http://localhost:4566
defaultTags:
  team: networking
```

!*/

use crate::constants::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_REGION, ENV_ASSUME_ROLE, ENV_MAX_ATTEMPTS, ENV_REGION,
};
use crate::error::{self, Result};
use provider_model::Tags;
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, ResultExt};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// A role to assume for every API call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assume_role: Option<AssumeRoleConfig>,

    /// Static credentials. When absent the default credential chain is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<StaticCredentials>,

    /// The maximum number of attempts the SDK makes for a retryable error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Endpoint URL overrides by service package name, e.g. `elasticache`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<String, String>,

    /// Tags merged underneath the tags of every resource that supports them.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_tags: Tags,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssumeRoleConfig {
    pub role_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i32>,
}

#[derive(Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

// Keep secrets out of logs.
impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

impl ProviderConfig {
    /// Read the configuration file at `path` and apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let path = path.as_ref();
                let yaml = std::fs::read_to_string(path).context(error::ReadConfigSnafu {
                    path: path.display().to_string(),
                })?;
                Self::from_yaml(&yaml)?
            }
            None => Self::default(),
        };
        config.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context(error::ParseConfigSnafu)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the `AWS_PROVIDER_*` overrides, looking each variable up with `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(region) = lookup(ENV_REGION) {
            self.region = Some(region);
        }
        if let Some(role_arn) = lookup(ENV_ASSUME_ROLE) {
            let assume_role = self.assume_role.get_or_insert_with(Default::default);
            assume_role.role_arn = role_arn;
        }
        if let Some(value) = lookup(ENV_MAX_ATTEMPTS) {
            let max_attempts = value.parse().ok().context(error::EnvValueSnafu {
                name: ENV_MAX_ATTEMPTS,
                value: value.clone(),
            })?;
            self.max_attempts = Some(max_attempts);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }

    pub fn endpoint(&self, service: &str) -> Option<&str> {
        self.endpoints.get(service).map(String::as_str)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.max_attempts != Some(0),
            error::InvalidConfigSnafu {
                message: "maxAttempts must be at least 1"
            }
        );
        if let Some(assume_role) = &self.assume_role {
            ensure!(
                !assume_role.role_arn.is_empty(),
                error::InvalidConfigSnafu {
                    message: "assumeRole.roleArn must not be empty"
                }
            );
        }
        if let Some(region) = &self.region {
            ensure!(
                !region.is_empty(),
                error::InvalidConfigSnafu {
                    message: "region must not be empty"
                }
            );
        }
        Ok(())
    }
}
