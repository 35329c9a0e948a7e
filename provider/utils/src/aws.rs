use crate::config::ProviderConfig;
use crate::constants::{DEFAULT_ASSUME_ROLE_SESSION_DURATION, SESSION_NAME};
use aws_config::default_provider::credentials::default_provider;
use aws_config::sts::AssumeRoleProvider;
use aws_config::retry::RetryConfig;
use aws_sdk_sts::Region;
use aws_smithy_types::retry::RetryMode;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_types::SdkConfig;
use log::info;
use std::time::Duration;

/// Set up the shared SDK config for every service client: region, adaptive retries with the
/// configured number of attempts, static credentials if provided (the default chain otherwise),
/// and `sts::assume_role` if a role ARN is provided.
pub async fn aws_config(config: &ProviderConfig) -> SdkConfig {
    let region = config.region().to_string();
    info!(
        "Creating a custom region provider for '{}' to be used in the aws config.",
        region
    );

    let mut config_loader = aws_config::from_env().retry_config(
        RetryConfig::standard()
            .with_retry_mode(RetryMode::Adaptive)
            .with_max_attempts(config.max_attempts()),
    );
    let base_provider = match &config.credentials {
        Some(credentials) => SharedCredentialsProvider::new(Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            credentials.session_token.clone(),
            None,
            "provider_config",
        )),
        None => SharedCredentialsProvider::new(default_provider().await),
    };

    config_loader = match &config.assume_role {
        Some(assume_role) => {
            info!("Assuming role '{}'", assume_role.role_arn);
            config_loader.credentials_provider(SharedCredentialsProvider::new(
                AssumeRoleProvider::builder(&assume_role.role_arn)
                    .region(Region::new(region.clone()))
                    .session_name(
                        assume_role
                            .session_name
                            .clone()
                            .unwrap_or_else(|| SESSION_NAME.to_string()),
                    )
                    .session_length(Duration::from_secs(
                        assume_role
                            .duration_seconds
                            .unwrap_or(DEFAULT_ASSUME_ROLE_SESSION_DURATION)
                            as u64,
                    ))
                    .build(base_provider.clone()),
            ))
        }
        None => config_loader.credentials_provider(base_provider),
    };

    config_loader.region(Region::new(region)).load().await
}
