use log::LevelFilter;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_LEVEL_FILTER: LevelFilter = LevelFilter::Info;
pub const DEFAULT_ASSUME_ROLE_SESSION_DURATION: i32 = 3600;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 15;
pub const DEFAULT_PARTITION: &str = "aws";
pub const SESSION_NAME: &str = "aws-provider";

// Environment variables that override the provider configuration file.
pub const ENV_REGION: &str = "AWS_PROVIDER_REGION";
pub const ENV_ASSUME_ROLE: &str = "AWS_PROVIDER_ASSUME_ROLE";
pub const ENV_MAX_ATTEMPTS: &str = "AWS_PROVIDER_MAX_ATTEMPTS";
