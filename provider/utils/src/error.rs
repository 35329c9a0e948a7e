use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Invalid value '{}' for environment variable '{}'", value, name))]
    EnvValue { name: String, value: String },

    #[snafu(display("Invalid provider configuration: {}", message))]
    InvalidConfig { message: String },

    #[snafu(display("Unable to parse provider configuration: {}", source))]
    ParseConfig { source: serde_yaml::Error },

    #[snafu(display("Unable to read provider configuration '{}': {}", path, source))]
    ReadConfig {
        path: String,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
