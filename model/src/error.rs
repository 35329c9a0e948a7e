use snafu::Snafu;

/// The public error type for the model crate. Every variant describes desired configuration or an
/// identifier that could not be accepted.
#[derive(Debug, Snafu)]
pub struct Error(OpaqueError);
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The attribute path that failed validation, if the error is tied to one.
    pub fn path(&self) -> Option<&str> {
        match &self.0 {
            OpaqueError::Invalid { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum OpaqueError {
    #[snafu(display("Error deserializing configuration: {}", source))]
    ConfigDeserialization { source: serde_json::Error },

    #[snafu(display("Error serializing configuration: {}", source))]
    ConfigSerialization { source: serde_json::Error },

    #[snafu(display(
        "Error serializing configuration: expected Value::Object type but got something else."
    ))]
    ConfigWrongValueType {},

    #[snafu(display("Unexpected format for ID '{}', expected '{}'", id, expected))]
    IdentifierParse { id: String, expected: String },

    #[snafu(display("Invalid value for '{}': {}", path, message))]
    Invalid { path: String, message: String },
}
