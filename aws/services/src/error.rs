use aws_sdk_sts::types::SdkError;
use aws_smithy_types::retry::ProvideErrorKind;
use resource_adapter::{ErrorKind, ProviderError};
use snafu::Snafu;
use std::fmt::Debug;

/// Errors that occur while setting up the service clients.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unable to get the caller identity: {}", source))]
    CallerIdentity { source: ProviderError },

    #[snafu(display("The caller identity has no {}", what))]
    MissingIdentity { what: &'static str },

    #[snafu(display("Unable to parse the caller identity ARN '{}'", arn))]
    IdentityArn { arn: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Classify a failed SDK call. `not_found` recognizes the service's error codes for an object
/// that does not exist; retryable errors that survived the client's retries are transient and
/// anything else is an API error.
pub(crate) fn sdk_error<E, R, S>(
    error: SdkError<E, R>,
    not_found: fn(&E) -> bool,
    context: S,
) -> ProviderError
where
    E: std::error::Error + ProvideErrorKind + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
    S: Into<String>,
{
    let kind = match &error {
        SdkError::ServiceError(service_error) if not_found(service_error.err()) => {
            ErrorKind::NotFound
        }
        SdkError::ServiceError(service_error)
            if service_error.err().retryable_error_kind().is_some() =>
        {
            ErrorKind::Transient
        }
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => ErrorKind::Transient,
        _ => ErrorKind::Api,
    };
    ProviderError::new_with_source_and_context(kind, context, error)
}

/// For calls where no error code means the object is missing.
pub(crate) fn never<E>(_: &E) -> bool {
    false
}
