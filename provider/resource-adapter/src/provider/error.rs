use std::fmt::{Display, Formatter};

/// What kind of failure a [`ProviderError`] represents. Callers branch on this, most importantly
/// to tell an object that no longer exists (`NotFound`) apart from every other failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The remote object does not exist. This is not fatal: the caller stops tracking the object.
    NotFound,

    /// The desired configuration is malformed or contradictory. Nothing was sent to the API.
    Validation,

    /// The change cannot be applied in place, e.g. an attribute that forces replacement was passed
    /// to an update.
    Conflict,

    /// The API kept failing with a retryable error (throttling, propagation delay) after the
    /// client exhausted its retries.
    Transient,

    /// The API rejected the request (permissions, quotas, bad input the API validates).
    Api,

    /// The caller cancelled the operation.
    Cancelled,

    /// State could not be converted between its typed and document forms.
    Internal,
}

impl ErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "The remote object does not exist",
            ErrorKind::Validation => "The desired configuration is invalid",
            ErrorKind::Conflict => "The change cannot be applied in place",
            ErrorKind::Transient => "The API did not succeed before retries were exhausted",
            ErrorKind::Api => "The API returned an error",
            ErrorKind::Cancelled => "The operation was cancelled",
            ErrorKind::Internal => "An internal error occurred",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.message(), f)
    }
}

/// The error type returned by resource adapters and the [`Lifecycle`](crate::Lifecycle).
#[derive(Debug)]
pub struct ProviderError {
    /// What kind of failure this is.
    kind: ErrorKind,

    /// Any message to be included with the error. This will be included in the formatted display
    /// before `inner`.
    context: Option<String>,

    /// The error that caused this error.
    inner: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,

    /// The identifier of a remote object that was created before the failure and still exists.
    /// The caller keeps tracking it so that a later apply can finish or delete it.
    remaining: Option<String>,
}

/// The result type returned by resource adapter operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

impl ProviderError {
    pub fn new_with_source_and_context<S, E>(kind: ErrorKind, context: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            kind,
            context: Some(context.into()),
            inner: Some(source.into()),
            remaining: None,
        }
    }

    pub fn new_with_source<E>(kind: ErrorKind, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            kind,
            context: None,
            inner: Some(source.into()),
            remaining: None,
        }
    }

    pub fn new_with_context<S>(kind: ErrorKind, context: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            kind,
            context: Some(context.into()),
            inner: None,
            remaining: None,
        }
    }

    /// Record that the remote object `id` was created before this error occurred.
    pub fn with_remaining<S>(mut self, id: S) -> Self
    where
        S: ToString,
    {
        self.remaining = Some(id.to_string());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn remaining(&self) -> Option<&str> {
        self.remaining.as_deref()
    }

    pub fn inner(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.inner.as_ref().map(|some| some.as_ref())
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind())?;
        if let Some(context) = self.context() {
            write!(f, ", {}", context)?;
        }
        if let Some(inner) = self.inner() {
            write!(f, ": {}", inner)?;
        }
        Ok(())
    }
}

// Make `ProviderError` function as a standard error.
impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// A trait that makes it possible to convert error types to `ProviderError` using a familiar
/// `context` function.
pub trait IntoProviderError<T> {
    /// Convert `self` into a `ProviderError`.
    fn context<S>(self, kind: ErrorKind, message: S) -> ProviderResult<T>
    where
        S: Into<String>;
}

// Implement `IntoProviderError` for all standard `Error + Send + Sync + 'static` types.
impl<T, E> IntoProviderError<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<S>(self, kind: ErrorKind, message: S) -> ProviderResult<T>
    where
        S: Into<String>,
    {
        self.map_err(|e| ProviderError::new_with_source_and_context(kind, message, e))
    }
}

// Implement `IntoProviderError` for options where `None` is converted into an error.
impl<T> IntoProviderError<T> for std::option::Option<T> {
    fn context<S>(self, kind: ErrorKind, message: S) -> ProviderResult<T>
    where
        S: Into<String>,
    {
        self.ok_or_else(|| ProviderError::new_with_context(kind, message))
    }
}
