/*!

Constraints that serde cannot express (numeric ranges, string lengths and patterns, element
counts) are checked by implementing [`Validate`]. Validation is run on desired configuration before
any API call is made.

!*/

use crate::error::{self, Error, Result};
use regex::Regex;
use std::fmt::{Display, Formatter};

/// The path of an attribute inside an attribute tree, rendered in the same dotted form that
/// [`crate::Attributes`] uses.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AttributePath(String);

impl AttributePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// The path of the attribute `name` below `self`.
    pub fn attr(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    /// The path of element `i` of the list at `self`.
    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}.{}", self.0, i))
    }

    /// The path of the single element of the block `name` below `self`.
    pub fn block(&self, name: &str) -> Self {
        self.attr(name).index(0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AttributePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Implemented by configuration types to check the constraints serde does not.
pub trait Validate {
    /// Validate `self`, which lives at `path` in the attribute tree.
    fn validate_at(&self, path: &AttributePath) -> Result<()>;

    /// Validate `self` as the root of an attribute tree.
    fn validate(&self) -> Result<()> {
        self.validate_at(&AttributePath::root())
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        match self {
            Some(value) => value.validate_at(path),
            None => Ok(()),
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        self.iter()
            .enumerate()
            .try_for_each(|(i, value)| value.validate_at(&path.index(i)))
    }
}

/// Create the error for an attribute that failed validation.
pub fn invalid<S>(path: &AttributePath, message: S) -> Error
where
    S: Into<String>,
{
    error::InvalidSnafu {
        path: path.to_string(),
        message: message.into(),
    }
    .build()
    .into()
}

pub fn in_range<T>(path: &AttributePath, value: T, min: T, max: T) -> Result<()>
where
    T: PartialOrd + Display,
{
    if value < min || value > max {
        return Err(invalid(
            path,
            format!("expected to be in the range ({} - {}), got {}", min, max, value),
        ));
    }
    Ok(())
}

pub fn length(path: &AttributePath, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(invalid(
            path,
            format!(
                "expected length to be in the range ({} - {}), got {}",
                min, max, len
            ),
        ));
    }
    Ok(())
}

pub fn count(path: &AttributePath, len: usize, min: usize, max: usize) -> Result<()> {
    if len < min || len > max {
        return Err(invalid(
            path,
            format!(
                "expected between {} and {} items, got {}",
                min, max, len
            ),
        ));
    }
    Ok(())
}

pub fn matches(path: &AttributePath, value: &str, pattern: &Regex, description: &str) -> Result<()> {
    if !pattern.is_match(value) {
        return Err(invalid(
            path,
            format!("'{}' {}", value, description),
        ));
    }
    Ok(())
}
