use crate::error::{self, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// The identifier of a remote object. Identifiers are stored in state as strings and parsed back
/// when the object is read, updated, deleted or imported.
pub trait ResourceId:
    Display + FromStr<Err = Error> + Clone + Debug + Eq + Send + Sync + 'static
{
}

/// An identifier that the API assigns and that carries no structure of its own.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueId(String);

impl OpaqueId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OpaqueId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for OpaqueId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(error::IdentifierParseSnafu {
                id: s,
                expected: "a non-empty ID",
            }
            .build()
            .into());
        }
        Ok(Self(s.to_string()))
    }
}

impl ResourceId for OpaqueId {}

/// Split a composite identifier into its `/`-separated parts. The number of parts must be between
/// `min` and `max`, and no part may be empty. `expected` describes the format for error messages,
/// e.g. `mesh-name/virtual-gateway-name`.
pub fn split_id(id: &str, min: usize, max: usize, expected: &str) -> Result<Vec<String>> {
    let parts: Vec<String> = id.split('/').map(str::to_string).collect();
    if parts.len() < min || parts.len() > max || parts.iter().any(|part| part.is_empty()) {
        return Err(error::IdentifierParseSnafu { id, expected }.build().into());
    }
    Ok(parts)
}

#[cfg(test)]
mod test {
    use super::{split_id, OpaqueId};
    use std::str::FromStr;

    #[test]
    fn composite_ids() {
        assert_eq!(split_id("mesh/gw", 2, 3, "a/b").unwrap(), vec!["mesh", "gw"]);
        assert_eq!(
            split_id("mesh/123456789012/gw", 2, 3, "a/b").unwrap(),
            vec!["mesh", "123456789012", "gw"]
        );
        assert!(split_id("gw", 2, 3, "a/b").is_err());
        assert!(split_id("mesh//gw", 2, 3, "a/b").is_err());
        assert!(split_id("a/b/c/d", 2, 3, "a/b").is_err());
    }

    #[test]
    fn opaque_ids() {
        assert_eq!(OpaqueId::from_str("abc").unwrap().as_str(), "abc");
        assert!(OpaqueId::from_str(" ").is_err());
    }
}
