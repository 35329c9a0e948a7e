use crate::attributes::Attributes;
use crate::error::{self, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use snafu::ResultExt;
use std::fmt::Debug;

/// The `Configuration` trait is for "plain old data" structs that represent an attribute tree:
/// the desired configuration of a resource, the arguments of a data source, or what was read back
/// from the remote API.
///
/// Nested blocks are represented as JSON arrays of objects (see [`crate::block`]), maps as JSON
/// objects and scalars as themselves, so that the serialized form of a `Configuration` is the
/// attribute tree that users write and that state documents store.
///
/// Deserialization is where desired configuration is first checked: unknown enum members, a block
/// given too many times and contradictory oneof groups are all rejected here, before any API call
/// can be made.
pub trait Configuration:
    Serialize + DeserializeOwned + Clone + Debug + Default + Send + Sync + Sized + 'static
{
    /// Convert the `Configuration` object to a serde `Map`.
    fn into_map(self) -> Result<Map<String, Value>> {
        match self.into_value()? {
            Value::Object(map) => Ok(map),
            _ => Err(error::ConfigWrongValueTypeSnafu {}.build().into()),
        }
    }

    /// Convert the `Configuration` object to a serde `Value`.
    fn into_value(self) -> Result<Value> {
        Ok(serde_json::to_value(self).context(error::ConfigSerializationSnafu)?)
    }

    /// Deserialize the `Configuration` object from a serde `Map`.
    fn from_map(map: Map<String, Value>) -> Result<Self> {
        Self::from_value(Value::Object(map))
    }

    /// Deserialize the `Configuration` object from a serde `Value`.
    fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value).context(error::ConfigDeserializationSnafu)?)
    }

    /// Flatten the attribute tree into dotted attribute paths.
    fn attributes(&self) -> Result<Attributes> {
        Ok(Attributes::from_value(&self.clone().into_value()?))
    }
}

impl Configuration for Value {}
