/*!

Serde helpers for nested blocks. A block is always represented as a list of objects in the
attribute tree, so that its presence can be counted (`tls.#`). These modules let the Rust side use
`Option<T>` for a block that may appear at most once and `T` for a block that must appear exactly
once.

```
use provider_model::block;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Listener {
    #[serde(with = "block::required")]
    port_mapping: PortMapping,
    #[serde(default, with = "block::optional")]
    tls: Option<Tls>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PortMapping {
    port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
struct Tls {
    mode: String,
}

let listener: Listener =
    serde_json::from_str(r#"{"port_mapping": [{"port": 8080}], "tls": []}"#).unwrap();
assert!(listener.tls.is_none());
assert_eq!(serde_json::to_string(&listener).unwrap(),
    r#"{"port_mapping":[{"port":8080}],"tls":[]}"#);
```

!*/

/// A block that may be given zero or one time.
pub mod optional {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(block) => std::slice::from_ref(block).serialize(serializer),
            None => (&[] as &[T]).serialize(serializer),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let mut blocks = Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default();
        if blocks.len() > 1 {
            return Err(D::Error::custom(format!(
                "at most one block may be given, found {}",
                blocks.len()
            )));
        }
        Ok(blocks.pop())
    }
}

/// A block that must be given exactly once.
pub mod required {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        std::slice::from_ref(value).serialize(serializer)
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let mut blocks: Vec<T> = Vec::deserialize(deserializer)?;
        match blocks.len() {
            1 => blocks
                .pop()
                .ok_or_else(|| D::Error::custom("exactly one block must be given")),
            n => Err(D::Error::custom(format!(
                "exactly one block must be given, found {}",
                n
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::block;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
    struct Outer {
        #[serde(with = "block::required")]
        inner: Inner,
        #[serde(default, with = "block::optional")]
        extra: Option<Inner>,
    }

    #[derive(Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
    struct Inner {
        value: u32,
    }

    #[test]
    fn missing_optional_block_is_none() {
        let outer: Outer = serde_json::from_str(r#"{"inner": [{"value": 1}]}"#).unwrap();
        assert_eq!(outer.extra, None);
        assert_eq!(outer.inner.value, 1);
    }

    #[test]
    fn too_many_blocks() {
        let err = serde_json::from_str::<Outer>(
            r#"{"inner": [{"value": 1}], "extra": [{"value": 2}, {"value": 3}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("at most one block"));

        let err = serde_json::from_str::<Outer>(r#"{"inner": []}"#).unwrap_err();
        assert!(err.to_string().contains("exactly one block"));
    }
}
