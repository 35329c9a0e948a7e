use std::collections::BTreeMap;

/// Behavior flags for one attribute path. Whether an attribute is required or optional, and its
/// type, is expressed by the resource's `Config` type; the schema only carries what the planner
/// and the [`Lifecycle`](crate::Lifecycle) need to know on top of that.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AttributeFlags {
    /// A change to this attribute cannot be applied in place; the object must be replaced.
    pub force_new: bool,
    /// The value is set by the API. A user may not set it unless `optional` is also set.
    pub computed: bool,
    /// Together with `computed`: the user may set it, and when they do not the API's value is kept.
    pub optional: bool,
    /// The value is sent to the API but can never be read back.
    pub write_only: bool,
}

/// The attribute flags of a resource type, keyed by normalized attribute path (no list indices,
/// see [`provider_model::normalize`]), e.g. `spec.listener.tls.mode`.
///
/// A flag set on a block applies to every attribute nested under it unless the nested attribute
/// has an entry of its own.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schema {
    attributes: BTreeMap<String, AttributeFlags>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    pub fn new() -> Self {
        let mut schema = Self {
            attributes: BTreeMap::new(),
        };
        schema.entry("tags_all").computed = true;
        schema
    }

    pub fn force_new(mut self, path: &str) -> Self {
        self.entry(path).force_new = true;
        self
    }

    pub fn computed(mut self, path: &str) -> Self {
        self.entry(path).computed = true;
        self
    }

    pub fn optional_computed(mut self, path: &str) -> Self {
        let flags = self.entry(path);
        flags.computed = true;
        flags.optional = true;
        self
    }

    /// Write-only attributes must be top-level; they are carried over from prior state by name.
    pub fn write_only(mut self, path: &str) -> Self {
        self.entry(path).write_only = true;
        self
    }

    /// The flags that apply to `path`: those of the longest registered prefix, matched on whole
    /// segments.
    pub fn flags(&self, path: &str) -> AttributeFlags {
        let mut candidate = path;
        loop {
            if let Some(flags) = self.attributes.get(candidate) {
                return *flags;
            }
            match candidate.rfind('.') {
                Some(dot) => candidate = &candidate[..dot],
                None => return AttributeFlags::default(),
            }
        }
    }

    pub fn write_only_attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|(_, flags)| flags.write_only)
            .map(|(path, _)| path.as_str())
    }

    pub fn force_new_attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|(_, flags)| flags.force_new)
            .map(|(path, _)| path.as_str())
    }

    fn entry(&mut self, path: &str) -> &mut AttributeFlags {
        self.attributes.entry(path.to_string()).or_default()
    }
}
