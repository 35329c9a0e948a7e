/*!

Tags are a key-value map attached to most resources and kept in sync through a tagging API that
is separate from the resource's own create, read, update and delete calls.

Provider-level default tags are merged underneath resource tags before they are sent; what is read
back is reported in full as `tags_all` and, with the defaults removed, as `tags`.

!*/

use crate::error::Result;
use crate::validation::{invalid, length, AttributePath};
use std::collections::BTreeMap;

pub type Tags = BTreeMap<String, String>;

/// The tagging calls needed to move a resource from one set of tags to another.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TagsDiff {
    /// Tags that are new or whose value changed.
    pub upsert: Tags,
    /// Keys that are no longer present.
    pub remove: Vec<String>,
}

impl TagsDiff {
    pub fn new(old: &Tags, new: &Tags) -> Self {
        let upsert = new
            .iter()
            .filter(|(k, v)| old.get(*k) != Some(*v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let remove = old
            .keys()
            .filter(|k| !new.contains_key(*k))
            .cloned()
            .collect();
        Self { upsert, remove }
    }

    pub fn is_empty(&self) -> bool {
        self.upsert.is_empty() && self.remove.is_empty()
    }
}

/// The tags to send for a resource: `defaults` with `tags` layered on top.
pub fn merge_defaults(defaults: &Tags, tags: &Tags) -> Tags {
    let mut all = defaults.clone();
    all.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
    all
}

/// The resource's own tags out of everything that was read back: entries that exactly match a
/// default tag are dropped.
pub fn strip_defaults(defaults: &Tags, all: &Tags) -> Tags {
    all.iter()
        .filter(|(k, v)| defaults.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Tag keys are 1 to 128 characters, values at most 256, and the `aws:` prefix is reserved.
pub fn validate_tags(path: &AttributePath, tags: &Tags) -> Result<()> {
    for (key, value) in tags {
        let tag_path = path.attr(key);
        length(&tag_path, key, 1, 128)?;
        length(&tag_path, value, 0, 256)?;
        if key.to_lowercase().starts_with("aws:") {
            return Err(invalid(&tag_path, "the 'aws:' prefix is reserved"));
        }
    }
    Ok(())
}
