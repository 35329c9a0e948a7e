use crate::schema::Schema;
use provider_model::{normalize, Attributes};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// What has to happen to move a resource from its prior state to its desired state.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Plan {
    /// Nothing is tracked yet; the object must be created.
    Create,
    /// Prior and desired state agree.
    NoOp,
    /// The listed attributes changed and all of them can be updated in place.
    Update { changed: Vec<String> },
    /// At least one changed attribute forces replacement: the object is deleted and created again.
    Replace { forced_by: Vec<String> },
    /// The object is tracked but no longer desired.
    Delete,
}

impl Plan {
    /// Classify the difference between two flattened attribute trees. Attributes only the API sets
    /// are ignored, as are optional-computed attributes the user left unset.
    pub fn new(schema: &Schema, prior: Option<&Attributes>, desired: Option<&Attributes>) -> Self {
        let (prior, desired) = match (prior, desired) {
            (None, None) => return Plan::NoOp,
            (None, Some(_)) => return Plan::Create,
            (Some(_), None) => return Plan::Delete,
            (Some(prior), Some(desired)) => (prior, desired),
        };

        let desired_paths: BTreeSet<String> = desired.iter().map(|(k, _)| normalize(k)).collect();
        let mut changed = BTreeSet::new();
        let mut forced_by = BTreeSet::new();
        for key in prior.diff(desired) {
            let path = normalize(&key);
            let flags = schema.flags(&path);
            if flags.computed && (!flags.optional || !is_set(&desired_paths, &path)) {
                continue;
            }
            if flags.force_new {
                forced_by.insert(path.clone());
            }
            changed.insert(path);
        }

        if !forced_by.is_empty() {
            Plan::Replace {
                forced_by: forced_by.into_iter().collect(),
            }
        } else if !changed.is_empty() {
            Plan::Update {
                changed: changed.into_iter().collect(),
            }
        } else {
            Plan::NoOp
        }
    }
}

fn is_set(paths: &BTreeSet<String>, path: &str) -> bool {
    let nested = format!("{}.", path);
    paths
        .iter()
        .any(|candidate| candidate == path || candidate.starts_with(&nested))
}

impl Display for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Plan::Create => write!(f, "create"),
            Plan::NoOp => write!(f, "no changes"),
            Plan::Update { changed } => write!(f, "update in place ({})", changed.join(", ")),
            Plan::Replace { forced_by } => {
                write!(f, "replace, forced by {}", forced_by.join(", "))
            }
            Plan::Delete => write!(f, "delete"),
        }
    }
}
