use provider_model::Configuration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What is remembered about one managed object between runs: its type, its identifier and the
/// attribute tree last read back (with write-only attributes carried over from what was sent).
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub type_name: String,
    pub id: String,
    pub attributes: Value,
}

impl Configuration for StateDocument {}
