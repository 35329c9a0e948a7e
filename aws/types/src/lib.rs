/*!

The typed configuration trees of the resource and data source types this provider manages.
Deserializing one of these enforces block cardinality, enum membership and oneof groups;
[`Validate`](provider_model::Validate) checks the remaining constraints.

!*/

use provider_model::validation::invalid;
use provider_model::{AttributePath, Result};
use regex::Regex;

pub mod appmesh;
pub mod elasticache;
pub mod wafregional;

lazy_static::lazy_static! {
    static ref ARN: Regex = Regex::new(r"^arn:[\w-]+:[\w-]+:[\w-]*:\d{0,12}:.+$").unwrap();
}

pub(crate) fn arn_pattern() -> &'static Regex {
    &ARN
}

/// AWS account IDs are exactly twelve digits.
pub(crate) fn validate_account_id(path: &AttributePath, id: &str) -> Result<()> {
    if id.len() != 12 || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid(path, format!("'{}' is not a valid AWS account ID", id)));
    }
    Ok(())
}
