/*!

Configuration of the ElastiCache resources `aws_elasticache_subnet_group` and
`aws_elasticache_user`, and of the data sources of the same names.

!*/

use configuration_derive::Configuration;
use provider_model::validation::{count, invalid, length, matches};
use provider_model::{AttributePath, Result, Tags, Validate};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use std::collections::BTreeSet;

pub const DEFAULT_SUBNET_GROUP_DESCRIPTION: &str = "Managed by Terraform";

lazy_static::lazy_static! {
    static ref SUBNET_GROUP_NAME: Regex = Regex::new("^[0-9a-z-]+$").unwrap();
    static ref USER_ID: Regex = Regex::new("^[a-zA-Z][a-zA-Z0-9-]*$").unwrap();
}

/// The API stores subnet group names in lowercase, so they are lowercased as soon as they are read.
fn lowercase<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|name| name.to_lowercase())
}

fn default_description() -> String {
    DEFAULT_SUBNET_GROUP_DESCRIPTION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Configuration)]
pub struct SubnetGroupConfig {
    #[serde(deserialize_with = "lowercase")]
    pub name: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default)]
    pub subnet_ids: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
}

impl Default for SubnetGroupConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: default_description(),
            subnet_ids: BTreeSet::new(),
            arn: None,
            vpc_id: None,
        }
    }
}

impl Validate for SubnetGroupConfig {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        length(&path.attr("name"), &self.name, 1, 255)?;
        matches(
            &path.attr("name"),
            &self.name,
            &SUBNET_GROUP_NAME,
            "must contain only alphanumeric characters and hyphens",
        )?;
        length(&path.attr("description"), &self.description, 1, 255)?;
        count(&path.attr("subnet_ids"), self.subnet_ids.len(), 1, usize::MAX)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserEngine {
    Redis,
}

// Engine names are accepted in any case.
impl<'de> Deserialize<'de> for UserEngine {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        match name.to_uppercase().as_str() {
            "REDIS" => Ok(Self::Redis),
            _ => Err(serde::de::Error::unknown_variant(&name, &["REDIS"])),
        }
    }
}

impl Default for UserEngine {
    fn default() -> Self {
        Self::Redis
    }
}

derive_display_from_serialize!(UserEngine);
derive_fromstr_from_deserialize!(UserEngine);

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Configuration)]
pub struct UserConfig {
    pub user_id: String,
    pub user_name: String,
    pub engine: UserEngine,
    pub access_string: String,
    #[serde(default)]
    pub no_password_required: bool,
    /// Never returned by the API.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub passwords: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

impl Validate for UserConfig {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        length(&path.attr("user_id"), &self.user_id, 1, 40)?;
        matches(
            &path.attr("user_id"),
            &self.user_id,
            &USER_ID,
            "must begin with a letter and contain only alphanumeric characters and hyphens",
        )?;
        length(&path.attr("user_name"), &self.user_name, 1, 120)?;
        length(&path.attr("access_string"), &self.access_string, 1, 2048)?;

        let passwords = path.attr("passwords");
        match (self.no_password_required, self.passwords.is_empty()) {
            (true, false) => Err(invalid(
                &passwords,
                "cannot be set when no_password_required is true",
            )),
            (false, true) => Err(invalid(
                &passwords,
                "must be set unless no_password_required is true",
            )),
            _ => {
                count(&passwords, self.passwords.len(), 0, 2)?;
                for password in &self.passwords {
                    length(&passwords, password, 16, 128)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Configuration)]
pub struct SubnetGroupLookup {
    pub name: String,
}

impl Validate for SubnetGroupLookup {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        length(&path.attr("name"), &self.name, 1, 255)
    }
}

/// What the `aws_elasticache_subnet_group` data source reports.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Configuration)]
pub struct SubnetGroupData {
    pub name: String,
    pub description: String,
    pub subnet_ids: BTreeSet<String>,
    pub arn: String,
    pub vpc_id: String,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Configuration)]
pub struct UserLookup {
    pub user_id: String,
}

impl Validate for UserLookup {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        length(&path.attr("user_id"), &self.user_id, 1, 40)
    }
}

/// What the `aws_elasticache_user` data source reports. Passwords are never readable.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Configuration)]
pub struct UserData {
    pub user_id: String,
    pub user_name: String,
    pub engine: UserEngine,
    pub access_string: String,
    pub no_password_required: bool,
    pub arn: String,
}
