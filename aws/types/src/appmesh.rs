/*!

Configuration of `aws_appmesh_virtual_gateway`.

A virtual gateway lets resources outside a mesh reach services inside it. Its `spec` holds the
gateway's single listener, the defaults applied to backends it routes to, and access logging.

!*/

use crate::{arn_pattern, validate_account_id};
use configuration_derive::{Configuration, OneOf};
use provider_model::validation::{count, in_range, invalid, length, matches};
use provider_model::{block, AttributePath, Result, Validate};
use serde::{Deserialize, Serialize};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use std::collections::BTreeSet;

/// App Mesh allows a single listener per virtual gateway.
pub const MAX_LISTENERS: usize = 1;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerProtocol {
    Http,
    Http2,
    Grpc,
}

impl Default for ListenerProtocol {
    fn default() -> Self {
        Self::Http
    }
}

derive_display_from_serialize!(ListenerProtocol);
derive_fromstr_from_deserialize!(ListenerProtocol);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TlsMode {
    Strict,
    Permissive,
    Disabled,
}

derive_display_from_serialize!(TlsMode);
derive_fromstr_from_deserialize!(TlsMode);

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Configuration)]
pub struct VirtualGatewayConfig {
    pub name: String,
    pub mesh_name: String,
    /// The account that owns the mesh, when it is shared from another account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_owner: Option<String>,
    #[serde(with = "block::required")]
    pub spec: VirtualGatewaySpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_owner: Option<String>,
}

impl Validate for VirtualGatewayConfig {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        length(&path.attr("name"), &self.name, 1, 255)?;
        length(&path.attr("mesh_name"), &self.mesh_name, 1, 255)?;
        if let Some(owner) = &self.mesh_owner {
            validate_account_id(&path.attr("mesh_owner"), owner)?;
        }
        self.spec.validate_at(&path.block("spec"))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualGatewaySpec {
    #[serde(default)]
    pub listener: Vec<Listener>,
    #[serde(default, with = "block::optional")]
    pub backend_defaults: Option<BackendDefaults>,
    #[serde(default, with = "block::optional")]
    pub logging: Option<Logging>,
}

impl Validate for VirtualGatewaySpec {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        count(&path.attr("listener"), self.listener.len(), 1, MAX_LISTENERS)?;
        self.listener.validate_at(&path.attr("listener"))?;
        self.backend_defaults
            .validate_at(&path.block("backend_defaults"))?;
        self.logging.validate_at(&path.block("logging"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listener {
    #[serde(with = "block::required")]
    pub port_mapping: PortMapping,
    #[serde(default, with = "block::optional")]
    pub connection_pool: Option<ConnectionPool>,
    #[serde(default, with = "block::optional")]
    pub health_check: Option<HealthCheck>,
    #[serde(default, with = "block::optional")]
    pub tls: Option<ListenerTls>,
}

impl Validate for Listener {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        self.port_mapping.validate_at(&path.block("port_mapping"))?;
        self.connection_pool
            .validate_at(&path.block("connection_pool"))?;
        self.health_check.validate_at(&path.block("health_check"))?;
        self.tls.validate_at(&path.block("tls"))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortMapping {
    pub port: u16,
    pub protocol: ListenerProtocol,
}

impl Validate for PortMapping {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        in_range(&path.attr("port"), self.port, 1, u16::MAX)
    }
}

/// Connection limits for the listener, one variant per listener protocol.
#[derive(Debug, Clone, PartialEq, OneOf)]
pub enum ConnectionPool {
    Grpc(GrpcConnectionPool),
    Http(HttpConnectionPool),
    Http2(Http2ConnectionPool),
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrpcConnectionPool {
    pub max_requests: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConnectionPool {
    pub max_connections: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pending_requests: Option<i32>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Http2ConnectionPool {
    pub max_requests: i32,
}

impl Validate for ConnectionPool {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        match self {
            ConnectionPool::Grpc(pool) => {
                in_range(&path.block("grpc").attr("max_requests"), pool.max_requests, 1, i32::MAX)
            }
            ConnectionPool::Http(pool) => {
                let path = path.block("http");
                in_range(&path.attr("max_connections"), pool.max_connections, 1, i32::MAX)?;
                if let Some(pending) = pool.max_pending_requests {
                    in_range(&path.attr("max_pending_requests"), pending, 1, i32::MAX)?;
                }
                Ok(())
            }
            ConnectionPool::Http2(pool) => in_range(
                &path.block("http2").attr("max_requests"),
                pool.max_requests,
                1,
                i32::MAX,
            ),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub healthy_threshold: i32,
    pub interval_millis: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub protocol: ListenerProtocol,
    pub timeout_millis: i64,
    pub unhealthy_threshold: i32,
}

impl Validate for HealthCheck {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        in_range(&path.attr("healthy_threshold"), self.healthy_threshold, 2, 10)?;
        in_range(&path.attr("interval_millis"), self.interval_millis, 5000, 300000)?;
        if let Some(port) = self.port {
            in_range(&path.attr("port"), port, 1, u16::MAX)?;
        }
        in_range(&path.attr("timeout_millis"), self.timeout_millis, 2000, 60000)?;
        in_range(&path.attr("unhealthy_threshold"), self.unhealthy_threshold, 2, 10)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerTls {
    #[serde(with = "block::required")]
    pub certificate: ListenerTlsCertificate,
    pub mode: TlsMode,
    #[serde(default, with = "block::optional")]
    pub validation: Option<ListenerTlsValidation>,
}

impl Validate for ListenerTls {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        self.certificate.validate_at(&path.block("certificate"))?;
        self.validation.validate_at(&path.block("validation"))
    }
}

/// Where the listener's own certificate comes from.
#[derive(Debug, Clone, PartialEq, OneOf)]
pub enum ListenerTlsCertificate {
    Acm(AcmCertificate),
    File(FileCertificate),
    Sds(SdsCertificate),
}

impl Validate for ListenerTlsCertificate {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        match self {
            ListenerTlsCertificate::Acm(acm) => acm.validate_at(&path.block("acm")),
            ListenerTlsCertificate::File(file) => file.validate_at(&path.block("file")),
            ListenerTlsCertificate::Sds(sds) => sds.validate_at(&path.block("sds")),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcmCertificate {
    pub certificate_arn: String,
}

impl Validate for AcmCertificate {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        matches(
            &path.attr("certificate_arn"),
            &self.certificate_arn,
            arn_pattern(),
            "is not a valid ARN",
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCertificate {
    pub certificate_chain: String,
    pub private_key: String,
}

impl Validate for FileCertificate {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        length(&path.attr("certificate_chain"), &self.certificate_chain, 1, 255)?;
        length(&path.attr("private_key"), &self.private_key, 1, 255)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdsCertificate {
    pub secret_name: String,
}

impl Validate for SdsCertificate {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        length(&path.attr("secret_name"), &self.secret_name, 1, 255)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerTlsValidation {
    #[serde(default, with = "block::optional")]
    pub subject_alternative_names: Option<SubjectAlternativeNames>,
    #[serde(with = "block::required")]
    pub trust: ListenerTlsValidationTrust,
}

impl Validate for ListenerTlsValidation {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        self.subject_alternative_names
            .validate_at(&path.block("subject_alternative_names"))?;
        self.trust.validate_at(&path.block("trust"))
    }
}

/// The certificate authorities a listener trusts for client certificates.
#[derive(Debug, Clone, PartialEq, OneOf)]
pub enum ListenerTlsValidationTrust {
    File(FileTrust),
    Sds(SdsCertificate),
}

impl Validate for ListenerTlsValidationTrust {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        match self {
            ListenerTlsValidationTrust::File(file) => file.validate_at(&path.block("file")),
            ListenerTlsValidationTrust::Sds(sds) => sds.validate_at(&path.block("sds")),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileTrust {
    pub certificate_chain: String,
}

impl Validate for FileTrust {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        length(&path.attr("certificate_chain"), &self.certificate_chain, 1, 255)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAlternativeNames {
    #[serde(rename = "match", with = "block::required")]
    pub matchers: SubjectAlternativeNameMatchers,
}

impl Validate for SubjectAlternativeNames {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        let path = path.block("match").attr("exact");
        count(&path, self.matchers.exact.len(), 1, usize::MAX)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAlternativeNameMatchers {
    #[serde(default)]
    pub exact: BTreeSet<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendDefaults {
    #[serde(default, with = "block::optional")]
    pub client_policy: Option<ClientPolicy>,
}

impl Validate for BackendDefaults {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        self.client_policy.validate_at(&path.block("client_policy"))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientPolicy {
    #[serde(default, with = "block::optional")]
    pub tls: Option<ClientPolicyTls>,
}

impl Validate for ClientPolicy {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        self.tls.validate_at(&path.block("tls"))
    }
}

fn enforce_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientPolicyTls {
    #[serde(default, with = "block::optional")]
    pub certificate: Option<ClientTlsCertificate>,
    #[serde(default = "enforce_default")]
    pub enforce: bool,
    #[serde(default)]
    pub ports: BTreeSet<u16>,
    #[serde(with = "block::required")]
    pub validation: ClientTlsValidation,
}

impl Validate for ClientPolicyTls {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        self.certificate.validate_at(&path.block("certificate"))?;
        for port in &self.ports {
            in_range(&path.attr("ports"), *port, 1, u16::MAX)?;
        }
        self.validation.validate_at(&path.block("validation"))
    }
}

/// The certificate a gateway presents to backends.
#[derive(Debug, Clone, PartialEq, OneOf)]
pub enum ClientTlsCertificate {
    File(FileCertificate),
    Sds(SdsCertificate),
}

impl Validate for ClientTlsCertificate {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        match self {
            ClientTlsCertificate::File(file) => file.validate_at(&path.block("file")),
            ClientTlsCertificate::Sds(sds) => sds.validate_at(&path.block("sds")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientTlsValidation {
    #[serde(default, with = "block::optional")]
    pub subject_alternative_names: Option<SubjectAlternativeNames>,
    #[serde(with = "block::required")]
    pub trust: ClientTlsValidationTrust,
}

impl Validate for ClientTlsValidation {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        self.subject_alternative_names
            .validate_at(&path.block("subject_alternative_names"))?;
        self.trust.validate_at(&path.block("trust"))
    }
}

/// The certificate authorities a gateway trusts for backend certificates.
#[derive(Debug, Clone, PartialEq, OneOf)]
pub enum ClientTlsValidationTrust {
    Acm(AcmTrust),
    File(FileTrust),
    Sds(SdsCertificate),
}

impl Validate for ClientTlsValidationTrust {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        match self {
            ClientTlsValidationTrust::Acm(acm) => acm.validate_at(&path.block("acm")),
            ClientTlsValidationTrust::File(file) => file.validate_at(&path.block("file")),
            ClientTlsValidationTrust::Sds(sds) => sds.validate_at(&path.block("sds")),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcmTrust {
    #[serde(default)]
    pub certificate_authority_arns: BTreeSet<String>,
}

impl Validate for AcmTrust {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        let path = path.attr("certificate_authority_arns");
        count(&path, self.certificate_authority_arns.len(), 1, 3)?;
        for arn in &self.certificate_authority_arns {
            matches(&path, arn, arn_pattern(), "is not a valid ARN")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logging {
    #[serde(default, with = "block::optional")]
    pub access_log: Option<AccessLog>,
}

impl Validate for Logging {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        self.access_log.validate_at(&path.block("access_log"))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLog {
    #[serde(default, with = "block::optional")]
    pub file: Option<AccessLogFile>,
}

impl Validate for AccessLog {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        self.file.validate_at(&path.block("file"))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLogFile {
    #[serde(default, with = "block::optional")]
    pub format: Option<LoggingFormat>,
    pub path: String,
}

impl Validate for AccessLogFile {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        self.format.validate_at(&path.block("format"))?;
        length(&path.attr("path"), &self.path, 1, 255)
    }
}

/// Exactly one of `json` (one or more key/value pairs) or `text` must be given. Unlike the other
/// groups `text` is a plain string rather than a block, so this is checked by validation.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingFormat {
    #[serde(default)]
    pub json: Vec<JsonFormatRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Validate for LoggingFormat {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        match (self.json.is_empty(), &self.text) {
            (false, None) => self.json.validate_at(&path.attr("json")),
            (true, Some(text)) => length(&path.attr("text"), text, 1, 1000),
            (true, None) => Err(invalid(path, "exactly one of [json, text] must be given")),
            (false, Some(_)) => Err(invalid(path, "only one of [json, text] may be given")),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonFormatRef {
    pub key: String,
    pub value: String,
}

impl Validate for JsonFormatRef {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        length(&path.attr("key"), &self.key, 1, 100)?;
        length(&path.attr("value"), &self.value, 1, 100)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use provider_model::Configuration;
    use serde_json::json;

    fn basic() -> serde_json::Value {
        json!({
            "name": "gw",
            "mesh_name": "mesh",
            "spec": [{
                "listener": [{
                    "port_mapping": [{"port": 8080, "protocol": "http"}]
                }]
            }]
        })
    }

    #[test]
    fn omitted_blocks_have_zero_counts() {
        let config = VirtualGatewayConfig::from_value(basic()).unwrap();
        config.validate().unwrap();
        let attributes = config.attributes().unwrap();
        assert_eq!(attributes.get("spec.#"), Some("1"));
        assert_eq!(attributes.get("spec.0.listener.#"), Some("1"));
        assert_eq!(attributes.get("spec.0.listener.0.tls.#"), Some("0"));
        assert_eq!(attributes.get("spec.0.listener.0.health_check.#"), Some("0"));
        assert_eq!(attributes.get("spec.0.listener.0.connection_pool.#"), Some("0"));
        assert_eq!(attributes.get("spec.0.backend_defaults.#"), Some("0"));
        assert_eq!(attributes.get("spec.0.logging.#"), Some("0"));
        assert_eq!(
            attributes.get("spec.0.listener.0.port_mapping.0.protocol"),
            Some("http")
        );
    }

    #[test]
    fn two_certificate_sources_are_rejected() {
        let mut value = basic();
        value["spec"][0]["listener"][0]["tls"] = json!([{
            "mode": "STRICT",
            "certificate": [{
                "acm": [{"certificate_arn": "arn:aws:acm:us-west-2:123456789012:certificate/abc"}],
                "file": [{"certificate_chain": "/cert_chain.pem", "private_key": "/key.pem"}]
            }]
        }]);
        let err = VirtualGatewayConfig::from_value(value).unwrap_err();
        assert!(
            err.to_string().contains("only one of [acm, file, sds] may be given"),
            "{}",
            err
        );
    }

    #[test]
    fn unknown_enum_members_are_rejected() {
        let mut value = basic();
        value["spec"][0]["listener"][0]["port_mapping"][0]["protocol"] = json!("tcp");
        assert!(VirtualGatewayConfig::from_value(value).is_err());
    }

    #[test]
    fn ranges_are_validated() {
        let mut value = basic();
        value["spec"][0]["listener"][0]["health_check"] = json!([{
            "healthy_threshold": 1,
            "interval_millis": 5000,
            "protocol": "http2",
            "timeout_millis": 2000,
            "unhealthy_threshold": 5
        }]);
        let config = VirtualGatewayConfig::from_value(value).unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.path(),
            Some("spec.0.listener.0.health_check.0.healthy_threshold")
        );
    }

    #[test]
    fn listener_count_and_owner() {
        let mut value = basic();
        value["spec"][0]["listener"] = json!([]);
        let config = VirtualGatewayConfig::from_value(value).unwrap();
        assert_eq!(config.validate().unwrap_err().path(), Some("spec.0.listener"));

        let mut value = basic();
        value["mesh_owner"] = json!("12345");
        let config = VirtualGatewayConfig::from_value(value).unwrap();
        assert_eq!(config.validate().unwrap_err().path(), Some("mesh_owner"));
    }

    #[test]
    fn backend_defaults_enforce_defaults_to_true() {
        let mut value = basic();
        value["spec"][0]["backend_defaults"] = json!([{
            "client_policy": [{
                "tls": [{
                    "ports": [8443],
                    "validation": [{"trust": [{"file": [{"certificate_chain": "/ca.pem"}]}]}]
                }]
            }]
        }]);
        let config = VirtualGatewayConfig::from_value(value).unwrap();
        config.validate().unwrap();
        let tls = config
            .spec
            .backend_defaults
            .and_then(|defaults| defaults.client_policy)
            .and_then(|policy| policy.tls)
            .unwrap();
        assert!(tls.enforce);
        assert!(tls.certificate.is_none());
        assert_eq!(
            tls.validation.trust,
            ClientTlsValidationTrust::File(FileTrust {
                certificate_chain: "/ca.pem".to_string()
            })
        );
    }

    #[test]
    fn logging_format_is_exclusive() {
        let mut value = basic();
        value["spec"][0]["logging"] = json!([{
            "access_log": [{"file": [{
                "path": "/dev/stdout",
                "format": [{"json": [{"key": "k", "value": "v"}], "text": "%s"}]
            }]}]
        }]);
        let config = VirtualGatewayConfig::from_value(value).unwrap();
        assert_eq!(
            config.validate().unwrap_err().path(),
            Some("spec.0.logging.0.access_log.0.file.0.format.0")
        );
    }

    #[test]
    fn enum_display() {
        assert_eq!(ListenerProtocol::Http2.to_string(), "http2");
        assert_eq!("PERMISSIVE".parse::<TlsMode>().unwrap(), TlsMode::Permissive);
    }
}
