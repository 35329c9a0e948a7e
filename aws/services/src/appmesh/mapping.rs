/*!

Conversion between the virtual gateway's attribute tree and the App Mesh API shapes. `expand_*`
builds request shapes from configuration; `flatten_*` turns responses back into configuration.
A block that is absent from configuration is omitted from the request, and a union member the
API reports but this provider does not know is dropped on the way back.

!*/

use aws_resource_types::appmesh::{
    AccessLog, AccessLogFile, AcmCertificate, AcmTrust, BackendDefaults, ClientPolicy,
    ClientPolicyTls, ClientTlsCertificate, ClientTlsValidation, ClientTlsValidationTrust,
    ConnectionPool, FileCertificate, FileTrust, GrpcConnectionPool, HealthCheck,
    Http2ConnectionPool, HttpConnectionPool, JsonFormatRef, Listener, ListenerProtocol,
    ListenerTls, ListenerTlsCertificate, ListenerTlsValidation, ListenerTlsValidationTrust,
    Logging, LoggingFormat, PortMapping, SdsCertificate, SubjectAlternativeNameMatchers,
    SubjectAlternativeNames, VirtualGatewaySpec,
};
use aws_sdk_appmesh::model;
use crate::convert::{number, string};

fn protocol(protocol: ListenerProtocol) -> model::VirtualGatewayPortProtocol {
    model::VirtualGatewayPortProtocol::from(protocol.to_string().as_str())
}

fn parse_protocol(protocol: Option<&model::VirtualGatewayPortProtocol>) -> ListenerProtocol {
    protocol
        .and_then(|protocol| protocol.as_str().parse().ok())
        .unwrap_or_default()
}

fn port(value: Option<i32>) -> Option<u16> {
    value
        .and_then(|port| u16::try_from(port).ok())
        .filter(|port| *port > 0)
}

pub fn expand_spec(spec: &VirtualGatewaySpec) -> model::VirtualGatewaySpec {
    model::VirtualGatewaySpec::builder()
        .set_listeners(Some(spec.listener.iter().map(expand_listener).collect()))
        .set_backend_defaults(spec.backend_defaults.as_ref().map(expand_backend_defaults))
        .set_logging(spec.logging.as_ref().map(expand_logging))
        .build()
}

pub fn flatten_spec(spec: &model::VirtualGatewaySpec) -> VirtualGatewaySpec {
    VirtualGatewaySpec {
        listener: spec
            .listeners()
            .unwrap_or_default()
            .iter()
            .map(flatten_listener)
            .collect(),
        backend_defaults: spec.backend_defaults().map(flatten_backend_defaults),
        logging: spec.logging().map(flatten_logging),
    }
}

fn expand_listener(listener: &Listener) -> model::VirtualGatewayListener {
    model::VirtualGatewayListener::builder()
        .port_mapping(
            model::VirtualGatewayPortMapping::builder()
                .port(i32::from(listener.port_mapping.port))
                .protocol(protocol(listener.port_mapping.protocol))
                .build(),
        )
        .set_connection_pool(listener.connection_pool.as_ref().map(expand_connection_pool))
        .set_health_check(listener.health_check.as_ref().map(expand_health_check))
        .set_tls(listener.tls.as_ref().map(expand_listener_tls))
        .build()
}

fn flatten_listener(listener: &model::VirtualGatewayListener) -> Listener {
    let port_mapping = listener
        .port_mapping()
        .map(|mapping| PortMapping {
            port: port(number::<i32>(mapping.port())).unwrap_or_default(),
            protocol: parse_protocol(mapping.protocol()),
        })
        .unwrap_or_default();
    Listener {
        port_mapping,
        connection_pool: listener
            .connection_pool()
            .and_then(flatten_connection_pool),
        health_check: listener.health_check().map(flatten_health_check),
        tls: listener.tls().and_then(flatten_listener_tls),
    }
}

fn expand_connection_pool(pool: &ConnectionPool) -> model::VirtualGatewayConnectionPool {
    match pool {
        ConnectionPool::Grpc(grpc) => model::VirtualGatewayConnectionPool::Grpc(
            model::VirtualGatewayGrpcConnectionPool::builder()
                .max_requests(grpc.max_requests)
                .build(),
        ),
        ConnectionPool::Http(http) => model::VirtualGatewayConnectionPool::Http(
            model::VirtualGatewayHttpConnectionPool::builder()
                .max_connections(http.max_connections)
                .set_max_pending_requests(http.max_pending_requests)
                .build(),
        ),
        ConnectionPool::Http2(http2) => model::VirtualGatewayConnectionPool::Http2(
            model::VirtualGatewayHttp2ConnectionPool::builder()
                .max_requests(http2.max_requests)
                .build(),
        ),
    }
}

fn flatten_connection_pool(pool: &model::VirtualGatewayConnectionPool) -> Option<ConnectionPool> {
    match pool {
        model::VirtualGatewayConnectionPool::Grpc(grpc) => {
            Some(ConnectionPool::Grpc(GrpcConnectionPool {
                max_requests: number::<i32>(grpc.max_requests()).unwrap_or_default(),
            }))
        }
        model::VirtualGatewayConnectionPool::Http(http) => {
            Some(ConnectionPool::Http(HttpConnectionPool {
                max_connections: number::<i32>(http.max_connections()).unwrap_or_default(),
                max_pending_requests: number::<i32>(http.max_pending_requests())
                    .filter(|pending| *pending > 0),
            }))
        }
        model::VirtualGatewayConnectionPool::Http2(http2) => {
            Some(ConnectionPool::Http2(Http2ConnectionPool {
                max_requests: number::<i32>(http2.max_requests()).unwrap_or_default(),
            }))
        }
        _ => None,
    }
}

fn expand_health_check(check: &HealthCheck) -> model::VirtualGatewayHealthCheckPolicy {
    model::VirtualGatewayHealthCheckPolicy::builder()
        .healthy_threshold(check.healthy_threshold)
        .interval_millis(check.interval_millis)
        .set_path(check.path.clone())
        .set_port(check.port.map(i32::from))
        .protocol(protocol(check.protocol))
        .timeout_millis(check.timeout_millis)
        .unhealthy_threshold(check.unhealthy_threshold)
        .build()
}

fn flatten_health_check(check: &model::VirtualGatewayHealthCheckPolicy) -> HealthCheck {
    HealthCheck {
        healthy_threshold: number::<i32>(check.healthy_threshold()).unwrap_or_default(),
        interval_millis: number::<i64>(check.interval_millis()).unwrap_or_default(),
        path: check.path().map(str::to_string),
        port: port(number::<i32>(check.port())),
        protocol: parse_protocol(check.protocol()),
        timeout_millis: number::<i64>(check.timeout_millis()).unwrap_or_default(),
        unhealthy_threshold: number::<i32>(check.unhealthy_threshold()).unwrap_or_default(),
    }
}

fn expand_listener_tls(tls: &ListenerTls) -> model::VirtualGatewayListenerTls {
    model::VirtualGatewayListenerTls::builder()
        .certificate(expand_listener_certificate(&tls.certificate))
        .mode(model::VirtualGatewayListenerTlsMode::from(
            tls.mode.to_string().as_str(),
        ))
        .set_validation(tls.validation.as_ref().map(expand_listener_validation))
        .build()
}

fn flatten_listener_tls(tls: &model::VirtualGatewayListenerTls) -> Option<ListenerTls> {
    Some(ListenerTls {
        certificate: tls.certificate().and_then(flatten_listener_certificate)?,
        mode: tls.mode().and_then(|mode| mode.as_str().parse().ok())?,
        validation: tls.validation().and_then(flatten_listener_validation),
    })
}

fn expand_file_certificate(file: &FileCertificate) -> model::VirtualGatewayListenerTlsFileCertificate {
    model::VirtualGatewayListenerTlsFileCertificate::builder()
        .certificate_chain(&file.certificate_chain)
        .private_key(&file.private_key)
        .build()
}

fn flatten_file_certificate(file: &model::VirtualGatewayListenerTlsFileCertificate) -> FileCertificate {
    FileCertificate {
        certificate_chain: string(file.certificate_chain()),
        private_key: string(file.private_key()),
    }
}

fn expand_sds_certificate(sds: &SdsCertificate) -> model::VirtualGatewayListenerTlsSdsCertificate {
    model::VirtualGatewayListenerTlsSdsCertificate::builder()
        .secret_name(&sds.secret_name)
        .build()
}

fn flatten_sds_certificate(sds: &model::VirtualGatewayListenerTlsSdsCertificate) -> SdsCertificate {
    SdsCertificate {
        secret_name: string(sds.secret_name()),
    }
}

fn expand_listener_certificate(
    certificate: &ListenerTlsCertificate,
) -> model::VirtualGatewayListenerTlsCertificate {
    match certificate {
        ListenerTlsCertificate::Acm(acm) => model::VirtualGatewayListenerTlsCertificate::Acm(
            model::VirtualGatewayListenerTlsAcmCertificate::builder()
                .certificate_arn(&acm.certificate_arn)
                .build(),
        ),
        ListenerTlsCertificate::File(file) => {
            model::VirtualGatewayListenerTlsCertificate::File(expand_file_certificate(file))
        }
        ListenerTlsCertificate::Sds(sds) => {
            model::VirtualGatewayListenerTlsCertificate::Sds(expand_sds_certificate(sds))
        }
    }
}

fn flatten_listener_certificate(
    certificate: &model::VirtualGatewayListenerTlsCertificate,
) -> Option<ListenerTlsCertificate> {
    match certificate {
        model::VirtualGatewayListenerTlsCertificate::Acm(acm) => {
            Some(ListenerTlsCertificate::Acm(AcmCertificate {
                certificate_arn: string(acm.certificate_arn()),
            }))
        }
        model::VirtualGatewayListenerTlsCertificate::File(file) => {
            Some(ListenerTlsCertificate::File(flatten_file_certificate(file)))
        }
        model::VirtualGatewayListenerTlsCertificate::Sds(sds) => {
            Some(ListenerTlsCertificate::Sds(flatten_sds_certificate(sds)))
        }
        _ => None,
    }
}

fn expand_file_trust(file: &FileTrust) -> model::VirtualGatewayTlsValidationContextFileTrust {
    model::VirtualGatewayTlsValidationContextFileTrust::builder()
        .certificate_chain(&file.certificate_chain)
        .build()
}

fn flatten_file_trust(file: &model::VirtualGatewayTlsValidationContextFileTrust) -> FileTrust {
    FileTrust {
        certificate_chain: string(file.certificate_chain()),
    }
}

fn expand_sds_trust(sds: &SdsCertificate) -> model::VirtualGatewayTlsValidationContextSdsTrust {
    model::VirtualGatewayTlsValidationContextSdsTrust::builder()
        .secret_name(&sds.secret_name)
        .build()
}

fn flatten_sds_trust(sds: &model::VirtualGatewayTlsValidationContextSdsTrust) -> SdsCertificate {
    SdsCertificate {
        secret_name: string(sds.secret_name()),
    }
}

fn expand_subject_alternative_names(
    names: &SubjectAlternativeNames,
) -> model::SubjectAlternativeNames {
    model::SubjectAlternativeNames::builder()
        .r#match(
            model::SubjectAlternativeNameMatchers::builder()
                .set_exact(Some(names.matchers.exact.iter().cloned().collect()))
                .build(),
        )
        .build()
}

fn flatten_subject_alternative_names(
    names: &model::SubjectAlternativeNames,
) -> SubjectAlternativeNames {
    SubjectAlternativeNames {
        matchers: SubjectAlternativeNameMatchers {
            exact: names
                .r#match()
                .and_then(|matchers| matchers.exact())
                .unwrap_or_default()
                .iter()
                .cloned()
                .collect(),
        },
    }
}

fn expand_listener_validation(
    validation: &ListenerTlsValidation,
) -> model::VirtualGatewayListenerTlsValidationContext {
    let trust = match &validation.trust {
        ListenerTlsValidationTrust::File(file) => {
            model::VirtualGatewayListenerTlsValidationContextTrust::File(expand_file_trust(file))
        }
        ListenerTlsValidationTrust::Sds(sds) => {
            model::VirtualGatewayListenerTlsValidationContextTrust::Sds(expand_sds_trust(sds))
        }
    };
    model::VirtualGatewayListenerTlsValidationContext::builder()
        .set_subject_alternative_names(
            validation
                .subject_alternative_names
                .as_ref()
                .map(expand_subject_alternative_names),
        )
        .trust(trust)
        .build()
}

fn flatten_listener_validation(
    validation: &model::VirtualGatewayListenerTlsValidationContext,
) -> Option<ListenerTlsValidation> {
    let trust = match validation.trust()? {
        model::VirtualGatewayListenerTlsValidationContextTrust::File(file) => {
            ListenerTlsValidationTrust::File(flatten_file_trust(file))
        }
        model::VirtualGatewayListenerTlsValidationContextTrust::Sds(sds) => {
            ListenerTlsValidationTrust::Sds(flatten_sds_trust(sds))
        }
        _ => return None,
    };
    Some(ListenerTlsValidation {
        subject_alternative_names: validation
            .subject_alternative_names()
            .map(flatten_subject_alternative_names),
        trust,
    })
}

fn expand_backend_defaults(defaults: &BackendDefaults) -> model::VirtualGatewayBackendDefaults {
    model::VirtualGatewayBackendDefaults::builder()
        .set_client_policy(defaults.client_policy.as_ref().map(|policy| {
            model::VirtualGatewayClientPolicy::builder()
                .set_tls(policy.tls.as_ref().map(expand_client_policy_tls))
                .build()
        }))
        .build()
}

fn flatten_backend_defaults(defaults: &model::VirtualGatewayBackendDefaults) -> BackendDefaults {
    BackendDefaults {
        client_policy: defaults.client_policy().map(|policy| ClientPolicy {
            tls: policy.tls().and_then(flatten_client_policy_tls),
        }),
    }
}

fn expand_client_policy_tls(tls: &ClientPolicyTls) -> model::VirtualGatewayClientPolicyTls {
    let certificate = tls.certificate.as_ref().map(|certificate| match certificate {
        ClientTlsCertificate::File(file) => {
            model::VirtualGatewayClientTlsCertificate::File(expand_file_certificate(file))
        }
        ClientTlsCertificate::Sds(sds) => {
            model::VirtualGatewayClientTlsCertificate::Sds(expand_sds_certificate(sds))
        }
    });
    model::VirtualGatewayClientPolicyTls::builder()
        .set_certificate(certificate)
        .enforce(tls.enforce)
        .set_ports(Some(tls.ports.iter().copied().map(i32::from).collect()))
        .validation(expand_client_validation(&tls.validation))
        .build()
}

fn flatten_client_policy_tls(tls: &model::VirtualGatewayClientPolicyTls) -> Option<ClientPolicyTls> {
    let certificate = tls.certificate().and_then(|certificate| match certificate {
        model::VirtualGatewayClientTlsCertificate::File(file) => {
            Some(ClientTlsCertificate::File(flatten_file_certificate(file)))
        }
        model::VirtualGatewayClientTlsCertificate::Sds(sds) => {
            Some(ClientTlsCertificate::Sds(flatten_sds_certificate(sds)))
        }
        _ => None,
    });
    Some(ClientPolicyTls {
        certificate,
        enforce: number::<bool>(tls.enforce()).unwrap_or(true),
        ports: tls
            .ports()
            .unwrap_or_default()
            .iter()
            .filter_map(|port| u16::try_from(*port).ok())
            .collect(),
        validation: tls.validation().and_then(flatten_client_validation)?,
    })
}

fn expand_client_validation(
    validation: &ClientTlsValidation,
) -> model::VirtualGatewayTlsValidationContext {
    let trust = match &validation.trust {
        ClientTlsValidationTrust::Acm(acm) => model::VirtualGatewayTlsValidationContextTrust::Acm(
            model::VirtualGatewayTlsValidationContextAcmTrust::builder()
                .set_certificate_authority_arns(Some(
                    acm.certificate_authority_arns.iter().cloned().collect(),
                ))
                .build(),
        ),
        ClientTlsValidationTrust::File(file) => {
            model::VirtualGatewayTlsValidationContextTrust::File(expand_file_trust(file))
        }
        ClientTlsValidationTrust::Sds(sds) => {
            model::VirtualGatewayTlsValidationContextTrust::Sds(expand_sds_trust(sds))
        }
    };
    model::VirtualGatewayTlsValidationContext::builder()
        .set_subject_alternative_names(
            validation
                .subject_alternative_names
                .as_ref()
                .map(expand_subject_alternative_names),
        )
        .trust(trust)
        .build()
}

fn flatten_client_validation(
    validation: &model::VirtualGatewayTlsValidationContext,
) -> Option<ClientTlsValidation> {
    let trust = match validation.trust()? {
        model::VirtualGatewayTlsValidationContextTrust::Acm(acm) => {
            ClientTlsValidationTrust::Acm(AcmTrust {
                certificate_authority_arns: acm
                    .certificate_authority_arns()
                    .unwrap_or_default()
                    .iter()
                    .cloned()
                    .collect(),
            })
        }
        model::VirtualGatewayTlsValidationContextTrust::File(file) => {
            ClientTlsValidationTrust::File(flatten_file_trust(file))
        }
        model::VirtualGatewayTlsValidationContextTrust::Sds(sds) => {
            ClientTlsValidationTrust::Sds(flatten_sds_trust(sds))
        }
        _ => return None,
    };
    Some(ClientTlsValidation {
        subject_alternative_names: validation
            .subject_alternative_names()
            .map(flatten_subject_alternative_names),
        trust,
    })
}

fn expand_logging(logging: &Logging) -> model::VirtualGatewayLogging {
    let access_log = logging
        .access_log
        .as_ref()
        .and_then(|access_log| access_log.file.as_ref())
        .map(|file| {
            model::VirtualGatewayAccessLog::File(
                model::VirtualGatewayFileAccessLog::builder()
                    .path(&file.path)
                    .set_format(file.format.as_ref().and_then(expand_logging_format))
                    .build(),
            )
        });
    model::VirtualGatewayLogging::builder()
        .set_access_log(access_log)
        .build()
}

fn flatten_logging(logging: &model::VirtualGatewayLogging) -> Logging {
    Logging {
        access_log: logging.access_log().map(|access_log| AccessLog {
            file: match access_log {
                model::VirtualGatewayAccessLog::File(file) => Some(AccessLogFile {
                    format: file.format().and_then(flatten_logging_format),
                    path: string(file.path()),
                }),
                _ => None,
            },
        }),
    }
}

fn expand_logging_format(format: &LoggingFormat) -> Option<model::LoggingFormat> {
    match (&format.text, format.json.is_empty()) {
        (Some(text), _) => Some(model::LoggingFormat::Text(text.clone())),
        (None, false) => Some(model::LoggingFormat::Json(
            format
                .json
                .iter()
                .map(|pair| {
                    model::JsonFormatRef::builder()
                        .key(&pair.key)
                        .value(&pair.value)
                        .build()
                })
                .collect(),
        )),
        (None, true) => None,
    }
}

fn flatten_logging_format(format: &model::LoggingFormat) -> Option<LoggingFormat> {
    match format {
        model::LoggingFormat::Text(text) => Some(LoggingFormat {
            json: Vec::new(),
            text: Some(text.clone()),
        }),
        model::LoggingFormat::Json(pairs) => Some(LoggingFormat {
            json: pairs
                .iter()
                .map(|pair| JsonFormatRef {
                    key: string(pair.key()),
                    value: string(pair.value()),
                })
                .collect(),
            text: None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use aws_resource_types::appmesh::{TlsMode, VirtualGatewayConfig};
    use provider_model::Configuration;
    use serde_json::json;

    fn full() -> VirtualGatewaySpec {
        VirtualGatewayConfig::from_value(json!({
            "name": "gw",
            "mesh_name": "mesh",
            "spec": [{
                "listener": [{
                    "port_mapping": [{"port": 8080, "protocol": "http2"}],
                    "connection_pool": [{"http2": [{"max_requests": 16}]}],
                    "health_check": [{
                        "healthy_threshold": 2,
                        "interval_millis": 5000,
                        "path": "/ping",
                        "port": 8080,
                        "protocol": "http2",
                        "timeout_millis": 2000,
                        "unhealthy_threshold": 5
                    }],
                    "tls": [{
                        "mode": "STRICT",
                        "certificate": [{"sds": [{"secret_name": "gw-cert"}]}],
                        "validation": [{
                            "subject_alternative_names": [{"match": [{"exact": ["client.local"]}]}],
                            "trust": [{"file": [{"certificate_chain": "/ca.pem"}]}]
                        }]
                    }]
                }],
                "backend_defaults": [{
                    "client_policy": [{
                        "tls": [{
                            "enforce": false,
                            "ports": [8443, 443],
                            "certificate": [{"file": [{
                                "certificate_chain": "/cert_chain.pem",
                                "private_key": "/key.pem"
                            }]}],
                            "validation": [{"trust": [{"acm": [{
                                "certificate_authority_arns": [
                                    "arn:aws:acm-pca:us-west-2:123456789012:certificate-authority/ca"
                                ]
                            }]}]}]
                        }]
                    }]
                }],
                "logging": [{
                    "access_log": [{"file": [{
                        "path": "/dev/stdout",
                        "format": [{"json": [{"key": "status", "value": "%RESPONSE_CODE%"}]}]
                    }]}]
                }]
            }]
        }))
        .unwrap()
        .spec
    }

    #[test]
    fn flatten_reverses_expand() {
        let spec = full();
        assert_eq!(flatten_spec(&expand_spec(&spec)), spec);
    }

    #[test]
    fn expanded_shapes() {
        let expanded = expand_spec(&full());
        let listener = &expanded.listeners().unwrap()[0];
        assert_eq!(
            listener.port_mapping().unwrap().protocol(),
            Some(&model::VirtualGatewayPortProtocol::Http2)
        );
        let tls = listener.tls().unwrap();
        assert_eq!(tls.mode(), Some(&model::VirtualGatewayListenerTlsMode::Strict));
        assert!(matches!(
            tls.certificate(),
            Some(model::VirtualGatewayListenerTlsCertificate::Sds(_))
        ));
        let client_tls = expanded
            .backend_defaults()
            .and_then(|defaults| defaults.client_policy())
            .and_then(|policy| policy.tls())
            .unwrap();
        assert_eq!(client_tls.ports(), Some(&[443, 8443][..]));
        assert!(matches!(
            expanded.logging().and_then(|logging| logging.access_log()),
            Some(model::VirtualGatewayAccessLog::File(_))
        ));
    }

    #[test]
    fn text_format_and_absent_blocks() {
        let mut spec = full();
        spec.backend_defaults = None;
        spec.listener[0].tls = None;
        spec.listener[0].connection_pool = Some(ConnectionPool::Http(HttpConnectionPool {
            max_connections: 4,
            max_pending_requests: Some(8),
        }));
        if let Some(file) = spec
            .logging
            .as_mut()
            .and_then(|logging| logging.access_log.as_mut())
            .and_then(|access_log| access_log.file.as_mut())
        {
            file.format = Some(LoggingFormat {
                json: Vec::new(),
                text: Some("%START_TIME%".to_string()),
            });
        }
        let expanded = expand_spec(&spec);
        assert!(expanded.backend_defaults().is_none());
        assert!(expanded.listeners().unwrap()[0].tls().is_none());
        assert_eq!(flatten_spec(&expanded), spec);
    }

    #[test]
    fn unknown_tls_mode_drops_the_block() {
        let tls = model::VirtualGatewayListenerTls::builder()
            .certificate(expand_listener_certificate(&ListenerTlsCertificate::Sds(
                SdsCertificate {
                    secret_name: "cert".to_string(),
                },
            )))
            .mode(model::VirtualGatewayListenerTlsMode::from("SOMETHING_NEW"))
            .build();
        assert!(flatten_listener_tls(&tls).is_none());

        let tls = model::VirtualGatewayListenerTls::builder()
            .certificate(expand_listener_certificate(&ListenerTlsCertificate::Sds(
                SdsCertificate {
                    secret_name: "cert".to_string(),
                },
            )))
            .mode(model::VirtualGatewayListenerTlsMode::Permissive)
            .build();
        assert_eq!(flatten_listener_tls(&tls).unwrap().mode, TlsMode::Permissive);
    }
}
