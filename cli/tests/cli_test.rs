use assert_cmd::Command;
use std::path::Path;

fn provider() -> Command {
    let mut cmd = Command::cargo_bin("aws-provider").unwrap();
    // Keep the SDK from looking anywhere but the environment for its region.
    cmd.env("AWS_REGION", "us-west-2")
        .env("AWS_EC2_METADATA_DISABLED", "true")
        .env_remove("RUST_LOG")
        .args(&["--log-level", "error"]);
    cmd
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}

const GATEWAY: &str = r#"
name: gw
mesh_name: mesh
spec:
  - listener:
      - port_mapping:
          - port: 8080
            protocol: http
"#;

#[test]
fn lists_types() {
    let output = provider().arg("types").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("aws_appmesh_virtual_gateway"), "{}", stdout);
    assert!(stdout.contains("aws_wafregional_rule_group"), "{}", stdout);
    assert_eq!(stdout.matches("aws_elasticache_user").count(), 2, "{}", stdout);
}

#[test]
fn lists_schema_flags() {
    let output = provider().args(&["types", "--json"]).output().unwrap();
    assert!(output.status.success());
    let types: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let user = types["resources"]
        .as_array()
        .unwrap()
        .iter()
        .find(|resource| resource["type_name"] == "aws_elasticache_user")
        .unwrap();
    assert_eq!(user["write_only"], serde_json::json!(["passwords"]));
    let force_new = user["force_new"].as_array().unwrap();
    assert!(force_new.contains(&serde_json::json!("user_id")), "{:?}", force_new);
}

#[test]
fn validates_without_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let valid = write(dir.path(), "gateway.yaml", GATEWAY);
    provider()
        .args(&["validate", "--type", "aws_appmesh_virtual_gateway", "--file", &valid])
        .assert()
        .success();

    let invalid = write(
        dir.path(),
        "invalid.json",
        r#"{"name": "gw", "mesh_name": "mesh", "spec": [{"listener": []}]}"#,
    );
    let output = provider()
        .args(&["validate", "--type", "aws_appmesh_virtual_gateway", "--file", &invalid])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("spec.0.listener"), "{}", stderr);

    provider()
        .args(&["validate", "--type", "aws_appmesh_mesh", "--file", &valid])
        .assert()
        .failure();
}

#[test]
fn plans_against_state() {
    let dir = tempfile::tempdir().unwrap();
    let desired = write(dir.path(), "gateway.yaml", GATEWAY);
    let state = dir.path().join("state.json");

    let output = provider()
        .args(&["plan", "--type", "aws_appmesh_virtual_gateway", "--file", &desired])
        .args(&["--state", state.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap().trim(),
        "aws_appmesh_virtual_gateway: create"
    );

    let document = r#"{
        "type_name": "aws_appmesh_virtual_gateway",
        "id": "mesh/gw",
        "attributes": {
            "name": "gw",
            "mesh_name": "mesh",
            "spec": [{"listener": [{"port_mapping": [{"port": 8080, "protocol": "http"}]}]}],
            "arn": "arn:aws:appmesh:us-west-2:123456789012:mesh/mesh/virtualGateway/gw",
            "tags": {},
            "tags_all": {}
        }
    }"#;
    let state = write(dir.path(), "state.json", document);
    let renamed = write(dir.path(), "renamed.yaml", &GATEWAY.replace("name: gw", "name: gw2"));
    let output = provider()
        .args(&["plan", "--json", "--type", "aws_appmesh_virtual_gateway"])
        .args(&["--file", &renamed, "--state", &state])
        .output()
        .unwrap();
    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        plan,
        serde_json::json!({"action": "replace", "forced_by": ["name"]})
    );
}
