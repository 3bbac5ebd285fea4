use apictl::error::Error;
use apictl::params::{extract_endpoint_config, ApiIdentifier, ParameterSet};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PARAMS: &str = r#"
environments:
  - name: dev
    endpoints:
      production:
        url: https://dev.backend.example.com
        config:
          retryTimeOut: 3
          retryErroCode: 101503
          actionSelect: fault
      sandbox:
        url: https://dev-sandbox.backend.example.com
    security:
      enabled: "true"
      type: basic
      username: admin
      password: ${BACKEND_PASSWORD}
    gatewayEnvironments:
      - Default
    policies:
      - Gold
      - Unlimited
  - name: prod
    loadBalanceEndpoints:
      endpoint_type: load_balance
      production:
        - url: https://prod-1.backend.example.com
        - url: https://prod-2.backend.example.com
      sessionManagement: transport
      sessionTimeOut: 3000
      algoClassName: org.apache.synapse.endpoints.algorithms.RoundRobin
    failoverEndpoints:
      production:
        url: https://prod-primary.example.com
      productionFailovers:
        - url: https://prod-fo-1.example.com
        - url: https://prod-fo-2.example.com
      failOver: true
"#;

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_load_params_with_substitution() {
    let env = vars(&[("BACKEND_PASSWORD", "s3cr3t")]);
    let set = ParameterSet::from_str_with(PARAMS, &env).unwrap();
    assert_eq!(set.names(), vec!["dev", "prod"]);

    let dev = set.environment("dev").unwrap();
    let security = dev.security.as_ref().unwrap();
    assert_eq!(security.password.as_deref(), Some("s3cr3t"));
    assert_eq!(security.kind.as_deref(), Some("basic"));

    let production = dev
        .endpoints
        .as_ref()
        .and_then(|e| e.production.as_ref())
        .unwrap();
    assert_eq!(production.url.as_deref(), Some("https://dev.backend.example.com"));
    let config = production.config.as_ref().unwrap();
    assert_eq!(config.retry_time_out, Some(3));
    assert_eq!(config.retry_error_code, Some(101503));
    assert_eq!(config.action_select.as_deref(), Some("fault"));
    assert_eq!(config.suspend_duration, None);

    assert_eq!(
        dev.gateway_environments.as_deref(),
        Some(&["Default".to_string()][..])
    );
    assert!(dev.load_balance_endpoints.is_none());
    assert!(dev.certs.is_none());
}

#[test]
fn test_load_balance_and_failover_sections() {
    let env = vars(&[("BACKEND_PASSWORD", "x")]);
    let set = ParameterSet::from_str_with(PARAMS, &env).unwrap();
    let prod = set.environment("prod").unwrap();

    let lb = prod.load_balance_endpoints.as_ref().unwrap();
    assert_eq!(lb.endpoint_type.as_deref(), Some("load_balance"));
    assert_eq!(lb.production.len(), 2);
    assert!(lb.sandbox.is_empty());
    assert_eq!(lb.session_timeout, Some(3000));
    assert_eq!(lb.algorithm_combo, None);

    let fo = prod.failover_endpoints.as_ref().unwrap();
    let urls: Vec<&str> = fo
        .production_failovers
        .iter()
        .filter_map(|e| e.url.as_deref())
        .collect();
    assert_eq!(
        urls,
        vec!["https://prod-fo-1.example.com", "https://prod-fo-2.example.com"]
    );
    assert_eq!(fo.fail_over, Some(true));
}

#[test]
fn test_lookup_returns_first_exact_match() {
    let raw = r#"
environments:
  - name: dev
    policies: [Bronze]
  - name: prod
    policies: [Gold]
  - name: prod
    policies: [Silver]
"#;
    let set = ParameterSet::from_str_with(raw, &vars(&[])).unwrap();
    let prod = set.environment("prod").unwrap();
    assert_eq!(prod.policies.as_deref(), Some(&["Gold".to_string()][..]));
    assert!(set.environment("qa").is_none());
    assert!(set.environment("Prod").is_none());
}

#[test]
fn test_closest_name_suggests_declared_environment() {
    let raw = "environments:\n  - name: production\n  - name: development\n";
    let set = ParameterSet::from_str_with(raw, &vars(&[])).unwrap();
    assert_eq!(set.closest_name("prod"), Some("production"));
    assert_eq!(set.closest_name("zzz"), None);
}

#[test]
fn test_missing_variables_fail_before_parsing() {
    let err = ParameterSet::from_str_with(PARAMS, &vars(&[])).unwrap_err();
    assert!(matches!(err, Error::MissingEnv(_)));
    assert_eq!(err.missing_keys(), vec!["BACKEND_PASSWORD"]);
}

#[test]
fn test_malformed_yaml_is_a_parse_error() {
    let err = ParameterSet::from_str_with("environments: [name: dev", &vars(&[])).unwrap_err();
    assert!(matches!(err, Error::Yaml(_)));

    let err = ParameterSet::from_str_with("environments:\n  - name: [1, 2]\n", &vars(&[]))
        .unwrap_err();
    assert!(matches!(err, Error::Yaml(_)));
}

#[test]
fn test_document_without_placeholders_parses_as_is() {
    let raw = "environments:\n  - name: dev\n    gatewayEnvironments: [Default]\n";
    let substituted = ParameterSet::from_str_with(raw, &vars(&[])).unwrap();
    let direct: ParameterSet = serde_yaml::from_str(raw).unwrap();
    assert_eq!(substituted, direct);
}

#[test]
fn test_load_from_path_and_reader() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("api_params.yaml");
    fs::write(&path, "environments:\n  - name: ${ENV_NAME}\n").unwrap();

    let env = vars(&[("ENV_NAME", "staging")]);
    let from_path = ParameterSet::from_path_with(&path, &env).unwrap();
    assert_eq!(from_path.names(), vec!["staging"]);

    let from_reader = ParameterSet::from_reader_with(fs::File::open(&path).unwrap(), &env).unwrap();
    assert_eq!(from_path, from_reader);

    let err = ParameterSet::from_path_with(&dir.path().join("missing.yaml"), &env).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_certificate_payloads_resolve_relative_paths() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("certs")).unwrap();
    fs::write(dir.path().join("certs/backend.pem"), "PEM-DATA").unwrap();
    fs::write(dir.path().join("certs/client.pem"), "CLIENT").unwrap();

    let raw = r#"
environments:
  - name: dev
    certs:
      - host: https://dev.backend.example.com
        alias: backend
        path: certs/backend.pem
    mutualSslCerts:
      - tierName: Gold
        alias: client
        path: certs/client.pem
"#;
    let set = ParameterSet::from_str_with(raw, &vars(&[])).unwrap();
    let dev = set.environment("dev").unwrap();

    let certs = dev.certificate_payloads(dir.path()).unwrap();
    assert_eq!(certs.len(), 1);
    assert_eq!(certs[0].host_name, "https://dev.backend.example.com");
    assert_eq!(certs[0].certificate, base64::encode("PEM-DATA"));

    let api = ApiIdentifier::from_archive_name(Path::new("PizzaShackAPI_1.0.0.zip"), "admin")
        .unwrap();
    let mutual = dev.mutual_ssl_payloads(dir.path(), &api).unwrap();
    assert_eq!(mutual[0].tier_name, "Gold");
    assert_eq!(mutual[0].certificate, base64::encode("CLIENT"));
    assert_eq!(mutual[0].api_identifier.api_name, "PizzaShackAPI");
    assert_eq!(mutual[0].api_identifier.version, "1.0.0");

    let json = serde_json::to_value(&certs[0]).unwrap();
    assert_eq!(json["hostName"], "https://dev.backend.example.com");
}

#[test]
fn test_environment_without_certs_needs_no_files() {
    let set = ParameterSet::from_str_with("environments:\n  - name: dev\n", &vars(&[])).unwrap();
    let dev = set.environment("dev").unwrap();
    let certs = dev
        .certificate_payloads(Path::new("/definitely/not/here"))
        .unwrap();
    assert!(certs.is_empty());
    assert!(!dev.has_mutual_ssl_certs());
}

#[test]
fn test_archive_name_parsing() {
    let api = ApiIdentifier::from_archive_name(Path::new("exports/My_API_2.1.zip"), "alice")
        .unwrap();
    assert_eq!(api.api_name, "My_API");
    assert_eq!(api.version, "2.1");
    assert_eq!(api.provider_name, "alice");

    assert!(ApiIdentifier::from_archive_name(Path::new("noversion.zip"), "alice").is_none());
}

#[test]
fn test_extract_endpoint_config() {
    let inner = r#"{"endpoint_type":"http","production_endpoints":{"url":"https://a"}}"#;
    let outer = serde_json::json!({ "name": "PizzaShack", "endpointConfig": inner });
    let bytes = serde_json::to_vec(&outer).unwrap();
    assert_eq!(extract_endpoint_config(&bytes).unwrap(), inner);

    assert_eq!(extract_endpoint_config(br#"{"name":"x"}"#).unwrap(), "");

    let err = extract_endpoint_config(b"{not json").unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn test_endpoint_with_only_tuning_loads() {
    let yaml = r#"
environments:
  - name: dev
    endpoints:
      production:
        config:
          retryTimeOut: 3
"#;
    let set = ParameterSet::from_str_with(yaml, &vars(&[])).unwrap();
    let production = set.environments[0]
        .endpoints
        .as_ref()
        .and_then(|e| e.production.as_ref())
        .unwrap();
    assert_eq!(production.url, None);
    assert_eq!(
        production.config.as_ref().and_then(|c| c.retry_time_out),
        Some(3)
    );
}
