use apictl::config::{load_main_config_from, save_main_config_to, EnvironmentConfig, MainConfig};
use apictl::credentials::{Credential, KeyStore};
use std::fs;
use tempfile::TempDir;

fn dev() -> EnvironmentConfig {
    EnvironmentConfig {
        name: "dev".to_string(),
        apim: "https://localhost:9443/".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_derived_endpoints() {
    let env = dev();
    assert_eq!(
        env.publisher_endpoint(),
        "https://localhost:9443/api/am/publisher/v4"
    );
    assert_eq!(env.admin_endpoint(), "https://localhost:9443/api/am/admin/v4");
    assert_eq!(env.token_endpoint(), "https://localhost:9443/oauth2/token");

    let explicit = EnvironmentConfig {
        token: Some("https://gw.example.com:8243/token".to_string()),
        ..dev()
    };
    assert_eq!(explicit.token_endpoint(), "https://gw.example.com:8243/token");
}

#[test]
fn test_main_config_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("main_config.yaml");

    let mut cfg = MainConfig::default();
    cfg.add_environment(dev()).unwrap();
    save_main_config_to(&cfg, &path).unwrap();

    let loaded = load_main_config_from(&path).unwrap();
    assert_eq!(loaded, cfg);
    assert!(loaded.environment("dev").is_some());
}

#[test]
fn test_missing_main_config_is_empty() {
    let dir = TempDir::new().unwrap();
    let cfg = load_main_config_from(&dir.path().join("main_config.yaml")).unwrap();
    assert!(cfg.environments.is_empty());
}

#[test]
fn test_duplicate_environment_is_rejected() {
    let mut cfg = MainConfig::default();
    cfg.add_environment(dev()).unwrap();
    assert!(cfg.add_environment(dev()).is_err());
    assert!(cfg.remove_environment("dev"));
    assert!(!cfg.remove_environment("dev"));
}

#[test]
fn test_require_environment_lists_known_names() {
    let mut cfg = MainConfig::default();
    cfg.add_environment(dev()).unwrap();
    let err = cfg.require_environment("prod").unwrap_err();
    assert!(err.to_string().contains("Available environments: dev"));
}

#[test]
fn test_unset_placeholder_in_main_config_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("main_config.yaml");
    fs::write(
        &path,
        "environments:\n  - name: dev\n    apim: ${APICTL_TEST_SURELY_UNSET_HOST}\n",
    )
    .unwrap();

    let err = load_main_config_from(&path).unwrap_err();
    assert!(format!("{err:#}").contains("APICTL_TEST_SURELY_UNSET_HOST"));
}

#[test]
fn test_key_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keys.yaml");

    let cred = Credential {
        client_id: "client".to_string(),
        client_secret: "top-secret".to_string(),
    };
    let mut store = KeyStore::default();
    store.set("dev", &cred);
    store.save_to(&path).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("top-secret"));

    let loaded = KeyStore::load_from(&path).unwrap();
    assert_eq!(loaded.get("dev").unwrap(), cred);
    assert!(loaded.get("prod").is_err());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}

#[test]
fn test_key_store_replaces_existing_entry() {
    let mut store = KeyStore::default();
    let first = Credential {
        client_id: "a".to_string(),
        client_secret: "1".to_string(),
    };
    let second = Credential {
        client_id: "b".to_string(),
        client_secret: "2".to_string(),
    };
    store.set("dev", &first);
    store.set("dev", &second);
    assert_eq!(store.keys.len(), 1);
    assert_eq!(store.get("dev").unwrap(), second);
    assert!(store.remove("dev"));
    assert!(store.keys.is_empty());
}

#[test]
fn test_basic_auth_value() {
    let cred = Credential {
        client_id: "admin".to_string(),
        client_secret: "admin".to_string(),
    };
    assert_eq!(cred.basic_auth_value(), "Basic YWRtaW46YWRtaW4=");
}
