//! Deployment parameters for API imports
//!
//! A params file describes, per target environment, how an imported API
//! should be wired: endpoints (plain, load balanced or failover), endpoint
//! security, gateway environments, certificates and subscription policies.
//!
//! ```yaml
//! environments:
//!   - name: dev
//!     endpoints:
//!       production:
//!         url: https://dev.backend.example.com
//!         config:
//!           retryTimeOut: 3
//!     security:
//!       enabled: "true"
//!       type: basic
//!       username: admin
//!       password: ${DEV_BACKEND_PASSWORD}
//!     gatewayEnvironments:
//!       - Default
//!   - name: prod
//!     loadBalanceEndpoints:
//!       production:
//!         - url: https://prod-1.backend.example.com
//!         - url: https://prod-2.backend.example.com
//! ```
//!
//! `${VAR}` placeholders are substituted before the document is parsed.

use crate::envsubst::{substitute_braced, EnvLookup, ProcessEnv};
use crate::error::Result;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tuning knobs for calls to a backend endpoint
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_time_out: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<i64>,
    /// Key kept as spelled by existing params files
    #[serde(
        default,
        rename = "retryErroCode",
        skip_serializing_if = "Option::is_none"
    )]
    pub retry_error_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend_error_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend_duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend_max_duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_select: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_duration: Option<i64>,
}

/// A backend URL with optional tuning
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<EndpointConfiguration>,
}

/// Single production/sandbox endpoint pair
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<Endpoint>,
}

/// Endpoint groups used for load balancing
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalanceEndpointsData {
    #[serde(default, rename = "endpoint_type", skip_serializing_if = "Option::is_none")]
    pub endpoint_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub production: Vec<Endpoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sandbox: Vec<Endpoint>,
    /// `none`, `transport`, `soap` or `simpleClientSession`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_management: Option<String>,
    /// Milliseconds
    #[serde(default, rename = "sessionTimeOut", skip_serializing_if = "Option::is_none")]
    pub session_timeout: Option<i64>,
    #[serde(default, rename = "algoClassName", skip_serializing_if = "Option::is_none")]
    pub algorithm_class_name: Option<String>,
    #[serde(default, rename = "algoCombo", skip_serializing_if = "Option::is_none")]
    pub algorithm_combo: Option<String>,
}

/// Primary endpoints with ordered failover lists
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FailoverEndpointsData {
    #[serde(default, rename = "endpoint_type", skip_serializing_if = "Option::is_none")]
    pub endpoint_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub production_failovers: Vec<Endpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sandbox_failovers: Vec<Endpoint>,
    #[serde(default, rename = "failOver", skip_serializing_if = "Option::is_none")]
    pub fail_over: Option<bool>,
}

/// Endpoint security credentials
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<String>,
    /// `basic` or `digest`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Backend certificate to trust for a host
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Cert {
    pub host: String,
    pub alias: String,
    /// Local certificate file, relative to the params file
    pub path: PathBuf,
}

/// Client certificate bound to a subscription tier
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MutualSslCert {
    pub tier_name: String,
    pub alias: String,
    pub path: PathBuf,
}

/// Identity of the API a mutual SSL certificate is attached to
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiIdentifier {
    pub provider_name: String,
    pub api_name: String,
    pub version: String,
}

impl ApiIdentifier {
    /// Derive name and version from an archive named `<Name>_<Version>.zip`
    ///
    /// The version is everything after the last underscore, so API names may
    /// themselves contain underscores.
    pub fn from_archive_name(path: &Path, provider: &str) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        let (name, version) = stem.rsplit_once('_')?;
        if name.is_empty() || version.is_empty() {
            return None;
        }
        Some(ApiIdentifier {
            provider_name: provider.to_string(),
            api_name: name.to_string(),
            version: version.to_string(),
        })
    }
}

/// Certificate ready to be sent to the management API
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CertPayload {
    pub host_name: String,
    pub alias: String,
    pub certificate: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MutualSslCertPayload {
    pub tier_name: String,
    pub alias: String,
    pub certificate: String,
    pub api_identifier: ApiIdentifier,
}

/// Settings for one deployment target
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<EndpointData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balance_endpoints: Option<LoadBalanceEndpointsData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failover_endpoints: Option<FailoverEndpointsData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_environments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certs: Option<Vec<Cert>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutual_ssl_certs: Option<Vec<MutualSslCert>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<Vec<String>>,
}

/// Read a certificate file and return its content base64 encoded
pub fn encode_certificate(path: &Path) -> io::Result<String> {
    let data = std::fs::read(path)?;
    Ok(base64::encode(data))
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

impl Environment {
    /// Encode every `certs` entry, resolving relative paths against `base_dir`
    pub fn certificate_payloads(&self, base_dir: &Path) -> io::Result<Vec<CertPayload>> {
        let Some(certs) = &self.certs else {
            return Ok(Vec::new());
        };
        certs
            .iter()
            .map(|cert| {
                let path = resolve(base_dir, &cert.path);
                debug!("Encoding certificate {} for {}", path.display(), cert.host);
                Ok(CertPayload {
                    host_name: cert.host.clone(),
                    alias: cert.alias.clone(),
                    certificate: encode_certificate(&path)?,
                })
            })
            .collect()
    }

    /// Encode every `mutualSslCerts` entry and bind it to `api`
    pub fn mutual_ssl_payloads(
        &self,
        base_dir: &Path,
        api: &ApiIdentifier,
    ) -> io::Result<Vec<MutualSslCertPayload>> {
        let Some(certs) = &self.mutual_ssl_certs else {
            return Ok(Vec::new());
        };
        certs
            .iter()
            .map(|cert| {
                let path = resolve(base_dir, &cert.path);
                Ok(MutualSslCertPayload {
                    tier_name: cert.tier_name.clone(),
                    alias: cert.alias.clone(),
                    certificate: encode_certificate(&path)?,
                    api_identifier: api.clone(),
                })
            })
            .collect()
    }

    pub fn has_mutual_ssl_certs(&self) -> bool {
        self.mutual_ssl_certs
            .as_ref()
            .is_some_and(|certs| !certs.is_empty())
    }
}

/// All environments declared in a params file, in declaration order
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    #[serde(default)]
    pub environments: Vec<Environment>,
}

impl ParameterSet {
    /// Substitute placeholders from the process environment, then parse
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Self::from_reader_with(reader, &ProcessEnv)
    }

    pub fn from_reader_with(mut reader: impl Read, env: &impl EnvLookup) -> Result<Self> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Self::from_str_with(&raw, env)
    }

    pub fn from_str_with(raw: &str, env: &impl EnvLookup) -> Result<Self> {
        let substituted = substitute_braced(raw, env)?;
        let params: ParameterSet = serde_yaml::from_str(&substituted)?;
        Ok(params)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_path_with(path, &ProcessEnv)
    }

    pub fn from_path_with(path: &Path, env: &impl EnvLookup) -> Result<Self> {
        debug!("Loading params from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader_with(file, env)
    }

    /// First environment whose name matches exactly
    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|env| env.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.environments.iter().map(|e| e.name.as_str()).collect()
    }

    /// Best fuzzy match for `query` among the declared names
    pub fn closest_name(&self, query: &str) -> Option<&str> {
        let matcher = SkimMatcherV2::default();
        self.environments
            .iter()
            .filter_map(|env| {
                matcher
                    .fuzzy_match(&env.name, query)
                    .or_else(|| matcher.fuzzy_match(query, &env.name))
                    .map(|score| (score, env.name.as_str()))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, name)| name)
    }
}

#[derive(Deserialize)]
struct ApiEndpointConfig {
    #[serde(default, rename = "endpointConfig")]
    endpoint_config: String,
}

/// Pull the raw `endpointConfig` string out of an API definition JSON
///
/// A definition without the field yields an empty string.
pub fn extract_endpoint_config(data: &[u8]) -> Result<String> {
    let cfg: ApiEndpointConfig = serde_json::from_slice(data)?;
    Ok(cfg.endpoint_config)
}
