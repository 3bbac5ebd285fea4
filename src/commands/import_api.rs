use crate::{
    client::{ImportApiOptions, ImportOutcome},
    constants::DEFAULT_API_PROVIDER,
    params::{
        ApiIdentifier, CertPayload, EndpointData, Environment, FailoverEndpointsData,
        LoadBalanceEndpointsData, MutualSslCertPayload, ParameterSet, SecurityData,
    },
};
use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub struct ImportApiArgs {
    /// API archive to import, named `<Name>_<Version>.zip`
    #[arg(short, long)]
    pub file: PathBuf,
    #[arg(short, long)]
    pub environment: String,
    /// Deployment params file with a section for the target environment
    #[arg(long)]
    pub params: Option<PathBuf>,
    #[arg(long)]
    pub preserve_provider: bool,
    /// Overwrite the API if it already exists
    #[arg(long)]
    pub update: bool,
    /// Provider recorded for mutual SSL certificates
    #[arg(long, default_value = DEFAULT_API_PROVIDER)]
    pub provider: String,
}

/// Environment specific settings sent along with the archive
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentParams<'a> {
    pub environment: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<&'a EndpointData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balance_endpoints: Option<&'a LoadBalanceEndpointsData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failover_endpoints: Option<&'a FailoverEndpointsData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<&'a SecurityData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_environments: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policies: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub certs: Vec<CertPayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mutual_ssl_certs: Vec<MutualSslCertPayload>,
}

/// Build the deployment parameters for `environment` from a params file
pub fn deployment_params(
    params_path: &Path,
    environment: &str,
    archive: &Path,
    provider: &str,
) -> Result<String> {
    let set = ParameterSet::from_path(params_path)
        .with_context(|| format!("loading params from {}", params_path.display()))?;
    let env = lookup(&set, environment)?;
    let base_dir = params_base_dir(params_path);

    let certs = env
        .certificate_payloads(base_dir)
        .context("reading endpoint certificates")?;
    let mutual_ssl_certs = if env.has_mutual_ssl_certs() {
        let api = ApiIdentifier::from_archive_name(archive, provider).ok_or_else(|| {
            anyhow!(
                "cannot tell the API name and version from '{}', expected <Name>_<Version>.zip",
                archive.display()
            )
        })?;
        env.mutual_ssl_payloads(base_dir, &api)
            .context("reading mutual SSL certificates")?
    } else {
        Vec::new()
    };

    let deployment = DeploymentParams {
        environment: &env.name,
        endpoints: env.endpoints.as_ref(),
        load_balance_endpoints: env.load_balance_endpoints.as_ref(),
        failover_endpoints: env.failover_endpoints.as_ref(),
        security: env.security.as_ref(),
        gateway_environments: env.gateway_environments.as_deref(),
        policies: env.policies.as_deref(),
        certs,
        mutual_ssl_certs,
    };
    Ok(serde_json::to_string(&deployment)?)
}

/// Directory certificate paths in a params file are relative to
fn params_base_dir(params_path: &Path) -> &Path {
    params_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn lookup<'a>(set: &'a ParameterSet, environment: &str) -> Result<&'a Environment> {
    set.environment(environment).ok_or_else(|| match set.closest_name(environment) {
        Some(hint) => anyhow!(
            "environment '{environment}' is not defined in the params file. Did you mean '{hint}'?"
        ),
        None => anyhow!(
            "environment '{environment}' is not defined in the params file (found: {})",
            set.names().join(", ")
        ),
    })
}

pub async fn run(args: ImportApiArgs, insecure: bool) -> Result<()> {
    if !args.file.is_file() {
        anyhow::bail!("API archive {} does not exist", args.file.display());
    }
    let params = match &args.params {
        Some(path) => {
            info!("Applying params of '{}' from {}", args.environment, path.display());
            Some(deployment_params(
                path,
                &args.environment,
                &args.file,
                &args.provider,
            )?)
        }
        None => None,
    };

    let client = super::connect(&args.environment, insecure).await?;
    let options = ImportApiOptions {
        preserve_provider: args.preserve_provider,
        overwrite: args.update,
    };
    let outcome = client
        .import_api(&args.file, &options, params)
        .await
        .with_context(|| format!("importing API {}", args.file.display()))?;

    match outcome {
        ImportOutcome::Imported => {
            println!("✅ Successfully imported API '{}'", args.file.display())
        }
        ImportOutcome::PartiallyImported => println!(
            "Partially imported API '{}'\nNOTE: some resources were skipped by the server",
            args.file.display()
        ),
    }
    Ok(())
}
