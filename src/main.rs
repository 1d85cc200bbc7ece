//! `oauth2-resources`: inspect and exercise a resource catalog.
//!
//! ```bash
//! # Check the configured catalog for scope-name conflicts
//! oauth2-resources --config application.conf validate
//!
//! # Resolve a scope request the way the token endpoint would
//! oauth2-resources resolve "openid profile orders.read offline_access" --enabled-only
//!
//! # Scopes and claims for the discovery document
//! oauth2-resources discovery --offline-access
//! ```
//!
//! Exit codes: 0 on success, 2 when the catalog is misconfigured, 1 otherwise.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process;

use rust_oauth2_resources::app::{self, AppError};
use rust_oauth2_resources::models::{
    parse_scope, required_scope_names, DiscoveryMetadata, Resources,
};
use rust_oauth2_resources::resolver::DynScopeResolver;
use rust_oauth2_resources::storage::ResourceStoreMetrics;
use rust_oauth2_resources::telemetry::{
    encode_prometheus_text, init_telemetry, shutdown_telemetry,
};

#[derive(Parser)]
#[command(
    name = "oauth2-resources",
    about = "Resolve OAuth2/OpenID Connect scopes against an identity and API resource catalog"
)]
struct Cli {
    /// HOCON configuration file
    #[arg(
        long,
        env = "OAUTH2_CONFIG",
        default_value = "application.conf",
        help = "Path to the HOCON configuration file"
    )]
    config: PathBuf,

    /// Dump resource store metrics to stderr before exiting
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the whole catalog for duplicate or overlapping scope names
    Validate,

    /// Resolve requested scopes into identity and API resources
    Resolve {
        /// Scope names; each argument may itself be a space-delimited list
        #[arg(required = true)]
        scopes: Vec<String>,

        /// Drop disabled resources from the result
        #[arg(long)]
        enabled_only: bool,

        /// Only look up enabled identity resources (no catalog validation)
        #[arg(long, conflicts_with = "enabled_only")]
        identity_only: bool,
    },

    /// Print `scopes_supported` and `claims_supported` for the discovery document
    Discovery {
        #[arg(long)]
        offline_access: bool,
    },

    /// Print the scope names every request receives regardless of consent
    Required,
}

#[derive(Serialize)]
struct ResolveReport {
    scope: String,
    #[serde(flatten)]
    resources: Resources,
}

#[derive(Serialize)]
struct ValidationReport {
    valid: bool,
    identity_resources: usize,
    api_resources: usize,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(&cli).await;
    shutdown_telemetry();

    if let Err(err) = result {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

async fn run(cli: &Cli) -> Result<(), AppError> {
    let config = app::load_config(&cli.config)?;
    init_telemetry(&config.telemetry.service_name)
        .map_err(|e| AppError::Telemetry(e.to_string()))?;

    let metrics = ResourceStoreMetrics::new().map_err(|e| AppError::Telemetry(e.to_string()))?;

    match &cli.command {
        Commands::Validate => {
            let all = app::check_catalog(&config, Some(metrics.clone())).await?;
            print_json(&ValidationReport {
                valid: true,
                identity_resources: all.identity_resources.len(),
                api_resources: all.api_resources.len(),
            })?;
        }
        command => {
            let resolver = app::build_resolver(&config, Some(metrics.clone())).await?;
            query(&resolver, command).await?;
        }
    }

    if cli.metrics {
        let text = encode_prometheus_text(metrics.registry())
            .map_err(|e| AppError::Telemetry(e.to_string()))?;
        eprintln!("{}", String::from_utf8_lossy(&text));
    }

    Ok(())
}

async fn query(resolver: &DynScopeResolver, command: &Commands) -> Result<(), AppError> {
    match command {
        Commands::Resolve {
            scopes,
            enabled_only,
            identity_only,
        } => {
            let requested: BTreeSet<String> =
                scopes.iter().flat_map(|s| parse_scope(s)).collect();

            if *identity_only {
                let found = resolver
                    .find_enabled_identity_resources_by_scope(&requested)
                    .await?;
                print_json(&found)?;
            } else {
                let resources = if *enabled_only {
                    resolver.find_enabled_resources_by_scope(&requested).await?
                } else {
                    resolver.find_resources_by_scope(&requested).await?
                };
                print_json(&ResolveReport {
                    scope: resources.granted_scope(),
                    resources,
                })?;
            }
        }
        Commands::Discovery { offline_access } => {
            let all = resolver.get_all_enabled_resources().await?;
            print_json(&DiscoveryMetadata::from_resources(&all, *offline_access))?;
        }
        Commands::Required => {
            let all = resolver.get_all_enabled_resources().await?;
            print_json(&required_scope_names(&all))?;
        }
        Commands::Validate => {
            resolver.validate_catalog().await?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
