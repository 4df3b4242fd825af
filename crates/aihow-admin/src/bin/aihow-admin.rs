use std::path::PathBuf;

use aihow_admin::{AdminConfig, ConfigLoader};
use aihow_audit::{AuditFilter, AuditPersister, JsonlFilePersister};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aihow-admin")]
#[command(about = "Inspect AIhow admin roles, configuration and audit logs")]
struct Cli {
    /// Configuration file (defaults to <config_dir>/aihow/admin.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured roles
    Roles,
    /// Check whether a role may open a route
    CheckRoute {
        #[arg(short, long)]
        role: String,
        #[arg(long)]
        route: String,
    },
    /// Check whether a role holds a capability
    CheckCapability {
        #[arg(short, long)]
        role: String,
        #[arg(long)]
        capability: String,
    },
    /// Query a JSON-lines audit log
    Audit {
        /// Audit file (defaults to audit.file_path from configuration)
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(long)]
        admin_id: Option<String>,
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        resource: Option<String>,
        /// Inclusive lower bound (RFC 3339)
        #[arg(long)]
        since: Option<DateTime<Utc>>,
        /// Inclusive upper bound (RFC 3339)
        #[arg(long)]
        until: Option<DateTime<Utc>>,
    },
    /// Load and validate the configuration
    ValidateConfig,
    /// Write the default configuration to the config path
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let loader = match cli.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };

    match cli.command {
        Commands::Roles => list_roles(&loader)?,
        Commands::CheckRoute { role, route } => {
            let config = load(&loader)?;
            let allowed = config.role_registry()?.can_access_route(&role, &route)?;
            print_decision(allowed);
        }
        Commands::CheckCapability { role, capability } => {
            let config = load(&loader)?;
            let allowed = config.role_registry()?.has_permission(&role, &capability)?;
            print_decision(allowed);
        }
        Commands::Audit {
            file,
            admin_id,
            action,
            resource,
            since,
            until,
        } => {
            let filter = AuditFilter {
                admin_id,
                action,
                resource,
                start_date: since,
                end_date: until,
                ..Default::default()
            };
            query_audit(&loader, file, &filter).await?;
        }
        Commands::ValidateConfig => {
            let config = load(&loader)?;
            println!(
                "{} is valid ({} roles)",
                loader.config_path().display(),
                config.role_registry()?.len()
            );
        }
        Commands::InitConfig { force } => {
            if loader.config_path().exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    loader.config_path().display()
                );
            }
            let config = AdminConfig {
                roles: aihow_roles::builtin_definitions(),
                ..Default::default()
            };
            loader.save(&config)?;
            println!("Wrote {}", loader.config_path().display());
        }
    }

    Ok(())
}

fn load(loader: &ConfigLoader) -> anyhow::Result<AdminConfig> {
    loader
        .load()
        .with_context(|| format!("loading {}", loader.config_path().display()))
}

fn list_roles(loader: &ConfigLoader) -> anyhow::Result<()> {
    let registry = load(loader)?.role_registry()?;

    for role in registry.roles() {
        println!("{} (level {})", role.name(), role.level());
        println!(
            "  capabilities: {}",
            role.permissions().collect::<Vec<_>>().join(", ")
        );
        println!(
            "  routes:       {}",
            role.allowed_routes().collect::<Vec<_>>().join(", ")
        );
    }

    Ok(())
}

fn print_decision(allowed: bool) {
    println!("{}", if allowed { "allowed" } else { "denied" });
}

async fn query_audit(
    loader: &ConfigLoader,
    file: Option<PathBuf>,
    filter: &AuditFilter,
) -> anyhow::Result<()> {
    let path = match file {
        Some(path) => path,
        None => load(loader)?
            .audit
            .file_path
            .context("no --file given and audit.file_path is not configured")?,
    };

    if !path.exists() {
        anyhow::bail!("audit file {} does not exist", path.display());
    }

    let persister = JsonlFilePersister::open(&path).await?;
    let entries = persister.query(filter).await?;
    println!("{}", serde_json::to_string_pretty(&entries)?);

    Ok(())
}
