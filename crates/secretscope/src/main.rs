use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use secretscope::{config_path, render, BuildFilter, Catalog, ScopeConfig, TierSelector};
use secretscope_core::PipelineEvent;
use tracing_subscriber::EnvFilter;

/// Scoped build secrets - inspect declarations and what a build would see
#[derive(Parser, Debug)]
#[command(name = "secretscope")]
#[command(about = "Resolve repository, organization and global secrets for builds")]
struct Args {
    /// Path to the declarations file (falls back to SECRETSCOPE_CONFIG, then secretscope.toml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the effective secrets for a build of a repository
    Effective {
        /// Repository id
        #[arg(long)]
        repo: u64,

        /// Only keep secrets available to this pipeline event
        #[arg(long)]
        event: Option<PipelineEvent>,

        /// Only keep secrets available to steps running this image
        #[arg(long)]
        image: Option<String>,

        /// Include secret values in the output
        #[arg(long)]
        show_values: bool,
    },

    /// Print the secrets declared at a single scope
    #[command(group(ArgGroup::new("tier").required(true).args(["repo", "org", "global"])))]
    List {
        /// Repository id
        #[arg(long)]
        repo: Option<u64>,

        /// Organization id
        #[arg(long)]
        org: Option<u64>,

        /// Global secrets
        #[arg(long)]
        global: bool,

        /// Include secret values in the output
        #[arg(long)]
        show_values: bool,
    },

    /// Validate the declarations file
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("secretscope=info".parse()?)
                .add_directive("secretscope_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let path = config_path(args.config);

    let config = ScopeConfig::load(&path)
        .with_context(|| format!("Failed to load declarations from {}", path))?;
    let catalog = Catalog::load(config)
        .await
        .with_context(|| format!("Invalid declarations in {}", path))?;

    match args.command {
        Command::Effective {
            repo,
            event,
            image,
            show_values,
        } => {
            let filter = BuildFilter { event, image };
            let secrets = catalog.effective(repo, &filter).await?;
            tracing::info!("Repository {}: {} effective secrets", repo, secrets.len());
            println!("{}", render(&secrets, show_values)?);
        }
        Command::List {
            repo,
            org,
            global,
            show_values,
        } => {
            let tier = match (repo, org, global) {
                (Some(id), _, _) => TierSelector::Repository(id),
                (None, Some(id), _) => TierSelector::Organization(id),
                _ => TierSelector::Global,
            };
            let secrets = catalog.list(tier).await?;
            println!("{}", render(&secrets, show_values)?);
        }
        Command::Check => {
            tracing::info!(
                "{} repositories, {} secrets declared in {}",
                catalog.repos().len(),
                catalog.secret_count(),
                path
            );
            println!("ok");
        }
    }

    Ok(())
}
