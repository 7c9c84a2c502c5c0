use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use product_store::CollectionLayout;
use reconciler::{MatchPolicy, Reconciler, SyncConfig};
use tracing::{debug, info, warn};

/// Backfill Weaviate object ids onto MongoDB product records.
///
/// Credentials come from MONGO_URI, WEAVIATE_HOST and WEAVIATE_API_KEY,
/// read from the environment or a .env file in the working directory.
#[derive(Parser, Debug)]
#[command(name = "weaviate-sync", version)]
struct Cli {
    /// Database to use when MONGO_URI does not name one
    #[arg(long, default_value = "test")]
    database: String,

    /// Collection holding the product documents
    #[arg(long, default_value = "products")]
    collection: String,

    /// Weaviate class holding the product objects
    #[arg(long = "class", default_value = "Product")]
    class_name: String,

    /// Field joining documents to objects (same name on both sides)
    #[arg(long, default_value = "name")]
    name_field: String,

    /// Document field receiving the Weaviate id
    #[arg(long, default_value = "weaviateId")]
    cross_ref_field: String,

    /// Which object to take when several share a name: first, smallest or unique
    #[arg(long, default_value_t = MatchPolicy::FirstReturned)]
    match_policy: MatchPolicy,

    /// Scheme for a WEAVIATE_HOST given without one
    #[arg(long, default_value = "https")]
    scheme: String,

    /// Timeout for each Weaviate request; unbounded when omitted
    #[arg(long)]
    http_timeout_secs: Option<u64>,

    /// Look everything up but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    telemetry::init_tracing(cli.verbose);

    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("⚠️  Failed to load .env: {}", e),
    }

    // Checked before anything touches the network
    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> Result<SyncConfig> {
    let layout = CollectionLayout {
        database: cli.database.clone(),
        collection: cli.collection.clone(),
        name_field: cli.name_field.clone(),
        cross_ref_field: cli.cross_ref_field.clone(),
    };

    let config = SyncConfig::from_env()?
        .with_layout(layout)
        .with_class_name(cli.class_name.clone())
        .with_match_policy(cli.match_policy)
        .with_scheme(cli.scheme.clone())
        .with_http_timeout(cli.http_timeout_secs.map(Duration::from_secs))
        .with_dry_run(cli.dry_run);
    config.validate()?;
    Ok(config)
}

async fn run(config: &SyncConfig) -> Result<()> {
    info!(
        "Starting sync: class '{}', match policy '{}'",
        config.class_name, config.match_policy
    );

    let (store, index) = reconciler::connect(config)
        .await
        .context("failed to connect")?;

    Reconciler::new(&store, &index, config)
        .run()
        .await
        .context("sync aborted")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["weaviate-sync"]).unwrap();
        assert_eq!(cli.collection, "products");
        assert_eq!(cli.class_name, "Product");
        assert_eq!(cli.cross_ref_field, "weaviateId");
        assert_eq!(cli.match_policy, MatchPolicy::FirstReturned);
        assert!(!cli.dry_run);
        assert_eq!(cli.http_timeout_secs, None);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "weaviate-sync",
            "--match-policy",
            "unique",
            "--class",
            "Item",
            "--dry-run",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.match_policy, MatchPolicy::RequireUnique);
        assert_eq!(cli.class_name, "Item");
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["weaviate-sync", "--match-policy", "newest"]).is_err());
    }
}
