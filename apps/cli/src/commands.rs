//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use swiftcodes_core::{ParseMode, Registry, SeedOutcome, parse_csv};
use swiftcodes_shared::{AppConfig, init_config, load_config, load_config_from};
use swiftcodes_storage::Storage;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// swiftcodes: SWIFT/BIC code registry.
#[derive(Parser)]
#[command(
    name = "swiftcodes",
    version,
    about = "Load SWIFT/BIC codes from CSV and serve headquarters/branch lookups.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.swiftcodes/swiftcodes.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Database location override.
#[derive(Args, Clone, Debug)]
pub(crate) struct StoreArgs {
    /// Path to the registry database.
    #[arg(long, env = "SWIFTCODES_DB")]
    pub db: Option<PathBuf>,
}

/// Canonical source overrides.
#[derive(Args, Clone, Debug)]
pub(crate) struct SourceArgs {
    /// CSV file used to seed an empty registry.
    #[arg(long, env = "SWIFTCODES_CSV")]
    pub csv: Option<PathBuf>,

    /// Skip malformed rows instead of aborting the load.
    #[arg(long)]
    pub skip_invalid_rows: bool,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Seed the registry if empty, then serve the HTTP API.
    Serve {
        /// Address to bind, e.g. 0.0.0.0:8080.
        #[arg(long, env = "SWIFTCODES_BIND")]
        bind: Option<String>,

        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Seed the registry from the canonical CSV if it is empty.
    Seed {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Look up one code (headquarters include their branches).
    Lookup {
        /// 8- or 11-character SWIFT code.
        code: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// List all codes for a country.
    Country {
        /// Two-letter country code (case-insensitive).
        iso2: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Delete one code.
    Delete {
        /// Exact SWIFT code to remove.
        code: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "swiftcodes=info",
        1 => "swiftcodes=debug,tower_http=debug",
        _ => "swiftcodes=trace,tower_http=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Serve {
            bind,
            store,
            source,
        } => cmd_serve(&config, bind, &store, &source).await,
        Command::Seed { store, source } => cmd_seed(&config, &store, &source).await,
        Command::Lookup { code, store } => cmd_lookup(&config, &code, &store).await,
        Command::Country { iso2, store } => cmd_country(&config, &iso2, &store).await,
        Command::Delete { code, store } => cmd_delete(&config, &code, &store).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

// ---------------------------------------------------------------------------
// Option resolution (flags > config file > defaults)
// ---------------------------------------------------------------------------

fn db_path(config: &AppConfig, store: &StoreArgs) -> PathBuf {
    store
        .db
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.storage.database_path))
}

fn csv_path(config: &AppConfig, source: &SourceArgs) -> PathBuf {
    source
        .csv
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.seed.csv_path))
}

fn parse_mode(config: &AppConfig, source: &SourceArgs) -> ParseMode {
    if source.skip_invalid_rows || config.seed.skip_invalid_rows {
        ParseMode::SkipInvalid
    } else {
        ParseMode::FailFast
    }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Parse the canonical CSV and seed `registry` if it is empty.
///
/// Any parse error is returned before a single record is written.
async fn seed_from_csv(registry: &Registry, csv: &Path, mode: ParseMode) -> Result<SeedOutcome> {
    let spinner = spinner(format!("Parsing {}", csv.display()));
    seed_with_progress(registry, csv, mode, &spinner).await
}

/// The spinner is cleared on every exit path, so it never lingers above an
/// error report.
async fn seed_with_progress(
    registry: &Registry,
    csv: &Path,
    mode: ParseMode,
    spinner: &ProgressBar,
) -> Result<SeedOutcome> {
    let result = load_and_seed(registry, csv, mode, spinner).await;
    spinner.finish_and_clear();
    result
}

async fn load_and_seed(
    registry: &Registry,
    csv: &Path,
    mode: ParseMode,
    spinner: &ProgressBar,
) -> Result<SeedOutcome> {
    let parsed = parse_csv(csv, mode)
        .wrap_err_with(|| format!("failed to load canonical source {}", csv.display()))?;
    if !parsed.skipped.is_empty() {
        tracing::warn!(skipped = parsed.skipped.len(), "invalid rows skipped");
    }

    spinner.set_message(format!("Seeding {} records", parsed.records.len()));
    Ok(registry.seed(&parsed.records).await?)
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        let ticks = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        spinner.set_style(style.tick_strings(&ticks));
    }
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(message);
    spinner
}

fn print_seed_outcome(outcome: &SeedOutcome) {
    match outcome {
        SeedOutcome::Seeded {
            inserted,
            duplicates,
        } => {
            println!("  Registry seeded: {inserted} records ({duplicates} duplicates skipped)");
        }
        SeedOutcome::AlreadyPopulated { existing } => {
            println!("  Registry already holds {existing} records; seed skipped");
        }
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_serve(
    config: &AppConfig,
    bind: Option<String>,
    store: &StoreArgs,
    source: &SourceArgs,
) -> Result<()> {
    let db = db_path(config, store);
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());

    let registry = Arc::new(Registry::new(Storage::open(&db).await?));

    // Seeding completes before the listener exists, so no request can race it.
    let outcome = seed_from_csv(&registry, &csv_path(config, source), parse_mode(config, source))
        .await?;
    print_seed_outcome(&outcome);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .wrap_err_with(|| format!("failed to bind {bind}"))?;
    info!(%bind, db = %db.display(), "serving swift code registry");
    println!("  Listening on http://{bind}/v1/swift-codes");

    axum::serve(listener, swiftcodes_api::router(registry))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| eyre!("server error: {e}"))?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

async fn cmd_seed(config: &AppConfig, store: &StoreArgs, source: &SourceArgs) -> Result<()> {
    let db = db_path(config, store);
    let registry = Registry::new(Storage::open(&db).await?);

    let outcome =
        seed_from_csv(&registry, &csv_path(config, source), parse_mode(config, source)).await?;
    print_seed_outcome(&outcome);
    Ok(())
}

async fn cmd_lookup(config: &AppConfig, code: &str, store: &StoreArgs) -> Result<()> {
    let registry = Registry::new(Storage::open_readonly(&db_path(config, store)).await?);
    let detail = registry.get_by_code(code).await?;
    println!("{}", serde_json::to_string_pretty(&detail)?);
    Ok(())
}

async fn cmd_country(config: &AppConfig, iso2: &str, store: &StoreArgs) -> Result<()> {
    let registry = Registry::new(Storage::open_readonly(&db_path(config, store)).await?);
    let codes = registry.get_by_country(iso2).await?;
    println!("{}", serde_json::to_string_pretty(&codes)?);
    Ok(())
}

async fn cmd_delete(config: &AppConfig, code: &str, store: &StoreArgs) -> Result<()> {
    let registry = Registry::new(Storage::open(&db_path(config, store)).await?);
    registry.delete(code).await?;
    println!("  Deleted {code}");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_serve_overrides() {
        let cli = Cli::try_parse_from([
            "swiftcodes",
            "serve",
            "--bind",
            "127.0.0.1:9090",
            "--db",
            "/tmp/x.db",
            "--skip-invalid-rows",
        ])
        .expect("parse args");
        match cli.command {
            Command::Serve {
                bind,
                store,
                source,
            } => {
                assert_eq!(bind.as_deref(), Some("127.0.0.1:9090"));
                assert_eq!(store.db, Some(PathBuf::from("/tmp/x.db")));
                assert!(source.skip_invalid_rows);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn flags_override_config() {
        let config = AppConfig::default();
        let store = StoreArgs {
            db: Some(PathBuf::from("/tmp/override.db")),
        };
        assert_eq!(db_path(&config, &store), PathBuf::from("/tmp/override.db"));

        let store = StoreArgs { db: None };
        assert_eq!(db_path(&config, &store), PathBuf::from("var/swift_codes.db"));

        let source = SourceArgs {
            csv: None,
            skip_invalid_rows: false,
        };
        assert_eq!(parse_mode(&config, &source), ParseMode::FailFast);
        assert_eq!(csv_path(&config, &source), PathBuf::from("data/swift_codes.csv"));
    }

    async fn temp_registry(name: &str) -> Registry {
        let path = std::env::temp_dir().join(format!(
            "swiftcodes_cli_{name}_{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        Registry::new(Storage::open(&path).await.expect("open test db"))
    }

    #[tokio::test]
    async fn spinner_is_cleared_when_parsing_fails() {
        let registry = temp_registry("parse_error").await;
        let spinner = ProgressBar::hidden();

        let result = seed_with_progress(
            &registry,
            Path::new("does/not/exist.csv"),
            ParseMode::FailFast,
            &spinner,
        )
        .await;
        assert!(result.is_err());
        assert!(spinner.is_finished());
        assert_eq!(registry.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn spinner_is_cleared_after_seeding() {
        let registry = temp_registry("seeded").await;
        let spinner = ProgressBar::hidden();

        let outcome = seed_with_progress(
            &registry,
            Path::new("../../fixtures/csv/swift_codes.fixture.csv"),
            ParseMode::FailFast,
            &spinner,
        )
        .await
        .unwrap();
        assert_eq!(
            outcome,
            SeedOutcome::Seeded {
                inserted: 4,
                duplicates: 0
            }
        );
        assert!(spinner.is_finished());
    }
}
