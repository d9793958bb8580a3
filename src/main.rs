mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use famcal_core::DateWindow;
use famcal_core::config::FamcalConfig;
use famcal_core::store::{JsonStore, StoreDocument};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "famcal")]
#[command(about = "Browse your family's agenda and export events to other calendar apps")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show upcoming occurrences, one line per event per day
    Agenda {
        /// Family to show (defaults to `default_family` from config)
        #[arg(short, long)]
        family: Option<String>,

        /// First day to show (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        from: Option<String>,

        /// Last day to show (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Write one event as an .ics file
    Export {
        /// Event id
        id: String,

        #[arg(short, long)]
        family: Option<String>,

        /// IANA timezone for timed events (e.g. "America/New_York")
        #[arg(long)]
        tz: Option<String>,

        /// Use this profile's preferred timezone
        #[arg(short, long)]
        profile: Option<String>,

        /// Output path, or "-" for stdout (defaults to <title>.ics)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print a short human description of an event
    Describe {
        /// Event id
        id: String,

        #[arg(short, long)]
        family: Option<String>,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config()?;
    let store = JsonStore::new(config.events_path());

    match cli.command {
        Commands::Agenda { family, from, to } => {
            let document = store.load()?;
            let family = resolve_family(&document, family.as_deref(), &config)?;
            let window = DateWindow::from_args(from.as_deref(), to.as_deref(), config.agenda_days)?;
            commands::agenda::run(&document, &family, &window)
        }
        Commands::Export {
            id,
            family,
            tz,
            profile,
            output,
        } => {
            let document = store.load()?;
            let family = resolve_family(&document, family.as_deref(), &config)?;
            let options = commands::export::ExportOptions {
                tz,
                profile,
                output,
                fallback_timezone: fallback_timezone(&config),
            };
            commands::export::run(&document, &family, &id, &options)
        }
        Commands::Describe { id, family } => {
            let document = store.load()?;
            let family = resolve_family(&document, family.as_deref(), &config)?;
            commands::describe::run(&document, &family, &id)
        }
    }
}

/// Load config, writing a commented default file on first run.
fn load_config() -> Result<FamcalConfig> {
    let config_path = FamcalConfig::config_path()?;
    if !config_path.exists() {
        FamcalConfig::create_default_config(&config_path)?;
        tracing::info!(path = %config_path.display(), "created default config");
    }
    Ok(FamcalConfig::load_from(&config_path)?)
}

/// Zone used when neither --tz nor a profile preference applies.
fn fallback_timezone(config: &FamcalConfig) -> String {
    config
        .default_timezone
        .clone()
        .or_else(|| iana_time_zone::get_timezone().ok())
        .unwrap_or_else(|| "UTC".to_string())
}

/// Pick the family: the flag, then config, then the only family in the store.
fn resolve_family(
    document: &StoreDocument,
    flag: Option<&str>,
    config: &FamcalConfig,
) -> Result<String> {
    let available = document.family_ids();

    let family = match flag.or(config.default_family.as_deref()) {
        Some(id) => id.to_string(),
        None => match available.as_slice() {
            [only] => only.clone(),
            [] => anyhow::bail!("No families found in {}", config.events_path().display()),
            _ => anyhow::bail!(
                "Several families found, pick one with --family. Available: {}",
                available.join(", ")
            ),
        },
    };

    if !available.contains(&family) {
        anyhow::bail!(
            "Family '{}' not found. Available: {}",
            family,
            available.join(", ")
        );
    }

    Ok(family)
}
