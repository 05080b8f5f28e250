use balance_sheet_briefing::export::{export_records, load_raw_reports, save_raw_reports};
use balance_sheet_briefing::server::{serve, AppState};
use balance_sheet_briefing::source::SupabaseSource;
use balance_sheet_briefing::{BriefingConfig, BriefingError, BriefingPipeline, ZeroGuard};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "briefing", version, about = "Balance sheet ratios and briefings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a raw snapshot and write the flat records as JSON
    Export {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Keep zero or missing totals instead of substituting 1
        #[arg(long)]
        passthrough_zeros: bool,
    },

    /// Print the markdown briefing for the sheet nearest to a date
    Report {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        date: String,

        #[arg(long)]
        passthrough_zeros: bool,
    },

    /// Download the balance sheet table into a raw snapshot file
    Fetch {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run the JSON API
    Serve {
        /// Serve from a raw snapshot file instead of Supabase
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Overrides BIND_ADDRESS
        #[arg(long)]
        bind: Option<String>,

        #[arg(long)]
        passthrough_zeros: bool,
    },
}

fn zero_guard(passthrough_zeros: bool) -> ZeroGuard {
    if passthrough_zeros {
        ZeroGuard::Passthrough
    } else {
        ZeroGuard::default()
    }
}

fn pipeline(passthrough_zeros: bool) -> BriefingPipeline {
    BriefingPipeline::new(zero_guard(passthrough_zeros))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = BriefingConfig::from_env()?;

    match cli.command {
        Command::Export {
            input,
            output,
            passthrough_zeros,
        } => {
            let raw = load_raw_reports(&input)?;
            let records = pipeline(passthrough_zeros).records(&raw)?;
            export_records(&records, &output)?;
        }
        Command::Report {
            input,
            date,
            passthrough_zeros,
        } => {
            let raw = load_raw_reports(&input)?;
            let briefing = pipeline(passthrough_zeros).briefing(&raw, &date)?;
            println!("{}", briefing.markdown);
        }
        Command::Fetch { output } => {
            let settings = config.supabase.as_ref().ok_or_else(|| {
                BriefingError::ConfigError("SUPABASE_URL and SUPABASE_KEY must be set".to_string())
            })?;
            let source = SupabaseSource::new(settings)?;
            let raw = source.fetch_balance_sheets().await?;
            save_raw_reports(&raw, &output)?;
        }
        Command::Serve {
            snapshot,
            bind,
            passthrough_zeros,
        } => {
            let bind_address = bind.unwrap_or_else(|| config.bind_address.clone());
            let state = AppState::from_config(&config, snapshot)?
                .with_zero_guard(zero_guard(passthrough_zeros));
            let state = Arc::new(state);
            info!("Starting server v{}", env!("CARGO_PKG_VERSION"));
            serve(state, &bind_address).await?;
        }
    }

    Ok(())
}
