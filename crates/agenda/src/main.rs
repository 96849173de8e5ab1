use anyhow::{Context, Result};
use calendario::{CalendarCursor, GridRenderer, Navigator, ViewRecorder};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod auth;
mod config;
mod error;
mod html;
mod server;
mod store;
mod text;
mod types;

use config::Config;
use html::RangeInputs;
use text::TextRenderer;

#[derive(Parser, Debug)]
#[command(name = "agenda")]
#[command(about = "Month calendar with range highlighting and per-user commitments")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding per-user commitment files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory served for unmatched paths
    #[arg(long, global = true)]
    static_dir: Option<PathBuf>,

    /// Credentials file used by /login
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print a month grid, or write it as an HTML page
    Show {
        /// Month, 1-12
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Year, checked like the year input on the page
        #[arg(short, long)]
        year: Option<String>,

        /// Range start, YYYY-MM-DD
        #[arg(long, default_value = "")]
        start: String,

        /// Range end, YYYY-MM-DD
        #[arg(long, default_value = "")]
        end: String,

        /// Months to move after positioning
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        nav: i32,

        /// Write an HTML page here instead of printing
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Validate a file of commitments
    Check {
        /// JSON file holding one commitment or an array of them
        file: PathBuf,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{log_level},hyper=warn,tower_http=warn")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_max_level(Level::TRACE)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    let config =
        Config::from_env()?.with_overrides(args.data_dir, args.static_dir, args.credentials);

    match args.command {
        // Default to serve if no command specified
        None => {
            server::serve(config).await?;
        }
        Some(Commands::Serve { port }) => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            server::serve(config).await?;
        }
        Some(Commands::Show {
            month,
            year,
            start,
            end,
            nav,
            html,
        }) => {
            let today = CalendarCursor::today();
            let month = month.map(|m| m - 1).unwrap_or(today.month());
            let mut cursor = CalendarCursor::new(month, today.year())?;
            if let Some(text) = year.as_deref() {
                cursor = cursor.set_year(text)?;
            }

            match html {
                Some(path) => {
                    let recorder = show(cursor, ViewRecorder::default(), &start, &end, nav);
                    let (view, _) = recorder.into_parts();
                    let view = view.context("No month was rendered")?;
                    html::generate_html(&view, RangeInputs { start: &start, end: &end }, &path)?;
                    info!(path = %path.display(), label = %view.label, "HTML saved");
                }
                None => {
                    let renderer = show(cursor, TextRenderer::default(), &start, &end, nav);
                    print!("{}", renderer.into_output());
                }
            }
        }
        Some(Commands::Check { file }) => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let payload: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON in {}", file.display()))?;

            match types::commitments_from_payload(payload) {
                Ok(commitments) => {
                    for commitment in &commitments {
                        info!(
                            task = %commitment.task,
                            start = %commitment.start_date,
                            end = %commitment.end_date,
                            importance = ?commitment.importance,
                            weight = commitment.importance.weight(),
                            "Commitment ok"
                        );
                    }
                    info!(count = commitments.len(), "All commitments valid");
                }
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Invalid commitment");
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

/// Render the month `nav` months away from `cursor` exactly once
fn show<R: GridRenderer>(
    cursor: CalendarCursor,
    renderer: R,
    start: &str,
    end: &str,
    nav: i32,
) -> R {
    let mut navigator = Navigator::new(cursor, renderer).with_range(start, end);
    navigator.navigate(nav);
    navigator.into_renderer()
}
