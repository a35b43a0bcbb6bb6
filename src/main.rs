use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use finboard_lib::{
    discover,
    utils::logging::{debug_from_env, init_logging},
    widgets::render,
    CustomWidget, DisplayMode, FieldPath, HttpFetcher, PollController, PollStatus, Settings,
    SettingsStore, WidgetConfig,
};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "finboard", about = "Poll arbitrary JSON APIs as dashboard widgets")]
struct Args {
    /// Settings file (JSON). Defaults apply when omitted or missing.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a URL once and list its fields with sample values
    Discover { url: String },
    /// Poll an endpoint and print the selected fields on every update
    Watch {
        /// Endpoint to poll; ignored when --config is given
        url: Option<String>,
        /// Field path to display (repeatable)
        #[arg(short, long = "field")]
        fields: Vec<String>,
        /// Widget or widget-config JSON file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Refresh interval in seconds
        #[arg(short, long)]
        interval: Option<u64>,
        #[arg(short, long, default_value = "card")]
        mode: DisplayMode,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(debug_from_env());
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => SettingsStore::new(path.clone())?.get()?,
        None => Settings::default(),
    };
    let fetcher = Arc::new(HttpFetcher::new(settings.http_config())?);

    match args.command {
        Command::Discover { url } => {
            let result = discover(fetcher.as_ref(), &url, &settings.discovery).await;
            println!("{}", result.summary());
            if !result.success {
                std::process::exit(1);
            }
            if let Some(data) = &result.data {
                for field in &result.fields {
                    println!("{field}\t{}", finboard_lib::value_at(data, field.as_str()));
                }
            }
        }
        Command::Watch {
            url,
            fields,
            config,
            interval,
            mode,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => {
                    let Some(url) = url else {
                        bail!("either a URL or --config is required");
                    };
                    WidgetConfig::new(url, fields.into_iter().map(FieldPath::from).collect())
                        .with_refresh_interval_ms(settings.default_refresh_interval_ms)
                        .with_display_mode(mode)
                }
            };
            let config = match interval {
                Some(secs) => config.with_refresh_interval_ms(secs.saturating_mul(1_000)),
                None => config,
            };
            watch(fetcher, config).await?;
        }
    }

    Ok(())
}

/// Accepts a full dashboard widget entry or a bare widget config.
fn load_config(path: &Path) -> Result<WidgetConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read widget config from {}", path.display()))?;
    if let Ok(widget) = serde_json::from_str::<CustomWidget>(&contents) {
        return Ok(widget.config);
    }
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a widget config", path.display()))
}

async fn watch(fetcher: Arc<HttpFetcher>, config: WidgetConfig) -> Result<()> {
    let mut poller = PollController::new(fetcher);
    let mut rx = poller.subscribe();
    let fields = config.display_fields.clone();
    let mode = config.display_mode;
    poller.start(config)?;

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                match state.status {
                    PollStatus::Ready => {
                        if let (Some(record), Some(at)) = (&state.record, state.last_updated) {
                            println!("-- {}", at.to_rfc3339());
                            println!("{}", render::render(mode, &fields, record));
                        }
                    }
                    PollStatus::Error => {
                        eprintln!("error: {}", state.error.unwrap_or_default());
                    }
                    PollStatus::Idle | PollStatus::Loading => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping");
                break;
            }
        }
    }

    poller.stop().await
}
