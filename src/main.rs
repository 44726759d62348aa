use anyhow::{Context, Result, anyhow};
use tokio::sync::mpsc;
use tracing::{error, info};

use daybrief::api::AppState;
use daybrief::{
    Dashboard, DashboardState, DaybriefConfig, DaybriefError, NoGeolocation, Services, VERSION,
    logging, web,
};

const EVENT_QUEUE: usize = 32;

enum Command {
    Serve { port: Option<u16> },
    Snapshot,
    Help,
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut rest = args.iter().skip(1).map(String::as_str).peekable();
    let command = match rest.peek().copied() {
        Some("snapshot") => return Ok(Command::Snapshot),
        Some("--help" | "-h" | "help") => return Ok(Command::Help),
        Some("serve") => {
            rest.next();
            "serve"
        }
        _ => "serve",
    };

    let mut port = None;
    while let Some(arg) = rest.next() {
        match arg {
            "--port" => {
                let value = rest
                    .next()
                    .ok_or_else(|| anyhow!("--port needs a value"))?;
                port = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid port '{value}'"))?,
                );
            }
            other => return Err(anyhow!("Unknown argument '{other}' for {command}")),
        }
    }
    Ok(Command::Serve { port })
}

fn print_help() {
    println!("Daybrief v{VERSION}");
    println!();
    println!("Usage: daybrief [COMMAND]");
    println!();
    println!("Commands:");
    println!("  serve [--port N]  Run the dashboard web server (default)");
    println!("  snapshot          Load every panel once and print the JSON snapshot");
    println!("  help              Print this help message");
    println!();
    println!("Configuration is read from $XDG_CONFIG_HOME/daybrief/config.toml and");
    println!("DAYBRIEF_* environment variables, e.g. DAYBRIEF_WEATHER__API_KEY.");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("daybrief: {e}. Use: daybrief --help");
            std::process::exit(2);
        }
    };

    if let Command::Help = command {
        print_help();
        return Ok(());
    }

    let (config, config_error) = match DaybriefConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (DaybriefConfig::default(), Some(e)),
    };
    logging::init(&config.logging)?;

    match command {
        Command::Snapshot => {
            if let Some(e) = config_error {
                return Err(e);
            }
            snapshot(&config).await
        }
        Command::Serve { port } => serve(config, config_error, port).await,
        Command::Help => Ok(()),
    }
}

async fn snapshot(config: &DaybriefConfig) -> Result<()> {
    let services = Services::from_config(config).context("Failed to build HTTP client")?;
    let state = DashboardState::new();
    let report = Dashboard::new(services, state.clone(), NoGeolocation, config)
        .load_all()
        .await;
    info!(?report, "Snapshot loaded");

    let json = serde_json::to_string_pretty(&state.snapshot())
        .context("Failed to serialize snapshot")?;
    println!("{json}");
    Ok(())
}

async fn serve(
    mut config: DaybriefConfig,
    config_error: Option<anyhow::Error>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = DashboardState::new();
    let (events, receiver) = mpsc::channel(EVENT_QUEUE);

    // A dashboard that cannot start still serves the page so the modal shows
    let startup = match config_error {
        Some(e) => Err(DaybriefError::config(format!("{e:#}"))),
        None => Services::from_config(&config).map_err(|e| DaybriefError::server(e.to_string())),
    };
    match startup {
        Ok(services) => {
            let dashboard = Dashboard::new(services, state.clone(), NoGeolocation, &config);
            tokio::spawn(dashboard.run(receiver));
            info!(
                "Dashboard started, refreshing every {}s",
                config.refresh.interval_seconds
            );
        }
        Err(e) => {
            error!("Failed to initialize dashboard: {e}");
            state.set_fatal(e.user_message());
            drop(receiver);
        }
    }

    web::run(
        &config.server,
        AppState {
            dashboard: state,
            events,
        },
    )
    .await
    .context("Web server stopped")
}
