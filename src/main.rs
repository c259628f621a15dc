//! # Slipline CLI
//!
//! Command-line interface for serial receipt printers.
//!
//! ## Usage
//!
//! ```bash
//! # List serial ports and which ones are granted
//! slipline ports
//!
//! # Choose a printer (interactive) or name it directly
//! slipline connect
//! slipline connect --port /dev/ttyUSB0
//!
//! # Print a bag label from a JSON fields file
//! slipline print bag-label label.json
//!
//! # Print several documents with a pause between them
//! slipline batch jobs.json
//!
//! # Serve the HTTP API for a host UI
//! slipline serve --listen 127.0.0.1:8080
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use slipline::{
    ConnectionManager, PrinterProfile, SliplineError,
    config::Settings,
    connection::ManagerOptions,
    document::PrintDocument,
    server::{self, ServerConfig},
    store::FileStore,
    templates::{self, TemplateKind},
    transport::{NamedPortPicker, PortChoice, PortInfo, PortPicker, SerialTransport, Transport},
};

/// Slipline - Serial receipt printer utility
#[derive(Parser, Debug)]
#[command(name = "slipline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (JSON); missing file means defaults
    #[arg(long, global = true, default_value = "slipline.json")]
    config: PathBuf,

    /// Override where the last connection is remembered
    #[arg(long, global = true, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Override where granted ports are kept
    #[arg(long, global = true, value_name = "FILE")]
    grants: Option<PathBuf>,

    /// Characters per line (32 for 58mm paper, 48 for 80mm)
    #[arg(long, global = true, value_parser = parse_columns)]
    columns: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List serial ports
    Ports,

    /// Show the session and remembered connection
    Status,

    /// Connect, asking for a port if no granted port works
    Connect {
        /// Port to grant and use instead of asking
        #[arg(long)]
        port: Option<String>,
    },

    /// Reopen the remembered printer without asking
    Reconnect,

    /// Close the printer and forget it
    Disconnect,

    /// Drop the session but keep the remembered printer
    Reset,

    /// Find the baud rate the printer answers at
    Diagnose,

    /// Print one document
    Print {
        /// Template name (omit to list templates)
        template: Option<String>,

        /// JSON file with the template fields
        fields: Option<PathBuf>,
    },

    /// Print several documents with a pause between them
    Batch {
        /// JSON file: [{"template": "...", "fields": {...}}, ...]
        jobs: PathBuf,
    },

    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), SliplineError> {
    let cli = Cli::parse();

    let mut settings = Settings::load(&cli.config)?;
    if let Some(store) = cli.store {
        settings.store_path = store;
    }
    if let Some(grants) = cli.grants {
        settings.grants_path = grants;
    }
    if let Some(columns) = cli.columns {
        settings.columns = columns;
    }

    let transport = Arc::new(
        SerialTransport::new(Some(settings.grants_path.clone()))
            .with_timeout(settings.port_timeout()),
    );
    let manager = Arc::new(ConnectionManager::new(
        transport.clone(),
        Arc::new(FileStore::new(&settings.store_path)),
        ManagerOptions::try_from(&settings)?,
    ));

    match cli.command {
        Commands::Ports => {
            let granted = transport.enumerate().await?;
            let available = transport.available().await?;
            if available.is_empty() {
                println!("No serial ports found.");
            }
            for info in available {
                let mark = if granted.iter().any(|p| p.id() == info.name) {
                    "*"
                } else {
                    " "
                };
                println!("{} {}", mark, info);
            }
        }

        Commands::Status => {
            println!("Connected: {}", manager.is_connected().await);
            if let (Some(port), Some(baud)) = (manager.port_name().await, manager.baud().await) {
                println!("Port: {} @ {}", port, baud);
            }
            match manager.persistent_connection_info() {
                Some(info) => println!(
                    "Remembered: {} since {}",
                    info.port_name,
                    info.connected_at.format("%Y-%m-%d %H:%M:%S UTC")
                ),
                None => println!("Remembered: none"),
            }
        }

        Commands::Connect { port } => {
            let status = match port {
                Some(name) => manager.connect(&NamedPortPicker::new(Some(name))).await,
                None => manager.connect(&StdinPicker).await,
            };
            print_json(&status)?;
        }

        Commands::Reconnect => print_json(&manager.quick_reconnect().await)?,

        Commands::Disconnect => {
            manager.disconnect().await;
            println!("Disconnected.");
        }

        Commands::Reset => {
            manager.force_reset().await;
            println!("Session reset.");
        }

        Commands::Diagnose => {
            require_connection(&manager).await?;
            print_json(&manager.negotiate_baud().await?)?;
        }

        Commands::Print { template, fields } => {
            let (Some(template), Some(fields)) = (template, fields) else {
                println!("Available templates:");
                for name in templates::list_templates() {
                    println!("  {}", name);
                }
                return Ok(());
            };

            let doc = render(&template, read_json(&fields)?, &settings)?;
            require_connection(&manager).await?;
            manager.print_document(&doc).await?;
            println!("Printed {}.", doc.template());
        }

        Commands::Batch { jobs } => {
            let jobs: Vec<Job> = serde_json::from_value(read_json(&jobs)?)?;
            let docs = jobs
                .into_iter()
                .map(|job| render(&job.template, job.fields, &settings))
                .collect::<Result<Vec<_>, _>>()?;
            let total = docs.len();

            require_connection(&manager).await?;
            let mut outcomes = manager.print_batch(docs);
            while let Some(outcome) = outcomes.recv().await {
                match &outcome.error {
                    None => println!("[{}/{}] {} printed", outcome.index + 1, total, outcome.template),
                    Some(e) => println!("[{}/{}] {} failed: {}", outcome.index + 1, total, outcome.template, e),
                }
            }
        }

        Commands::Serve { listen } => {
            // The UI can retry through the API.
            let status = manager.quick_reconnect().await;
            if !status.connected {
                tracing::info!(error = ?status.error, "Starting without a printer");
            }
            server::serve(ServerConfig { listen_addr: listen }, manager).await?;
        }
    }

    Ok(())
}

/// One entry of a batch file.
#[derive(Debug, Deserialize)]
struct Job {
    template: String,
    fields: serde_json::Value,
}

fn render(
    template: &str,
    fields: serde_json::Value,
    settings: &Settings,
) -> Result<PrintDocument, SliplineError> {
    let kind = TemplateKind::from_name(template).ok_or_else(|| {
        SliplineError::InvalidDocument(format!(
            "Unknown template '{}'. Run `slipline print` to list templates.",
            template
        ))
    })?;
    templates::render_json(kind, fields, &settings.profile()?)
}

/// Quick reconnect unless already connected.
async fn require_connection(manager: &ConnectionManager) -> Result<(), SliplineError> {
    if manager.is_connected().await {
        return Ok(());
    }
    let status = manager.quick_reconnect().await;
    if status.connected {
        Ok(())
    } else {
        Err(SliplineError::NoPersistentConnection {
            last_error: status.error,
        })
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value, SliplineError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), SliplineError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Asks on the terminal: a number picks, empty input picks nothing, `q`
/// cancels.
struct StdinPicker;

#[async_trait]
impl PortPicker for StdinPicker {
    async fn pick(&self, ports: &[PortInfo]) -> PortChoice {
        let listing: Vec<String> = ports.iter().map(|p| p.to_string()).collect();
        tokio::task::spawn_blocking(move || prompt(&listing))
            .await
            .unwrap_or(PortChoice::Cancelled)
    }
}

fn prompt(ports: &[String]) -> PortChoice {
    if ports.is_empty() {
        println!("No serial ports found.");
        return PortChoice::Nothing;
    }

    println!("Select a printer port:");
    for (i, port) in ports.iter().enumerate() {
        println!("  {}) {}", i + 1, port);
    }
    print!("Number (Enter for none, q to cancel): ");
    let _ = io::stdout().flush();

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return PortChoice::Cancelled;
    }
    parse_choice(line.trim(), ports.len())
}

fn parse_columns(value: &str) -> Result<usize, String> {
    let columns: usize = value.parse().map_err(|e: std::num::ParseIntError| e.to_string())?;
    match PrinterProfile::for_columns(columns) {
        Some(_) => Ok(columns),
        None => Err("supported widths are 32 (58mm) and 48 (80mm)".to_string()),
    }
}

fn parse_choice(input: &str, len: usize) -> PortChoice {
    if input.eq_ignore_ascii_case("q") {
        return PortChoice::Cancelled;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => PortChoice::Selected(n - 1),
        _ => PortChoice::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("2", 3), PortChoice::Selected(1));
        assert_eq!(parse_choice("", 3), PortChoice::Nothing);
        assert_eq!(parse_choice("9", 3), PortChoice::Nothing);
        assert_eq!(parse_choice("Q", 3), PortChoice::Cancelled);
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from(["slipline", "--columns", "32", "print", "bag-label", "f.json"]);
        assert_eq!(cli.columns, Some(32));
        assert!(matches!(cli.command, Commands::Print { .. }));
    }

    #[test]
    fn test_cli_rejects_unsupported_columns() {
        assert!(Cli::try_parse_from(["slipline", "--columns", "42", "status"]).is_err());
        assert!(Cli::try_parse_from(["slipline", "--columns", "48", "status"]).is_ok());
    }
}
