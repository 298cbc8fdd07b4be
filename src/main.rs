use clap::{Parser, Subcommand};
use serial_session::config::{Config, ConfigLoader};
use serial_session::logging::init_logging;
use serial_session::{available_ports, PortInfo, ReadOptions, SerialData, Session};
use std::io::Write;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Open, monitor and write to serial ports.",
    long_about = "Lists serial ports, streams what a port receives to stdout, and sends text or raw bytes. Defaults come from serial-session.toml; see SERIAL_SESSION_* environment variables for overrides."
)]
struct Cli {
    /// Configuration file (otherwise resolved from the usual locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List serial ports present on this machine
    List {
        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print everything a port receives until Ctrl+C
    Monitor {
        /// Port path or configured alias
        port: String,
        #[arg(short, long)]
        baud: Option<u32>,
        /// Print bytes as hex instead of decoding them
        #[arg(long)]
        raw: bool,
        /// Bytes requested per read
        #[arg(long)]
        read_size: Option<usize>,
    },
    /// Write text (or hex bytes) to a port and exit
    Send {
        /// Port path or configured alias
        port: String,
        data: String,
        #[arg(short, long)]
        baud: Option<u32>,
        /// Treat DATA as hex bytes, e.g. "02 41 03"
        #[arg(long)]
        hex: bool,
    },
}

#[tokio::main]
async fn main() -> CliResult {
    let cli = Cli::parse();
    let loader = match &cli.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    let config = loader.into_config();
    init_logging(&config.logging, cli.verbose)?;

    match cli.command {
        Command::List { json } => list(json).await,
        Command::Monitor {
            port,
            baud,
            raw,
            read_size,
        } => monitor(&config, &port, baud, raw, read_size).await,
        Command::Send {
            port,
            data,
            baud,
            hex,
        } => send(&config, &port, &data, baud, hex).await,
    }
}

async fn list(json: bool) -> CliResult {
    let ports = available_ports().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }
    if ports.is_empty() {
        println!("No serial ports found.");
    }
    for port in &ports {
        println!("{}", describe(port));
    }
    Ok(())
}

fn describe(port: &PortInfo) -> String {
    let mut line = format!("{:<20} {}", port.path, port.port_type);
    if let (Some(vid), Some(pid)) = (&port.vid, &port.pid) {
        line.push_str(&format!(" {vid}:{pid}"));
    }
    for detail in [&port.manufacturer, &port.product, &port.serial_number]
        .into_iter()
        .flatten()
    {
        line.push_str(&format!(" {detail}"));
    }
    line
}

async fn monitor(
    config: &Config,
    port: &str,
    baud: Option<u32>,
    raw: bool,
    read_size: Option<usize>,
) -> CliResult {
    let mut session = Session::new(config.session_options(port, baud));
    session.open().await?;

    let streamed = stream(&mut session, raw, read_size).await;
    let closed = session.close().await;
    streamed?;
    closed?;
    Ok(())
}

async fn stream(session: &mut Session, raw: bool, read_size: Option<usize>) -> CliResult {
    session.listen(move |data| print_data(&data, raw), !raw).await?;

    let mut read = ReadOptions::default();
    if let Some(size) = read_size {
        read = read.size(size);
    }
    session.read(read).await?;
    info!(path = session.path(), baud_rate = session.baud_rate(), "monitoring, Ctrl+C to stop");

    shutdown_signal().await;
    Ok(())
}

fn print_data(data: &SerialData, raw: bool) {
    let mut out = std::io::stdout().lock();
    let written = match data {
        SerialData::Text(text) if !raw => write!(out, "{text}"),
        other => writeln!(out, "{}", hex_line(other.as_bytes())),
    };
    if written.and_then(|_| out.flush()).is_err() {
        warn!("stdout closed");
    }
}

fn hex_line(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let digits: String = input
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|token| token.trim_start_matches("0x").trim_start_matches("0X"))
        .collect();
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("'{input}' is not a hex byte string"));
    }
    if digits.len() % 2 != 0 {
        return Err(format!("'{input}' has an odd number of hex digits"));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|e| e.to_string()))
        .collect()
}

async fn send(config: &Config, port: &str, data: &str, baud: Option<u32>, hex: bool) -> CliResult {
    let bytes = if hex { Some(parse_hex(data)?) } else { None };

    let mut session = Session::new(config.session_options(port, baud));
    session.open().await?;
    let written = match bytes {
        Some(bytes) => session.write_binary(bytes).await,
        None => session.write(data).await,
    };
    let closed = session.close().await;
    let written = written?;
    closed?;

    println!("Wrote {written} bytes to {}", session.path());
    Ok(())
}

// --- Graceful Shutdown Handler ---
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("signal received, closing port");
}
