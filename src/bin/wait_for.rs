use clap::Parser;
use entrygate::domain::ports::Handoff;
use entrygate::utils::{logger, signal::shutdown_signal};
use entrygate::{CommandLine, Endpoint, EntrypointError, ExecHandoff, ReadinessGate, TcpProbe};
use std::ffi::OsString;
use std::time::Duration;

/// Readiness gate on its own: block until HOST:PORT accepts connections, then
/// optionally exec COMMAND. Also usable as a container HEALTHCHECK with a timeout.
#[derive(Parser)]
#[command(name = "wait-for")]
#[command(about = "Wait for a TCP endpoint, then optionally exec a command")]
struct Args {
    host: String,

    port: u16,

    /// Give up after this many seconds (default: wait forever)
    #[arg(short, long)]
    timeout_secs: Option<u64>,

    #[arg(short, long, default_value = "1000")]
    interval_ms: u64,

    #[arg(long, default_value = "2000")]
    connect_timeout_ms: u64,

    #[arg(short, long)]
    verbose: bool,

    #[arg(last = true, value_name = "COMMAND")]
    command: Vec<OsString>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose, logger::LogFormat::Compact);

    if let Err(e) = run(args).await {
        tracing::error!("❌ {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }
}

async fn run(args: Args) -> Result<(), EntrypointError> {
    let gate = ReadinessGate::new(
        TcpProbe::new(Duration::from_millis(args.connect_timeout_ms.max(1))),
        Endpoint::new(args.host, args.port),
        Duration::from_millis(args.interval_ms.max(1)),
    )
    .with_timeout(args.timeout_secs.map(Duration::from_secs));

    tokio::select! {
        report = gate.wait() => { report?; }
        signal = shutdown_signal() => return Err(EntrypointError::Interrupted { signal }),
    }

    if args.command.is_empty() {
        return Ok(());
    }

    let command = CommandLine::from_argv(args.command)?;
    ExecHandoff.exec(&command)
}
