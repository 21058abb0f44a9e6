//! brotli-cli: Brotli compression over base64 buffers and files.

use anyhow::Context;
use brotli_bridge::{Bridge, BridgeConfig, Invocation, OperationError, Outcome};
use brotli_bridge_telemetry::{metrics, TelemetryConfig};
use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "brotli-cli")]
#[command(
    author,
    version,
    about = "Brotli compression over base64 buffers and files",
    long_about = None
)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Configuration file (defaults to .brotli-bridge.toml if present)
    #[arg(short, long, global = true, env = "BROTLI_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Print collected metrics to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress base64 data, printing base64
    Compress {
        /// Base64 input, or "-" to read stdin
        data: String,
        /// Compression quality (clamped to 0-11)
        #[arg(short, long, allow_negative_numbers = true)]
        quality: Option<f64>,
    },
    /// Decompress base64 Brotli data
    Decompress {
        /// Base64 input, or "-" to read stdin
        data: String,
        /// Print the result as base64 instead of UTF-8 text
        #[arg(long)]
        base64: bool,
    },
    /// Compress a file
    CompressFile {
        /// File to compress
        input: PathBuf,
        /// Destination of the Brotli stream
        output: PathBuf,
        /// Compression quality (clamped to 0-11)
        #[arg(short, long, allow_negative_numbers = true)]
        quality: Option<f64>,
    },
    /// Decompress a Brotli file
    DecompressFile {
        /// Brotli file to decompress
        input: PathBuf,
        /// Destination of the decompressed bytes
        output: PathBuf,
    },
    /// Invoke an operation by name from a JSON request
    Invoke {
        /// e.g. {"op":"compress","data":"aGVsbG8=","quality":9}, or "-" to read stdin
        request: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = if cli.verbose {
        TelemetryConfig::verbose()
    } else {
        TelemetryConfig::default()
    };
    if let Err(e) = brotli_bridge_telemetry::init_with_config(telemetry) {
        eprintln!("{} {}", "warning:".yellow().bold(), e);
    }

    let result = run(&cli).await;

    if cli.metrics {
        let snapshot = serde_json::to_string_pretty(&metrics().export_json()).unwrap_or_default();
        eprintln!("{}", snapshot);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, cli.format);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = BridgeConfig::load(cli.config.as_deref())?.with_env_overrides()?;
    tracing::debug!(?config, "configuration loaded");
    let bridge = Bridge::with_config(config)?;

    let invocation = match &cli.command {
        Commands::Compress { data, quality } => Invocation::Compress {
            data: read_arg(data)?,
            quality: *quality,
        },
        Commands::Decompress { data, base64: false } => Invocation::Decompress {
            data: read_arg(data)?,
        },
        Commands::Decompress { data, base64: true } => Invocation::DecompressToBase64 {
            data: read_arg(data)?,
        },
        Commands::CompressFile {
            input,
            output,
            quality,
        } => Invocation::CompressFile {
            input_path: input.clone(),
            output_path: output.clone(),
            quality: *quality,
        },
        Commands::DecompressFile { input, output } => Invocation::DecompressFile {
            input_path: input.clone(),
            output_path: output.clone(),
        },
        Commands::Invoke { request } => {
            let request = read_arg(request)?;
            Invocation::from_json(&request).context("Invalid invocation request")?
        }
    };

    let operation = invocation.operation();
    let outcome = bridge.invoke(invocation).await?;

    match (cli.format, outcome) {
        (OutputFormat::Json, outcome) => {
            let body = serde_json::json!({ "operation": operation, "result": outcome });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        (OutputFormat::Text, Outcome::Text(text)) => println!("{}", text),
        (OutputFormat::Text, Outcome::Unit) => println!("{} {}", "✓".green(), operation),
    }

    Ok(())
}

/// Argument value, or all of stdin when the argument is "-".
fn read_arg(value: &str) -> anyhow::Result<String> {
    if value != "-" {
        return Ok(value.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read stdin")?;
    Ok(buf.trim_end().to_string())
}

fn report_error(err: &anyhow::Error, format: OutputFormat) {
    match (format, err.downcast_ref::<OperationError>()) {
        (OutputFormat::Json, Some(op_err)) => {
            let report = serde_json::to_string_pretty(&op_err.to_report()).unwrap_or_default();
            eprintln!("{}", report);
        }
        (_, Some(op_err)) => {
            eprintln!(
                "{} [{}] {}",
                "error:".red().bold(),
                op_err.rejection_code(),
                op_err
            );
        }
        (_, None) => eprintln!("{} {:#}", "error:".red().bold(), err),
    }
}
