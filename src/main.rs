use std::net::{IpAddr, SocketAddr};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pillar::api::{ScenarioArgs, build_inputs, comparison_json, run_http_server};
use pillar::core::compare;
use pillar::report::render_comparison;

/// Compares a tax-advantaged retirement account with an ETF brokerage account.
#[derive(Parser, Debug)]
#[command(name = "pillar", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web page and the JSON API.
    Serve {
        #[arg(long, env = "PILLAR_HOST", default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, env = "PILLAR_PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Print the year-by-year projection of both scenarios.
    Compare {
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { host, port } => {
            if let Err(e) = run_http_server(SocketAddr::new(host, port)).await {
                tracing::error!(error = %e, "server error");
                std::process::exit(1);
            }
        }
        Command::Compare { scenario, format } => {
            let inputs = build_inputs(&scenario);
            match format {
                OutputFormat::Table => print!("{}", render_comparison(&compare(&inputs))),
                OutputFormat::Json => match comparison_json(inputs) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        tracing::error!(error = %e, "failed to serialize comparison");
                        std::process::exit(1);
                    }
                },
            }
        }
    }
}
