// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use logql_cli::{CliConfig, Request, render, trim_line_ending};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "logql-situation")]
#[command(about = "Print the completion situation at a cursor in a LogQL query")]
#[command(version)]
struct Cli {
    /// Query text; read from stdin when omitted
    query: Option<String>,

    /// Cursor byte offset; when omitted the cursor marker is used
    #[arg(short, long)]
    pos: Option<usize>,

    /// Cursor marker character
    #[arg(short, long)]
    marker: Option<char>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print compact JSON
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = load_config(&cli)?;
    tracing::debug!(?config, "configuration loaded");

    let input = match cli.query {
        Some(query) => query,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read query from stdin")?;
            trim_line_ending(&buffer).to_string()
        }
    };

    let request = Request::new(&input, cli.pos, config.cursor_marker);
    let situation = request
        .resolve()
        .with_context(|| format!("Failed to resolve situation at offset {}", request.pos))?;

    let output = render(situation.as_ref(), config.pretty).context("Failed to serialize situation")?;
    println!("{output}");
    Ok(())
}

fn load_config(cli: &Cli) -> Result<CliConfig> {
    let mut config = match &cli.config {
        Some(path) => CliConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => CliConfig::default(),
    };

    if let Some(marker) = cli.marker {
        config = config.with_marker(marker);
    }
    if cli.compact {
        config = config.with_pretty(false);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
