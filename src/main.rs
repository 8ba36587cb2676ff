mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

use sl_core::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging.
    // Respect RUST_LOG env var if set, otherwise use defaults based on the
    // verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "staffline=trace,sl_server=trace,sl_omr=debug,sl_core=debug,tower_http=debug".to_string()
        } else {
            "staffline=info,sl_server=info,sl_omr=info,tower_http=info".to_string()
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = Config::load_or_default(cli.config.as_deref());
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            tracing::info!("Starting staffline server");
            sl_server::start(config).await?;
            Ok(())
        }

        Commands::Convert { input, output } => {
            let config = Config::load_or_default(cli.config.as_deref());
            convert_one(&config, &input, output.as_deref()).await
        }

        Commands::Validate { config } => {
            let path = config.or(cli.config);
            validate_config(path.as_deref())
        }

        Commands::Version => {
            println!("staffline {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// One-shot conversion through the engine, no server involved.
async fn convert_one(
    config: &Config,
    input: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !sl_omr::is_supported_extension(ext) {
        bail!("unsupported input format: {}", input.display());
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("musicxml"));

    let engine = sl_omr::select_engine(&config.engine);
    tracing::info!("Converting {} with the {} engine", input.display(), engine.name());

    let artifact = engine
        .convert(input, &output)
        .await
        .with_context(|| format!("conversion of {} failed", input.display()))?;

    println!("Wrote {} ({} bytes)", output.display(), artifact.len());
    Ok(())
}

/// Parse a config file and report warnings.
fn validate_config(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        bail!("no config file specified");
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let config = Config::from_json(&contents)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("cannot parse {}", path.display()))?;

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("{} is valid", path.display());
    } else {
        println!("{} is valid, with warnings:", path.display());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }
    Ok(())
}
