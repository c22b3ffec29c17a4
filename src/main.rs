//! table_forge command-line interface

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use table_forge::utils::logging;

#[derive(Parser)]
#[command(name = "table_forge", version, about = "Generate Rust structs from a database schema")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "table_forge.toml")]
    config: PathBuf,

    /// Emit extra diagnostic context
    #[arg(short, long)]
    verbose: bool,

    /// Output file; defaults to the configured path, or stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .to_str()
        .context("config path is not valid UTF-8")?;
    let mut config = table_forge::config::load_from_file(config_path)?;
    config.database.verbose |= cli.verbose;

    logging::init_logging(&config.logging, config.database.verbose);

    let output_path = cli.output.or_else(|| {
        config
            .output
            .as_ref()
            .and_then(|output| output.path.as_ref().map(PathBuf::from))
    });

    let mut client = table_forge::TableForgeClient::new(config).await?;
    let source = client.run().await?;

    match output_path {
        Some(path) => {
            fs::write(&path, source)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "generated code written");
        }
        None => print!("{}", source),
    }

    Ok(())
}
