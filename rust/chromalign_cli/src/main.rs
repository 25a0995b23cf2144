mod cli;
mod config;
mod errors;
mod processing;

use clap::Parser;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Config;

#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> std::result::Result<(), errors::CliError> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        ) // This uses RUST_LOG environment variable
        .init();

    let args = Cli::parse();
    let config = Config::with_cli_args(args)?;
    info!("Parsed configuration: {:#?}", config);

    let (input, output) = match (&config.input, &config.output) {
        (Some(input), Some(output)) => (input.clone(), output.clone()),
        _ => {
            return Err(errors::CliError::Config {
                source: "Both an input and an output directory are required".to_string(),
            });
        }
    };

    std::fs::create_dir_all(&output.directory)
        .map_err(|e| errors::CliError::io(e, &output.directory))?;

    processing::process_input(&input.path, &config.similarity, &config, &output)?;
    Ok(())
}
