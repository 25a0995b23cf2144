use chromalign::config::{
    AlignmentConfig,
    MatchingConfig,
};
use chromalign::similarity::SimilarityConfig;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;

use crate::cli::Cli;
use crate::errors::CliError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub input: Option<InputConfig>,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub alignment: AlignmentConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InputConfig {
    pub path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Config {
    /// Reads the config file named on the command line and applies the overrides.
    pub fn with_cli_args(args: Cli) -> Result<Self, CliError> {
        let file = std::fs::File::open(&args.config).map_err(|e| CliError::io(e, &args.config))?;
        let mut config: Config = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| CliError::ParseError { msg: e.to_string() })?;

        if let Some(path) = args.input {
            config.input = Some(InputConfig { path });
        }
        if let Some(directory) = args.output_dir {
            config.output = Some(OutputConfig { directory });
        }
        if config.input.is_none() {
            return Err(CliError::Config {
                source: "No input provided, please provide one in either the config file or with the --input flag".to_string(),
            });
        }
        if config.output.is_none() {
            return Err(CliError::Config {
                source: "No output directory provided, please provide one in either the config file or with the --output-dir flag".to_string(),
            });
        }
        Ok(config)
    }
}
